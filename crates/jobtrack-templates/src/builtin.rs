//! Built-in provider templates.
//!
//! Column sets are chosen so no template's columns are a subset of another's;
//! an upload carrying exactly one template's headers always detects as that
//! template.

use jobtrack_model::{CanonicalField, FieldMapping, Template};

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| (*cell).to_string()).collect()
}

pub(crate) fn builtin_templates() -> Vec<Template> {
    vec![linkedin(), indeed(), glassdoor(), huntr(), spreadsheet()]
}

fn linkedin() -> Template {
    Template {
        id: "linkedin".to_string(),
        name: "LinkedIn Jobs".to_string(),
        description: "Applied jobs exported from LinkedIn's job tracker".to_string(),
        source: "linkedin".to_string(),
        mappings: vec![
            FieldMapping::required("Company", CanonicalField::Company),
            FieldMapping::required("Position", CanonicalField::Position),
            FieldMapping::optional("Location", CanonicalField::Location),
            FieldMapping::required("Applied Date", CanonicalField::AppliedDate),
            FieldMapping::optional("Status", CanonicalField::Status),
            FieldMapping::optional("Notes", CanonicalField::Notes),
            FieldMapping::optional("Job URL", CanonicalField::Url),
        ],
        sample_rows: vec![
            row(&[
                "Acme Corp",
                "Senior Software Engineer",
                "San Francisco, CA",
                "2024-01-15",
                "Applied",
                "Referred by \"Sam\"",
                "https://www.linkedin.com/jobs/view/3790000001",
            ]),
            row(&[
                "Globex",
                "Backend Engineer",
                "Remote",
                "2024-01-22",
                "Interviewing",
                "",
                "https://www.linkedin.com/jobs/view/3790000002",
            ]),
        ],
    }
}

fn indeed() -> Template {
    Template {
        id: "indeed".to_string(),
        name: "Indeed Applications".to_string(),
        description: "My Jobs export from Indeed".to_string(),
        source: "indeed".to_string(),
        mappings: vec![
            FieldMapping::required("Company Name", CanonicalField::Company),
            FieldMapping::required("Job Title", CanonicalField::Position),
            FieldMapping::optional("Job Location", CanonicalField::Location),
            FieldMapping::required("Date Applied", CanonicalField::AppliedDate),
            FieldMapping::optional("Application Status", CanonicalField::Status),
            FieldMapping::optional("Salary", CanonicalField::Salary),
            FieldMapping::optional("Job Link", CanonicalField::Url),
        ],
        sample_rows: vec![row(&[
            "Initech",
            "Data Analyst",
            "Austin, TX",
            "01/09/2024",
            "Application submitted",
            "$70,000 - $85,000 a year",
            "https://www.indeed.com/viewjob?jk=1a2b3c4d",
        ])],
    }
}

fn glassdoor() -> Template {
    Template {
        id: "glassdoor".to_string(),
        name: "Glassdoor Applications".to_string(),
        description: "Application history exported from Glassdoor".to_string(),
        source: "glassdoor".to_string(),
        mappings: vec![
            FieldMapping::required("Employer", CanonicalField::Company),
            FieldMapping::required("Job Title", CanonicalField::Position),
            FieldMapping::optional("City", CanonicalField::Location),
            FieldMapping::required("Applied On", CanonicalField::AppliedDate),
            FieldMapping::optional("Stage", CanonicalField::Status),
            FieldMapping::optional("Salary Estimate", CanonicalField::Salary),
            FieldMapping::optional("Recruiter", CanonicalField::Contact),
        ],
        sample_rows: vec![row(&[
            "Umbrella Corporation",
            "Product Manager",
            "Seattle, WA",
            "Feb 02, 2024",
            "Phone screen",
            "$120K - $150K (Glassdoor est.)",
            "Jordan Lee",
        ])],
    }
}

fn huntr() -> Template {
    Template {
        id: "huntr".to_string(),
        name: "Huntr Board".to_string(),
        description: "Job board export from Huntr".to_string(),
        source: "huntr".to_string(),
        mappings: vec![
            FieldMapping::required("Company", CanonicalField::Company),
            FieldMapping::required("Title", CanonicalField::Position),
            FieldMapping::optional("Location", CanonicalField::Location),
            FieldMapping::optional("Date Applied", CanonicalField::AppliedDate),
            FieldMapping::optional("List", CanonicalField::Status),
            FieldMapping::optional("Salary", CanonicalField::Salary),
            FieldMapping::optional("URL", CanonicalField::Url),
            FieldMapping::optional("Notes", CanonicalField::Notes),
        ],
        sample_rows: vec![row(&[
            "Hooli",
            "Site Reliability Engineer",
            "Mountain View, CA",
            "2024-03-04",
            "Interview",
            "180000",
            "https://hooli.example/careers/sre",
            "Second round\nwith platform team",
        ])],
    }
}

fn spreadsheet() -> Template {
    Template {
        id: "spreadsheet".to_string(),
        name: "Personal Spreadsheet".to_string(),
        description: "Hand-maintained application tracking spreadsheet".to_string(),
        source: "custom".to_string(),
        mappings: vec![
            FieldMapping::required("Company", CanonicalField::Company),
            FieldMapping::required("Role", CanonicalField::Position),
            FieldMapping::optional("Location", CanonicalField::Location),
            FieldMapping::optional("Date", CanonicalField::AppliedDate),
            FieldMapping::optional("Status", CanonicalField::Status),
            FieldMapping::optional("Salary", CanonicalField::Salary),
            FieldMapping::optional("Link", CanonicalField::Url),
            FieldMapping::optional("Contact", CanonicalField::Contact),
            FieldMapping::optional("Notes", CanonicalField::Notes),
        ],
        sample_rows: vec![row(&[
            "Stark Industries",
            "Embedded Engineer",
            "New York, NY",
            "2024-02-20",
            "Offer",
            "150000",
            "https://stark.example/jobs/42",
            "Pepper Potts",
            "Negotiating start date",
        ])],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_are_valid() {
        for template in builtin_templates() {
            template
                .validate()
                .unwrap_or_else(|err| panic!("{}: {err}", template.id));
            assert!(
                !template.sample_rows.is_empty(),
                "{} needs example rows",
                template.id
            );
        }
    }

    #[test]
    fn no_template_columns_are_a_subset_of_another() {
        let templates = builtin_templates();
        for a in &templates {
            for b in &templates {
                if a.id == b.id {
                    continue;
                }
                let b_columns: Vec<String> =
                    b.headers().iter().map(|h| h.to_lowercase()).collect();
                let all_in_b = a
                    .headers()
                    .iter()
                    .all(|h| b_columns.contains(&h.to_lowercase()));
                assert!(!all_in_b, "{} columns are a subset of {}", a.id, b.id);
            }
        }
    }
}
