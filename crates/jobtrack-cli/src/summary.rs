use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use jobtrack_model::{
    CanonicalField, DuplicateGroup, FieldMappingResult, MatchKind, ParsedRecord, ResolutionKind,
};
use jobtrack_reconcile::CommitSummary;
use jobtrack_templates::{TemplateCatalog, TemplateScore};

/// Fields shown to identify a group member.
const MEMBER_FIELDS: [CanonicalField; 3] = [
    CanonicalField::Company,
    CanonicalField::Position,
    CanonicalField::AppliedDate,
];

/// Outcome of `jobtrack import`.
pub struct ImportReport {
    pub template_id: String,
    pub detection_confidence: Option<f64>,
    pub rows: usize,
    pub groups: usize,
    pub summary: CommitSummary,
    pub dry_run: bool,
}

pub fn print_templates(catalog: &TemplateCatalog) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Source"),
        header_cell("Columns"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    for template in catalog.templates() {
        let required: Vec<&str> = template
            .mappings
            .iter()
            .filter(|mapping| mapping.required)
            .map(|mapping| mapping.csv_column.as_str())
            .collect();
        table.add_row(vec![
            Cell::new(&template.id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&template.name),
            dim_cell(&template.source),
            Cell::new(template.headers().join(", ")),
            Cell::new(required.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_detection(scores: &[TemplateScore], detected: Option<(&str, f64)>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rank"),
        header_cell("Template"),
        header_cell("Confidence"),
        header_cell("Matched"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for (rank, score) in scores.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&score.template_id),
            confidence_cell(score.confidence),
            Cell::new(score.matched_fields),
            Cell::new(score.required_matched),
        ]);
    }
    println!("{table}");
    match detected {
        Some((id, confidence)) => println!("Detected: {id} ({})", percent(confidence)),
        None => println!("No template matched confidently; pass --template to choose one."),
    }
}

pub fn print_mapping(mapping: &FieldMappingResult) {
    println!("Template: {}", mapping.template_id);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Header"),
        header_cell("Match"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in &mapping.mapping {
        let kind = match column.match_kind {
            MatchKind::Exact => dim_cell("exact"),
            MatchKind::Fuzzy => Cell::new("fuzzy").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(column.field.label()),
            Cell::new(&column.header),
            kind,
            confidence_cell(column.confidence),
        ]);
    }
    println!("{table}");
    if !mapping.unmapped_headers.is_empty() {
        println!("Unmapped headers: {}", mapping.unmapped_headers.join(", "));
    }
    if !mapping.missing_fields.is_empty() {
        let missing: Vec<&str> = mapping.missing_fields.iter().map(|f| f.label()).collect();
        eprintln!("Missing required fields: {}", missing.join(", "));
    }
}

pub fn print_groups(
    groups: &[DuplicateGroup],
    mapping: &FieldMappingResult,
    recommend: impl Fn(f64) -> Option<ResolutionKind>,
) {
    if groups.is_empty() {
        println!("No duplicates found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Confidence"),
        header_cell("Members"),
        header_cell("Reasons"),
        header_cell("Suggested"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for group in groups {
        let members: Vec<String> = group
            .members
            .iter()
            .enumerate()
            .map(|(pos, member)| format!("{pos}: {}", describe_member(member, mapping)))
            .collect();
        let suggested = match recommend(group.confidence) {
            Some(kind) => Cell::new(kind.as_str()).fg(Color::Green),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(&group.id),
            confidence_cell(group.confidence),
            Cell::new(members.join("\n")),
            Cell::new(group.match_reasons.join("\n")),
            suggested,
        ]);
    }
    println!("{table}");
}

pub fn print_import(report: &ImportReport) {
    match report.detection_confidence {
        Some(confidence) => println!(
            "Template: {} (detected, {})",
            report.template_id,
            percent(confidence)
        ),
        None => println!("Template: {}", report.template_id),
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Duplicate groups"),
        header_cell("Inserted"),
        header_cell("Updated"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(report.rows),
        Cell::new(report.groups),
        Cell::new(report.summary.inserted).fg(Color::Green),
        Cell::new(report.summary.updated).fg(Color::Yellow),
    ]);
    println!("{table}");
    if report.dry_run {
        println!("Dry run: the store was not written.");
    }
}

/// "stored rec-4: Acme / Engineer / 2024-01-02" or "row 3: ...".
fn describe_member(member: &ParsedRecord, mapping: &FieldMappingResult) -> String {
    let origin = match &member.existing_id {
        Some(id) => format!("stored {id}"),
        None => format!("row {}", member.index + 1),
    };
    let values: Vec<&str> = MEMBER_FIELDS
        .iter()
        .filter_map(|field| member.value_of(*field, mapping))
        .collect();
    if values.is_empty() {
        origin
    } else {
        format!("{origin}: {}", values.join(" / "))
    }
}

fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn confidence_cell(confidence: f64) -> Cell {
    let color = if confidence >= 0.9 {
        Color::Green
    } else if confidence >= 0.7 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{confidence:.2}")).fg(color)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
