//! Downloadable CSV skeletons for a template.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use jobtrack_model::Template;

use crate::catalog::TemplateCatalog;
use crate::error::{Result, TemplateError};

/// Produces a CSV skeleton for the named template.
///
/// The first line is the template's columns in declaration order. With
/// `include_examples` the template's sample rows follow, or one row of
/// placeholder values for a template without samples. Cells are quoted only
/// when they contain a delimiter, quote, or line break.
pub fn generate_template_csv(
    catalog: &TemplateCatalog,
    template_id: &str,
    include_examples: bool,
) -> Result<String> {
    let template = catalog.require(template_id)?;
    template_to_csv(template, include_examples)
}

pub fn template_to_csv(template: &Template, include_examples: bool) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(template.headers())?;
    if include_examples {
        for row in template.example_rows() {
            writer.write_record(&row)?;
        }
    }

    let bytes = writer.into_inner().map_err(|err| TemplateError::Csv {
        message: err.error().to_string(),
    })?;
    String::from_utf8(bytes).map_err(|err| TemplateError::Csv {
        message: err.to_string(),
    })
}
