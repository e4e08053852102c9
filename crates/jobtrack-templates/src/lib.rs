//! Provider template catalog, header-based template detection, and CSV
//! skeleton generation.

mod builtin;
pub mod catalog;
pub mod custom;
pub mod detect;
pub mod error;
pub mod export;

pub use catalog::{CatalogBuilder, TemplateCatalog};
pub use custom::{load_custom_templates, parse_custom_templates};
pub use detect::{Detection, DetectorConfig, TemplateDetector, TemplateScore};
pub use error::{Result, TemplateError};
pub use export::{generate_template_csv, template_to_csv};
