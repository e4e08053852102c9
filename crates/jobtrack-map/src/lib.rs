//! Header-to-field mapping for uploaded job application tables.

pub mod error;
pub mod mapper;
pub mod records;
pub mod similarity;

pub use error::{MappingError, Result};
pub use mapper::{FieldMapper, MapperConfig};
pub use records::{apply_mapping, canonicalize_value, to_canonical};
pub use similarity::{SimilarityFn, normalize_text, similarity};
