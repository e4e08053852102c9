pub mod dates;
pub mod duplicate;
pub mod error;
pub mod field;
pub mod mapping;
pub mod record;
pub mod status;
pub mod template;

pub use duplicate::{DuplicateGroup, DuplicateResolution, ResolutionAction, ResolutionKind};
pub use error::{ModelError, Result};
pub use field::CanonicalField;
pub use mapping::{FieldMappingResult, MappedColumn, MatchKind};
pub use record::{CanonicalRecord, ParsedRecord, RawTable, ReconciledRecord, StoredRecord};
pub use status::ApplicationStatus;
pub use template::{FieldMapping, Template};
