//! Item-level schema model and record validator for OpenEval benchmark data.
//!
//! A [`SchemaDefinition`] is loaded once from a JSON document (template or
//! typed format) and then used to check candidate records. Validation never
//! fails: every mismatch is collected into a [`ValidationReport`].
//!
//! ```
//! use openeval_schema::{FieldSpec, FieldType, SchemaDefinition, Validator, ViolationKind};
//! use serde_json::json;
//!
//! let validator = Validator::new(
//!     SchemaDefinition::new()
//!         .with_field("id", FieldSpec::required(FieldType::String))
//!         .with_field("score", FieldSpec::required(FieldType::Number)),
//! );
//!
//! let report = validator.validate_entry(&json!({"id": "x1"}));
//! assert!(!report.passed());
//! assert_eq!(report.violations()[0].field_path, "score");
//! assert_eq!(report.violations()[0].kind, ViolationKind::MissingRequiredField);
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod item;
pub mod loader;
pub mod report;
mod template;
mod typed;
pub mod validator;

pub use config::{LoaderConfig, SchemaFormat};
pub use definition::{FieldSpec, FieldType, Presence, Primitive, SchemaDefinition};
pub use error::{Result, SchemaError};
pub use item::{item_validator, validate_entry, ITEM_SCHEMA_JSON};
pub use report::{ValidationReport, Violation, ViolationKind};
pub use typed::TYPED_META_SCHEMA;
pub use validator::{Validator, ROOT_PATH};
