//! Validate AI-evaluation benchmark items against the OpenEval item schema.
//!
//! This crate re-exports [`openeval_schema`] and ships the `openeval`
//! command-line tool (behind the default `cli` feature).
//!
//! ```
//! use serde_json::json;
//!
//! let report = openeval::validate_entry(&json!({"benchmark": {}})).unwrap();
//! assert!(!report.passed());
//! ```

/// Re-export schema types.
pub mod schema {
    pub use openeval_schema::*;
}

pub use openeval_schema::{validate_entry, ValidationReport, Validator, Violation, ViolationKind};
