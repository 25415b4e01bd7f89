use std::fmt;

use serde::Serialize;

/// Category of a single schema mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    MissingRequiredField,
    UnexpectedFieldType,
    InvalidEnumValue,
    InvalidNestedStructure,
    /// An array declared non-empty holds no elements.
    EmptyCollection,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::MissingRequiredField => "MissingRequiredField",
            ViolationKind::UnexpectedFieldType => "UnexpectedFieldType",
            ViolationKind::InvalidEnumValue => "InvalidEnumValue",
            ViolationKind::InvalidNestedStructure => "InvalidNestedStructure",
            ViolationKind::EmptyCollection => "EmptyCollection",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A localized mismatch between a record and the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location inside the record, e.g. `responses[2].text`, or `$` for the
    /// record itself.
    pub field_path: String,
    pub kind: ViolationKind,
    pub detail: String,
    /// The schema's own description of the offending field, when it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_description: Option<String>,
}

impl Violation {
    pub fn new(
        field_path: impl Into<String>,
        kind: ViolationKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
            detail: detail.into(),
            field_description: None,
        }
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.field_description = description.map(str::to_string);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.field_path, self.kind, self.detail)
    }
}

/// Outcome of validating one record.
///
/// `passed` is derived from the violation list at construction, so a report
/// passes exactly when it carries no violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    passed: bool,
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations of one kind, in report order.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}
