/// Errors that can occur while loading a schema definition.
///
/// Record validation never produces these; violations are reported through
/// [`ValidationReport`](crate::ValidationReport) instead.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema document is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field declaration could not be interpreted.
    #[error("invalid field definition at {path}: {message}")]
    InvalidDefinition { path: String, message: String },

    /// A typed schema document failed meta-schema validation.
    #[error("schema does not match the typed definition format: {0}")]
    MetaSchema(String),

    /// The schema file exceeds the configured size limit.
    #[error("schema file too large ({size} bytes, max {max})")]
    TooLarge { size: u64, max: usize },

    /// Nested fields exceed the configured depth limit.
    #[error("schema nesting too deep at {path} (max {max})")]
    TooDeep { path: String, max: usize },

    /// The schema bundled with this crate failed to load.
    #[error("bundled item schema is corrupt: {0}")]
    EmbeddedSchema(String),
}

impl SchemaError {
    pub(crate) fn definition(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
