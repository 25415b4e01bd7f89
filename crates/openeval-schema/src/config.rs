use std::str::FromStr;

/// On-disk layout of a schema definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFormat {
    /// Pick [`SchemaFormat::Typed`] when the document declares
    /// `"format": "typed"`, otherwise [`SchemaFormat::Template`].
    #[default]
    Auto,
    /// Explicit per-field declarations under a top-level `fields` object.
    Typed,
    /// Example-shaped document whose leaves carry `[type, modifier]` tags.
    Template,
}

impl SchemaFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Typed => "typed",
            Self::Template => "template",
        }
    }
}

impl FromStr for SchemaFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "typed" => Ok(Self::Typed),
            "template" => Ok(Self::Template),
            other => Err(format!("unknown schema format: {other}")),
        }
    }
}

/// Controls how schema definitions are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Document layout to expect.
    pub format: SchemaFormat,
    /// Maximum bytes allowed for a schema file.
    pub max_schema_file_size: usize,
    /// Maximum nesting depth of object and array-of-object fields.
    pub max_nesting_depth: usize,
    /// Template arrays whose key ends with one of these suffixes must be non-empty.
    pub non_empty_suffixes: Vec<String>,
    /// Template arrays with one of these exact keys must be non-empty.
    pub non_empty_keys: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            format: SchemaFormat::Auto,
            max_schema_file_size: 1024 * 1024,
            max_nesting_depth: 32,
            non_empty_suffixes: vec!["_content".to_string()],
            non_empty_keys: vec!["responses".to_string()],
        }
    }
}

impl LoaderConfig {
    /// Whether a template array stored under `key` must contain at least one element.
    pub fn requires_non_empty(&self, key: &str) -> bool {
        self.non_empty_keys.iter().any(|k| k == key)
            || self
                .non_empty_suffixes
                .iter()
                .any(|suffix| key.ends_with(suffix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_non_empty_rules() {
        let config = LoaderConfig::default();
        assert!(config.requires_non_empty("responses"));
        assert!(config.requires_non_empty("prompt_content"));
        assert!(!config.requires_non_empty("response"));
        assert!(!config.requires_non_empty("content_type"));
    }

    #[test]
    fn schema_format_parses_case_insensitively() {
        assert_eq!("Typed".parse::<SchemaFormat>(), Ok(SchemaFormat::Typed));
        assert_eq!("template".parse::<SchemaFormat>(), Ok(SchemaFormat::Template));
        assert!("yaml".parse::<SchemaFormat>().is_err());
    }
}
