use thiserror::Error;

/// Result type alias using TfbreakError
pub type Result<T> = std::result::Result<T, TfbreakError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and machine-readable CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    UnknownRule,
    DuplicateRule,
    InvalidSeverity,
    InvalidThreshold,
    InvalidConfig,
    UnsupportedConfigVersion,

    // Source analysis
    /// A source file could not be lexed into comments and top-level blocks
    InvalidSource,
    /// A snapshot document could not be decoded
    InvalidSnapshot,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownRule => "ERR_UNKNOWN_RULE",
            ExErrorKind::DuplicateRule => "ERR_DUPLICATE_RULE",
            ExErrorKind::InvalidSeverity => "ERR_INVALID_SEVERITY",
            ExErrorKind::InvalidThreshold => "ERR_INVALID_THRESHOLD",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::UnsupportedConfigVersion => "ERR_UNSUPPORTED_CONFIG_VERSION",
            ExErrorKind::InvalidSource => "ERR_INVALID_SOURCE",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether errors of this kind are raised while loading configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ExErrorKind::UnknownRule
                | ExErrorKind::DuplicateRule
                | ExErrorKind::InvalidSeverity
                | ExErrorKind::InvalidThreshold
                | ExErrorKind::InvalidConfig
                | ExErrorKind::UnsupportedConfigVersion
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and rich
/// context (rule, file, line) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    rule_id: Option<String>,
    file: Option<String>,
    line: Option<usize>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            rule_id: None,
            file: None,
            line: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add rule context
    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// Add source file context
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add source line context
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(rule_id) = &self.rule_id {
            write!(f, " (rule: {})", rule_id)?;
        }
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " ({}:{})", file, line)?,
            (Some(file), None) => write!(f, " ({})", file)?,
            _ => {}
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for tfbreak operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TfbreakError {
    // ===== Configuration Errors =====
    /// A rule ID or name is not present in the registry
    #[error("Unknown rule: {rule}")]
    UnknownRule { rule: String },

    /// Two rules were registered under the same ID or name
    #[error("Duplicate rule registration: {rule}")]
    DuplicateRule { rule: String },

    /// A severity string is not one of the canonical names
    #[error("Invalid severity '{value}': expected one of BREAKING, RISKY, INFO")]
    InvalidSeverity { value: String },

    /// Similarity threshold outside the closed interval 0.0..=1.0
    #[error("Invalid similarity threshold {value}: must be between 0.0 and 1.0")]
    InvalidThreshold { value: f64 },

    /// A configuration value failed validation
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// The configuration document could not be parsed
    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// The configuration declares a schema version this build does not understand
    #[error("Unsupported config version {version}: expected 1")]
    UnsupportedConfigVersion { version: u32 },

    // ===== Source Errors =====
    /// A source file's comments or block structure could not be lexed
    #[error("Cannot analyze {file}:{line}: {reason}")]
    SourceStructure {
        file: String,
        line: usize,
        reason: String,
    },

    /// A snapshot document could not be decoded
    #[error("Invalid snapshot {path}: {message}")]
    InvalidSnapshot { path: String, message: String },

    // ===== Generic Errors =====
    /// Filesystem error
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TfbreakError {
    /// Build an I/O error tagged with the path that failed
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        TfbreakError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from TfbreakError to ExError
impl From<TfbreakError> for ExError {
    fn from(err: TfbreakError) -> Self {
        match err {
            TfbreakError::UnknownRule { rule } => ExError::new(ExErrorKind::UnknownRule)
                .with_rule_id(rule)
                .with_message("Rule is not registered"),

            TfbreakError::DuplicateRule { rule } => ExError::new(ExErrorKind::DuplicateRule)
                .with_rule_id(rule)
                .with_op("build_registry")
                .with_message("Rule ID or name registered twice"),

            TfbreakError::InvalidSeverity { value } => {
                ExError::new(ExErrorKind::InvalidSeverity)
                    .with_message(format!("Invalid severity '{}'", value))
            }

            TfbreakError::InvalidThreshold { value } => {
                ExError::new(ExErrorKind::InvalidThreshold).with_message(format!(
                    "Similarity threshold {} outside 0.0..=1.0",
                    value
                ))
            }

            TfbreakError::InvalidConfig { field, reason } => {
                ExError::new(ExErrorKind::InvalidConfig)
                    .with_op("load_config")
                    .with_message(format!("{}: {}", field, reason))
            }

            TfbreakError::ConfigParse { path, message } => {
                ExError::new(ExErrorKind::InvalidConfig)
                    .with_op("load_config")
                    .with_file(path)
                    .with_message(message)
            }

            TfbreakError::UnsupportedConfigVersion { version } => {
                ExError::new(ExErrorKind::UnsupportedConfigVersion)
                    .with_op("load_config")
                    .with_message(format!("Config version {} is not supported", version))
            }

            TfbreakError::SourceStructure { file, line, reason } => {
                ExError::new(ExErrorKind::InvalidSource)
                    .with_op("scan_source")
                    .with_file(file)
                    .with_line(line)
                    .with_message(reason)
            }

            TfbreakError::InvalidSnapshot { path, message } => {
                ExError::new(ExErrorKind::InvalidSnapshot)
                    .with_file(path)
                    .with_message(message)
            }

            TfbreakError::Io { path, message } => ExError::new(ExErrorKind::Io)
                .with_file(path)
                .with_message(message),

            TfbreakError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            TfbreakError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to TfbreakError
impl From<serde_json::Error> for TfbreakError {
    fn from(err: serde_json::Error) -> Self {
        TfbreakError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_kind_codes() {
        let cases = [
            (ExErrorKind::UnknownRule, "ERR_UNKNOWN_RULE"),
            (ExErrorKind::InvalidSeverity, "ERR_INVALID_SEVERITY"),
            (ExErrorKind::InvalidThreshold, "ERR_INVALID_THRESHOLD"),
            (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
            assert!(kind.is_configuration());
        }
    }

    #[test]
    fn test_source_error_is_not_configuration() {
        assert!(!ExErrorKind::InvalidSource.is_configuration());
        assert!(!ExErrorKind::Io.is_configuration());
    }

    #[test]
    fn test_display_includes_location() {
        let err = ExError::new(ExErrorKind::InvalidSource)
            .with_file("main.tf")
            .with_line(12)
            .with_message("unterminated string");
        let text = err.to_string();
        assert!(text.contains("ERR_INVALID_SOURCE"));
        assert!(text.contains("main.tf:12"));
        assert!(text.contains("unterminated string"));
    }
}
