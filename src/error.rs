use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZhsubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cue failed structural validation. Fatal to the whole pass.
    #[error("Malformed cue {index}: {reason}")]
    MalformedInput { index: usize, reason: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Missing CSV column: {0}")]
    MissingColumn(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No .{extension} files found in {dir}")]
    NoInputFiles { dir: String, extension: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl ZhsubError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ZhsubError>;
