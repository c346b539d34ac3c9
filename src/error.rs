
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OppsqlError {
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),
    #[error("Ambiguous result: parameter '{name}' has {count} distinct values")]
    AmbiguousResult { name: String, count: usize },
    #[error("Missing result: no value stored for '{0}'")]
    MissingResult(String),
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("Cannot convert '{value}' to {target}")]
    Coercion { value: String, target: &'static str },
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OppsqlError>;

impl OppsqlError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSpecification(message.into())
    }
}

// Helper conversions
impl From<config::ConfigError> for OppsqlError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
