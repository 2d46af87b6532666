use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown variable: ${0}")]
    UnknownVariable(String),

    #[error("invalid value for {option}: {value}")]
    InvalidValue { option: String, value: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
