use thiserror::Error;

/// Errors raised by ERD generation before anything is rendered
#[derive(Error, Debug)]
pub enum ErdError {
    #[error("{0} is not found in database")]
    FocusTableNotFound(String),

    #[error("{0} is unknown format")]
    UnknownFormat(String),

    #[error("invalid skip-table pattern '{pattern}'")]
    InvalidSkipPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
