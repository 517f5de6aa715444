//! AI errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// A nearest-actor query was run over a list with no candidates.
    #[error("no candidate actors to choose from")]
    EmptyRoster,
}

pub type Result<T> = std::result::Result<T, AiError>;
