use thiserror::Error;

pub type ConditionResult<T> = Result<T, ConditionError>;

#[derive(Debug, Error)]
pub enum ConditionError {
    /// Raw records are malformed or incomplete; aggregation refuses to guess.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Unknown strategy index or a malformed visual/aggregation configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
