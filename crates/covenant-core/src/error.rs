use thiserror::Error;

#[derive(Debug, Error)]
pub enum CovenantError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid metric: '{name}' carries non-finite value {value}")]
    InvalidMetric { name: String, value: f64 },

    #[error("Composition error: {0}")]
    Composition(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CovenantError {
    fn from(e: serde_json::Error) -> Self {
        CovenantError::Serialization(e.to_string())
    }
}
