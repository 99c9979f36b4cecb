use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Unresolvable reference: {0}")]
    UnresolvableReference(String),

    #[error("Malformed proxy node '{subject}': {reason}")]
    MalformedProxy { subject: String, reason: String },

    #[error("Cannot save aggregation '{aggregation}': targets without a durable identifier: {pending:?}")]
    UnpersistedTargets {
        aggregation: String,
        pending: Vec<String>,
    },

    #[error("Predicate '{0}' is bookkeeping and cannot be set as an attribute")]
    ReservedPredicate(String),

    #[error("Index {index} out of bounds for ordered list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, AggregationError>;

impl AggregationError {
    pub fn unresolvable(subject: impl std::fmt::Display) -> Self {
        Self::UnresolvableReference(subject.to_string())
    }

    pub fn malformed(subject: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::MalformedProxy {
            subject: subject.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AggregationError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_subject() {
        let err = AggregationError::unresolvable("http://example.org/a#g1");
        assert_eq!(
            err.to_string(),
            "Unresolvable reference: http://example.org/a#g1"
        );

        let err = AggregationError::malformed("n1", "missing proxyFor");
        assert!(err.to_string().contains("n1"));
        assert!(err.to_string().contains("missing proxyFor"));
    }

    #[test]
    fn test_serde_error_converts() {
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: AggregationError = parsed.unwrap_err().into();
        assert!(matches!(err, AggregationError::SerializationError(_)));
    }
}
