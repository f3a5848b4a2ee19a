use thiserror::Error;

/// Failures local to one engine operation. None of them are fatal to a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A vector's length does not match the width a transform was built for.
    #[error("{context}: expected vector of length {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An operation referenced an id its registry has never issued.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// A transfer asked for more resonance than the source holds.
    #[error("insufficient resonance: requested {requested}, available {available}")]
    InsufficientResonance { available: f64, requested: f64 },

    /// Transfer amounts must be finite and non-negative.
    #[error("invalid transfer amount: {0}")]
    InvalidAmount(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub(crate) fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        EngineError::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Fail fast unless `actual == expected`.
pub(crate) fn ensure_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::shape(context, expected, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("t", 4, 4).is_ok());
        let err = ensure_len("golden transform", 4, 6).unwrap_err();
        assert_eq!(
            err.to_string(),
            "golden transform: expected vector of length 4, got 6"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = EngineError::not_found("token", "fluid-x");
        assert_eq!(err.to_string(), "token 'fluid-x' not found");
    }
}
