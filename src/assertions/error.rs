//! Assertion failures.

use std::fmt::Debug;

use thiserror::Error;

/// A failed check. The message names what was expected and what was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionError {
    message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// "expected {subject} to be {expected:?}, but it was {actual:?}"
    pub fn mismatch(subject: &str, expected: impl Debug, actual: impl Debug) -> Self {
        Self::new(format!(
            "expected {subject} to be {expected:?}, but it was {actual:?}"
        ))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for fluent checks.
pub type AssertionResult<T> = Result<T, AssertionError>;

/// Fail with a mismatch unless `expected == actual`.
pub(crate) fn ensure_eq<T>(subject: &str, expected: T, actual: T) -> AssertionResult<()>
where
    T: PartialEq + Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionError::mismatch(subject, expected, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = AssertionError::mismatch("status code", 200, 404);
        assert_eq!(err.message(), "expected status code to be 200, but it was 404");
    }

    #[test]
    fn test_ensure_eq() {
        assert!(ensure_eq("header 'x'", "a", "a").is_ok());
        let err = ensure_eq("header 'x'", "a", "b").unwrap_err();
        assert_eq!(err.to_string(), "expected header 'x' to be \"a\", but it was \"b\"");
    }
}
