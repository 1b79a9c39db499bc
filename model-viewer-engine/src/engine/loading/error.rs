use thiserror::Error;

/// Failure modes of the model load contract.
///
/// `LoadFailed` is unrecoverable per request and surfaced as-is; retrying
/// is caller policy. `Cancelled` is caller-initiated and not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The backend reported a parse or transport failure. Carries the
    /// backend's message verbatim, not interpreted further.
    #[error("model load failed: {0}")]
    LoadFailed(String),
    /// The request was cancelled before the backend resolved.
    #[error("model load cancelled")]
    Cancelled,
}

impl LoadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_backend_message_verbatim() {
        let error = LoadError::LoadFailed(String::from("404 not found"));
        assert_eq!(error.to_string(), "model load failed: 404 not found");
        assert!(!error.is_cancelled());
    }

    #[test]
    fn cancellation_is_not_a_fault() {
        assert!(LoadError::Cancelled.is_cancelled());
        assert_eq!(LoadError::Cancelled.to_string(), "model load cancelled");
    }
}
