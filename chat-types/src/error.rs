//! Error types for Waffle wire handling.

use thiserror::Error;

/// Errors that can occur while encoding, decoding or minting wire values.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The operating system entropy source could not be read
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WireError::Entropy("no device".into());
        assert_eq!(err.to_string(), "entropy source unavailable: no device");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireError>();
    }
}
