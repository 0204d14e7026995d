//! Chat layer error types.

use thiserror::Error;

/// Boxed error type used at the accessor and fallback boundaries.
///
/// The embedding application supplies the accessor contract and fallback
/// handlers; their errors cross into the chat layer as boxed trait objects
/// and propagate to the request caller unmodified.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Chat layer error types.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A resource URI did not match `chat+<protocol>:///<path>` during
    /// discovery. Fatal to the whole discovery operation under the
    /// fail-fast policy.
    #[error("Malformed resource URI: {0}")]
    MalformedResourceUri(String),

    /// Tool-call arguments failed the `{uri, message}` shape check.
    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    /// An accessor-contract call failed; propagated unmodified.
    #[error(transparent)]
    Accessor(BoxError),

    /// A fallback handler failed; propagated unmodified.
    #[error(transparent)]
    Fallback(BoxError),

    /// Payload (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No handler is installed for a request kind.
    #[error("No handler installed for {0}")]
    Unhandled(crate::types::RequestKind),
}

/// Result type for chat layer operations.
pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_error_is_transparent() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "backend down");
        let err = ChatError::Accessor(Box::new(inner));
        assert_eq!(err.to_string(), "backend down");
    }

    #[test]
    fn test_malformed_uri_message() {
        let err = ChatError::MalformedResourceUri("bad".to_string());
        assert_eq!(err.to_string(), "Malformed resource URI: bad");
    }
}
