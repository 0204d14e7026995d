//! The accessor contract.
//!
//! The embedding application supplies the chat layer's entire view of
//! thread storage through this trait. The chat layer treats it as an opaque
//! data source: resources, messages, and write confirmations are recomputed
//! per request and never cached.

use crate::error::BoxError;
use crate::types::{ChatMessage, Resource};
use async_trait::async_trait;

/// Externally supplied chat data source.
///
/// All three operations may legitimately return `Ok(None)`: an absent
/// resource list is treated as empty during discovery and listing, an
/// absent message list makes `resources/read` fall through to the
/// registered fallback handler, and an absent write confirmation is
/// rendered as an empty confirmation string.
///
/// Errors returned here propagate unmodified to the request caller; the
/// chat layer adds no retry and imposes no timeout.
#[async_trait]
pub trait ChatAccessor: Send + Sync {
    /// List the current chat thread resources.
    async fn resources(&self) -> Result<Option<Vec<Resource>>, BoxError>;

    /// Read the messages of the thread at `uri`.
    async fn read_messages(&self, uri: &str) -> Result<Option<Vec<ChatMessage>>, BoxError>;

    /// Write `message` into the thread at `uri`, returning a human-readable
    /// confirmation.
    async fn write_message(&self, uri: &str, message: &str) -> Result<Option<String>, BoxError>;
}
