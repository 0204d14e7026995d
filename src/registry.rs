//! Fallback handler registry.
//!
//! Handlers the host application wants to keep for a request kind the chat
//! layer intercepts live here, keyed by [`RequestKind`]. The dispatch
//! facade consults the registry whenever a request cannot be answered from
//! chat state alone.

use crate::error::BoxError;
use crate::types::RequestKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A fallback handler for one request kind.
///
/// Receives the raw request parameters and returns the kind's result
/// payload as JSON; the facade deserializes it into the typed result before
/// merging. Fallback handlers are supplied by the embedding application,
/// so they fail with an arbitrary boxed error; the facade wraps it as
/// [`crate::error::ChatError::Fallback`] and propagates it unmodified.
#[async_trait]
pub trait FallbackHandler: Send + Sync {
    /// Handle a request.
    async fn handle(&self, params: serde_json::Value) -> Result<serde_json::Value, BoxError>;
}

/// Registry of fallback handlers, one slot per request kind.
///
/// Registration is last-write-wins: a later handler for the same kind
/// silently replaces the earlier one. Entries are never removed; the
/// registry lives as long as its chat layer.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<RequestKind, Arc<dyn FallbackHandler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fallback handler for `kind`, replacing any existing one.
    pub async fn register(&self, kind: RequestKind, handler: Arc<dyn FallbackHandler>) {
        let mut handlers = self.handlers.write().await;
        if handlers.insert(kind, handler).is_some() {
            debug!(kind = %kind, "Replaced fallback handler");
        }
    }

    /// Look up the fallback handler for `kind`.
    pub async fn get(&self, kind: RequestKind) -> Option<Arc<dyn FallbackHandler>> {
        self.handlers.read().await.get(&kind).cloned()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry").finish_non_exhaustive()
    }
}

/// Fallback handler backed by a plain closure, for handlers that do not
/// need their own state or suspension points.
pub struct FunctionHandler<F>
where
    F: Fn(serde_json::Value) -> Result<serde_json::Value, BoxError> + Send + Sync,
{
    handler: F,
}

impl<F> FunctionHandler<F>
where
    F: Fn(serde_json::Value) -> Result<serde_json::Value, BoxError> + Send + Sync,
{
    /// Create a new function-based fallback handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> FallbackHandler for FunctionHandler<F>
where
    F: Fn(serde_json::Value) -> Result<serde_json::Value, BoxError> + Send + Sync,
{
    async fn handle(&self, params: serde_json::Value) -> Result<serde_json::Value, BoxError> {
        (self.handler)(params)
    }
}
