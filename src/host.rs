//! Host-side handler interfaces.
//!
//! The underlying request/response server is an external collaborator. The
//! chat layer only needs two things from it: a way to install a handler per
//! request kind at attach time, and the handler signature those installed
//! handlers must satisfy. [`DispatchTable`] is a ready-made implementation
//! of the host side for embedders (and tests) that do not bring their own.

use crate::error::{ChatError, ChatResult};
use crate::types::RequestKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A request handler installed on the host for one request kind.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle a request, returning the result payload as JSON.
    async fn handle(&self, params: serde_json::Value) -> ChatResult<serde_json::Value>;
}

/// Installation point the host exposes to the chat layer.
///
/// `install` replaces the host's handler for `kind` and returns the handler
/// it displaced, if any. The chat layer captures displaced handlers as
/// fallbacks, so attaching never silently drops behavior the host had
/// already registered.
pub trait HandlerInstaller {
    /// Install `handler` for `kind`, returning the displaced handler.
    fn install(
        &mut self,
        kind: RequestKind,
        handler: Arc<dyn RequestHandler>,
    ) -> Option<Arc<dyn RequestHandler>>;
}

/// An explicit per-kind handler table the host composes declaratively.
///
/// This is the handler-chain abstraction the embedding application can use
/// as its dispatch layer: register handlers before attaching the chat
/// layer, let the layer take over the kinds it serves, and route incoming
/// requests through [`DispatchTable::dispatch`].
#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<RequestKind, Arc<dyn RequestHandler>>,
}

impl DispatchTable {
    /// Create an empty dispatch table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a request to the handler installed for `kind`.
    pub async fn dispatch(
        &self,
        kind: RequestKind,
        params: serde_json::Value,
    ) -> ChatResult<serde_json::Value> {
        let handler = self
            .handlers
            .get(&kind)
            .ok_or(ChatError::Unhandled(kind))?;
        handler.handle(params).await
    }

    /// Whether a handler is installed for `kind`.
    pub fn handles(&self, kind: RequestKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

impl HandlerInstaller for DispatchTable {
    fn install(
        &mut self,
        kind: RequestKind,
        handler: Arc<dyn RequestHandler>,
    ) -> Option<Arc<dyn RequestHandler>> {
        self.handlers.insert(kind, handler)
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Request handler backed by a plain closure.
pub struct FunctionRequestHandler<F>
where
    F: Fn(serde_json::Value) -> ChatResult<serde_json::Value> + Send + Sync,
{
    handler: F,
}

impl<F> FunctionRequestHandler<F>
where
    F: Fn(serde_json::Value) -> ChatResult<serde_json::Value> + Send + Sync,
{
    /// Create a new function-based request handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> RequestHandler for FunctionRequestHandler<F>
where
    F: Fn(serde_json::Value) -> ChatResult<serde_json::Value> + Send + Sync,
{
    async fn handle(&self, params: serde_json::Value) -> ChatResult<serde_json::Value> {
        (self.handler)(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_reaches_installed_handler() {
        let mut table = DispatchTable::new();
        table.install(
            RequestKind::ListTools,
            Arc::new(FunctionRequestHandler::new(|_| {
                Ok(serde_json::json!({"tools": []}))
            })),
        );

        let result = table
            .dispatch(RequestKind::ListTools, serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!({"tools": []}));
    }

    #[tokio::test]
    async fn test_dispatch_without_handler_fails() {
        let table = DispatchTable::new();
        let err = table
            .dispatch(RequestKind::CallTool, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Unhandled(RequestKind::CallTool)));
    }

    #[tokio::test]
    async fn test_install_returns_displaced_handler() {
        let mut table = DispatchTable::new();
        let first: Arc<dyn RequestHandler> =
            Arc::new(FunctionRequestHandler::new(|_| Ok(serde_json::json!(1))));

        assert!(table.install(RequestKind::ListResources, first).is_none());

        let second: Arc<dyn RequestHandler> =
            Arc::new(FunctionRequestHandler::new(|_| Ok(serde_json::json!(2))));
        let displaced = table.install(RequestKind::ListResources, second).unwrap();
        let result = displaced.handle(serde_json::json!({})).await.unwrap();
        assert_eq!(result, serde_json::json!(1));
    }
}
