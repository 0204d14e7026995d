//! The chat layer dispatch facade.
//!
//! [`ChatLayer`] owns the five request handlers the chat extension installs
//! on the host: `tools/list`, `tools/call`, `resources/list`,
//! `resources/templates/list`, and `resources/read`. Each handler answers
//! from chat state where it can and falls through to the handler registry
//! where it cannot.
//!
//! Attachment is declarative rather than invasive: `attach` installs one
//! adapter per request kind through the host's [`HandlerInstaller`], and a
//! handler the host had already installed for one of those kinds is
//! captured into the registry as that kind's initial fallback. Handlers the
//! host wants to add after attachment go through
//! [`ChatLayer::register_fallback`]; they are reachable only via the
//! fallback paths described on each operation.

use crate::accessor::ChatAccessor;
use crate::discovery::{discover_protocols, DiscoveryPolicy};
use crate::error::{ChatError, ChatResult};
use crate::host::{HandlerInstaller, RequestHandler};
use crate::registry::{FallbackHandler, HandlerRegistry};
use crate::tools::synthesize_tools;
use crate::types::{
    CallToolParams, CallToolResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult, ReadResourceParams, ReadResourceResult, RequestKind, ResourceContent,
    ResourceTemplate, SendMessageArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Chat extension layer over a request/response host.
///
/// Constructed from the accessor contract and a single resource template;
/// holds no reference to the host or its transport. Notifications are
/// handled separately by [`crate::notify::NotificationDispatcher`].
pub struct ChatLayer {
    /// Thread storage, supplied by the embedding application
    accessor: Arc<dyn ChatAccessor>,

    /// The one URI-shape descriptor this layer serves
    template: ResourceTemplate,

    /// Policy for malformed resource URIs during discovery
    policy: DiscoveryPolicy,

    /// Fallback handlers, keyed by request kind
    registry: HandlerRegistry,
}

impl ChatLayer {
    /// Create a new chat layer with the default fail-fast discovery policy.
    pub fn new(accessor: Arc<dyn ChatAccessor>, template: ResourceTemplate) -> Self {
        Self {
            accessor,
            template,
            policy: DiscoveryPolicy::default(),
            registry: HandlerRegistry::new(),
        }
    }

    /// Set the discovery policy.
    pub fn with_policy(mut self, policy: DiscoveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register a fallback handler for `kind`.
    ///
    /// This is the registration entry point for handlers added after
    /// attachment. Last write wins; the previous handler for the same kind
    /// is dropped.
    pub async fn register_fallback(&self, kind: RequestKind, handler: Arc<dyn FallbackHandler>) {
        self.registry.register(kind, handler).await;
    }

    /// Install the facade on a host.
    ///
    /// One handler per [`RequestKind`] is installed through the host's
    /// [`HandlerInstaller`]. A handler the host had already installed for
    /// one of those kinds becomes that kind's initial fallback instead of
    /// being dropped.
    pub async fn attach(self: &Arc<Self>, host: &mut dyn HandlerInstaller) {
        for kind in RequestKind::ALL {
            let adapter: Arc<dyn RequestHandler> = Arc::new(FacadeHandler {
                layer: Arc::clone(self),
                kind,
            });
            if let Some(displaced) = host.install(kind, adapter) {
                debug!(kind = %kind, "Capturing displaced host handler as fallback");
                self.registry
                    .register(kind, Arc::new(DisplacedHandler(displaced)))
                    .await;
            }
        }
    }

    /// Invoke the fallback handler for `kind`, if one is registered.
    ///
    /// A failing fallback surfaces as [`ChatError::Fallback`], carrying the
    /// handler's error unmodified.
    async fn fallback(
        &self,
        kind: RequestKind,
        params: serde_json::Value,
    ) -> ChatResult<Option<serde_json::Value>> {
        match self.registry.get(kind).await {
            Some(handler) => handler
                .handle(params)
                .await
                .map(Some)
                .map_err(ChatError::Fallback),
            None => Ok(None),
        }
    }

    async fn discover(&self) -> ChatResult<Vec<String>> {
        discover_protocols(self.accessor.as_ref(), self.policy).await
    }

    /// Handle `tools/list`.
    ///
    /// Synthesizes one message-send tool per discovered protocol and
    /// appends them after whatever tools the fallback handler contributes.
    /// Under the fail-fast policy a single malformed resource URI aborts
    /// the whole listing.
    #[instrument(skip(self), fields(kind = %RequestKind::ListTools))]
    pub async fn list_tools(&self) -> ChatResult<ListToolsResult> {
        let protocols = self.discover().await?;
        let synthesized = synthesize_tools(&protocols, &self.template);
        debug!(count = synthesized.len(), "Synthesized message-send tools");

        let mut tools = match self
            .fallback(RequestKind::ListTools, serde_json::json!({}))
            .await?
        {
            Some(value) => serde_json::from_value::<ListToolsResult>(value)?.tools,
            None => Vec::new(),
        };
        tools.extend(synthesized);

        Ok(ListToolsResult { tools })
    }

    /// Handle `tools/call`.
    ///
    /// If the tool name is a discovered protocol, the arguments must be
    /// `{uri, message}` (anything else is [`ChatError::InvalidToolArguments`])
    /// and the accessor's write confirmation becomes the sole content item.
    /// Any other name is delegated entirely to the fallback handler; with
    /// no fallback registered the result is an empty content list.
    #[instrument(skip(self, params), fields(kind = %RequestKind::CallTool, tool = %params.name))]
    pub async fn call_tool(&self, params: CallToolParams) -> ChatResult<CallToolResult> {
        let protocols = self.discover().await?;

        if protocols.contains(&params.name) {
            let args: SendMessageArgs = serde_json::from_value(params.arguments)
                .map_err(|e| ChatError::InvalidToolArguments(e.to_string()))?;

            debug!(uri = %args.uri, "Writing chat message");
            let confirmation = self
                .accessor
                .write_message(&args.uri, &args.message)
                .await
                .map_err(ChatError::Accessor)?
                .unwrap_or_default();

            return Ok(CallToolResult::text(confirmation));
        }

        match self
            .fallback(RequestKind::CallTool, serde_json::to_value(&params)?)
            .await?
        {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(CallToolResult::default()),
        }
    }

    /// Handle `resources/read`.
    ///
    /// A thread the accessor knows is returned as a single JSON content
    /// item wrapping `{uri, messages}`. An absent message list delegates
    /// entirely to the fallback handler; with no fallback registered the
    /// contents are empty.
    #[instrument(skip(self, params), fields(kind = %RequestKind::ReadResource, uri = %params.uri))]
    pub async fn read_resource(&self, params: ReadResourceParams) -> ChatResult<ReadResourceResult> {
        match self
            .accessor
            .read_messages(&params.uri)
            .await
            .map_err(ChatError::Accessor)?
        {
            Some(messages) => {
                let payload = serde_json::json!({
                    "uri": &params.uri,
                    "messages": messages,
                });
                Ok(ReadResourceResult {
                    contents: vec![ResourceContent {
                        uri: params.uri,
                        mime_type: Some("application/json".to_string()),
                        text: serde_json::to_string(&payload)?,
                    }],
                })
            }
            None => match self
                .fallback(RequestKind::ReadResource, serde_json::to_value(&params)?)
                .await?
            {
                Some(value) => Ok(serde_json::from_value(value)?),
                None => Ok(ReadResourceResult::default()),
            },
        }
    }

    /// Handle `resources/list`.
    ///
    /// The accessor's resources come first (an absent list is empty),
    /// followed by whatever the fallback handler contributes.
    #[instrument(skip(self), fields(kind = %RequestKind::ListResources))]
    pub async fn list_resources(&self) -> ChatResult<ListResourcesResult> {
        let mut resources = self
            .accessor
            .resources()
            .await
            .map_err(ChatError::Accessor)?
            .unwrap_or_default();

        if let Some(value) = self
            .fallback(RequestKind::ListResources, serde_json::json!({}))
            .await?
        {
            let fallback: ListResourcesResult = serde_json::from_value(value)?;
            resources.extend(fallback.resources);
        }

        Ok(ListResourcesResult { resources })
    }

    /// Handle `resources/templates/list`.
    ///
    /// The single configured template comes first, followed by whatever the
    /// fallback handler contributes.
    #[instrument(skip(self), fields(kind = %RequestKind::ListResourceTemplates))]
    pub async fn list_resource_templates(&self) -> ChatResult<ListResourceTemplatesResult> {
        let mut resource_templates = vec![self.template.clone()];

        if let Some(value) = self
            .fallback(RequestKind::ListResourceTemplates, serde_json::json!({}))
            .await?
        {
            let fallback: ListResourceTemplatesResult = serde_json::from_value(value)?;
            resource_templates.extend(fallback.resource_templates);
        }

        Ok(ListResourceTemplatesResult { resource_templates })
    }
}

impl std::fmt::Debug for ChatLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatLayer")
            .field("template", &self.template)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Per-kind adapter installed on the host at attach time.
struct FacadeHandler {
    layer: Arc<ChatLayer>,
    kind: RequestKind,
}

#[async_trait]
impl RequestHandler for FacadeHandler {
    async fn handle(&self, params: serde_json::Value) -> ChatResult<serde_json::Value> {
        match self.kind {
            RequestKind::ListTools => {
                Ok(serde_json::to_value(self.layer.list_tools().await?)?)
            }
            RequestKind::CallTool => {
                let params: CallToolParams = serde_json::from_value(params)?;
                Ok(serde_json::to_value(self.layer.call_tool(params).await?)?)
            }
            RequestKind::ListResources => {
                Ok(serde_json::to_value(self.layer.list_resources().await?)?)
            }
            RequestKind::ListResourceTemplates => Ok(serde_json::to_value(
                self.layer.list_resource_templates().await?,
            )?),
            RequestKind::ReadResource => {
                let params: ReadResourceParams = serde_json::from_value(params)?;
                Ok(serde_json::to_value(self.layer.read_resource(params).await?)?)
            }
        }
    }
}

/// Host handler displaced at attach time, replayed as a fallback.
struct DisplacedHandler(Arc<dyn RequestHandler>);

#[async_trait]
impl FallbackHandler for DisplacedHandler {
    async fn handle(
        &self,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, crate::error::BoxError> {
        self.0.handle(params).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::registry::FunctionHandler;
    use crate::types::{Author, ChatMessage, Resource};
    use chrono::Utc;
    use std::sync::Mutex;

    /// In-memory accessor double that records write calls.
    struct MemoryAccessor {
        resources: Option<Vec<Resource>>,
        messages: Option<Vec<ChatMessage>>,
        writes: Mutex<Vec<(String, String)>>,
    }

    impl MemoryAccessor {
        fn new(uris: &[&str]) -> Self {
            Self {
                resources: Some(uris.iter().map(|u| Resource::new(*u, "thread")).collect()),
                messages: None,
                writes: Mutex::new(Vec::new()),
            }
        }

        fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
            self.messages = Some(messages);
            self
        }
    }

    #[async_trait]
    impl ChatAccessor for MemoryAccessor {
        async fn resources(&self) -> Result<Option<Vec<Resource>>, BoxError> {
            Ok(self.resources.clone())
        }

        async fn read_messages(&self, _uri: &str) -> Result<Option<Vec<ChatMessage>>, BoxError> {
            Ok(self.messages.clone())
        }

        async fn write_message(
            &self,
            uri: &str,
            message: &str,
        ) -> Result<Option<String>, BoxError> {
            self.writes
                .lock()
                .unwrap()
                .push((uri.to_string(), message.to_string()));
            Ok(Some(format!("Sent to {uri}")))
        }
    }

    fn message(id: &str, uri: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            uri: uri.to_string(),
            author: Author {
                name: "ferris".to_string(),
                id: "u1".to_string(),
            },
            content: "hi".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn layer(accessor: MemoryAccessor) -> ChatLayer {
        ChatLayer::new(
            Arc::new(accessor),
            ResourceTemplate::new("chat+{protocol}:///{path}", "chat thread"),
        )
    }

    #[tokio::test]
    async fn test_list_tools_fallback_first_then_synthesized() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        layer
            .register_fallback(
                RequestKind::ListTools,
                Arc::new(FunctionHandler::new(|_| {
                    Ok(serde_json::json!({
                        "tools": [{"name": "existing", "description": "d", "inputSchema": {}}]
                    }))
                })),
            )
            .await;

        let result = layer.list_tools().await.unwrap();
        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["existing", "chat+irc"]);
    }

    #[tokio::test]
    async fn test_list_tools_fails_fast_on_malformed_uri() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust", "bad"]));
        let err = layer.list_tools().await.unwrap_err();
        assert!(matches!(err, ChatError::MalformedResourceUri(uri) if uri == "bad"));
    }

    #[tokio::test]
    async fn test_call_tool_writes_exactly_once() {
        let accessor = Arc::new(MemoryAccessor::new(&["chat+irc:///#rust"]));
        let layer = ChatLayer::new(
            accessor.clone(),
            ResourceTemplate::new("chat+{protocol}:///{path}", "chat thread"),
        );

        let result = layer
            .call_tool(CallToolParams {
                name: "chat+irc".to_string(),
                arguments: serde_json::json!({"uri": "chat+irc:///#rust", "message": "hello"}),
            })
            .await
            .unwrap();

        let writes = accessor.writes.lock().unwrap();
        assert_eq!(
            writes.as_slice(),
            &[("chat+irc:///#rust".to_string(), "hello".to_string())]
        );
        assert_eq!(
            result.content,
            vec![crate::types::ContentBlock::text("Sent to chat+irc:///#rust")]
        );
    }

    #[tokio::test]
    async fn test_call_tool_rejects_bad_arguments() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        let err = layer
            .call_tool(CallToolParams {
                name: "chat+irc".to_string(),
                arguments: serde_json::json!({"uri": "chat+irc:///#rust"}),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidToolArguments(_)));
    }

    #[tokio::test]
    async fn test_call_tool_unknown_name_without_fallback_is_empty() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        let result = layer
            .call_tool(CallToolParams {
                name: "not-a-protocol".to_string(),
                arguments: serde_json::json!({}),
            })
            .await
            .unwrap();
        assert!(result.content.is_empty());
    }

    #[tokio::test]
    async fn test_call_tool_unknown_name_delegates_to_fallback() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        layer
            .register_fallback(
                RequestKind::CallTool,
                Arc::new(FunctionHandler::new(|params| {
                    assert_eq!(params["name"], "other_tool");
                    Ok(serde_json::json!({
                        "content": [{"type": "text", "text": "from fallback"}]
                    }))
                })),
            )
            .await;

        let result = layer
            .call_tool(CallToolParams {
                name: "other_tool".to_string(),
                arguments: serde_json::json!({"x": 1}),
            })
            .await
            .unwrap();
        assert_eq!(
            result.content,
            vec![crate::types::ContentBlock::text("from fallback")]
        );
    }

    #[tokio::test]
    async fn test_read_resource_wraps_messages_as_json() {
        let accessor = MemoryAccessor::new(&["chat+irc:///#rust"])
            .with_messages(vec![message("m1", "chat+irc:///#rust")]);
        let layer = layer(accessor);

        let result = layer
            .read_resource(ReadResourceParams {
                uri: "chat+irc:///#rust".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.contents.len(), 1);
        let content = &result.contents[0];
        assert_eq!(content.uri, "chat+irc:///#rust");
        assert_eq!(content.mime_type.as_deref(), Some("application/json"));

        let payload: serde_json::Value = serde_json::from_str(&content.text).unwrap();
        assert_eq!(payload["uri"], "chat+irc:///#rust");
        assert_eq!(payload["messages"][0]["id"], "m1");
    }

    #[tokio::test]
    async fn test_read_resource_absent_without_fallback_is_empty() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        let result = layer
            .read_resource(ReadResourceParams {
                uri: "chat+irc:///#rust".to_string(),
            })
            .await
            .unwrap();
        assert!(result.contents.is_empty());
    }

    #[tokio::test]
    async fn test_read_resource_absent_delegates_to_fallback() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        layer
            .register_fallback(
                RequestKind::ReadResource,
                Arc::new(FunctionHandler::new(|params| {
                    Ok(serde_json::json!({
                        "contents": [{"uri": params["uri"], "text": "fallback body"}]
                    }))
                })),
            )
            .await;

        let result = layer
            .read_resource(ReadResourceParams {
                uri: "chat+irc:///#rust".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result.contents[0].text, "fallback body");
    }

    #[tokio::test]
    async fn test_list_resources_local_before_fallback() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        layer
            .register_fallback(
                RequestKind::ListResources,
                Arc::new(FunctionHandler::new(|_| {
                    Ok(serde_json::json!({
                        "resources": [{"uri": "other:///x", "name": "other"}]
                    }))
                })),
            )
            .await;

        let result = layer.list_resources().await.unwrap();
        let uris: Vec<&str> = result.resources.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["chat+irc:///#rust", "other:///x"]);
    }

    #[tokio::test]
    async fn test_list_resource_templates_local_before_fallback() {
        let layer = layer(MemoryAccessor::new(&[]));
        layer
            .register_fallback(
                RequestKind::ListResourceTemplates,
                Arc::new(FunctionHandler::new(|_| {
                    Ok(serde_json::json!({
                        "resourceTemplates": [{"uriTemplate": "other:///{x}", "name": "other"}]
                    }))
                })),
            )
            .await;

        let result = layer.list_resource_templates().await.unwrap();
        assert_eq!(result.resource_templates.len(), 2);
        assert_eq!(result.resource_templates[0].name, "chat thread");
        assert_eq!(result.resource_templates[1].name, "other");
    }

    #[tokio::test]
    async fn test_skip_malformed_policy_serves_partial_tool_set() {
        let layer = ChatLayer::new(
            Arc::new(MemoryAccessor::new(&[
                "chat+irc:///#rust",
                "bad",
                "chat+slack:///general",
            ])),
            ResourceTemplate::new("chat+{protocol}:///{path}", "chat thread"),
        )
        .with_policy(DiscoveryPolicy::SkipMalformed);

        let result = layer.list_tools().await.unwrap();
        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["chat+irc", "chat+slack"]);
    }

    #[tokio::test]
    async fn test_fallback_errors_surface_unmodified() {
        let layer = layer(MemoryAccessor::new(&["chat+irc:///#rust"]));
        layer
            .register_fallback(
                RequestKind::CallTool,
                Arc::new(FunctionHandler::new(|_| Err("fallback broke".into()))),
            )
            .await;

        let err = layer
            .call_tool(CallToolParams {
                name: "not-a-protocol".to_string(),
                arguments: serde_json::json!({}),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Fallback(_)));
        assert_eq!(err.to_string(), "fallback broke");
    }

    #[tokio::test]
    async fn test_accessor_errors_propagate_unmodified() {
        struct FailingAccessor;

        #[async_trait]
        impl ChatAccessor for FailingAccessor {
            async fn resources(&self) -> Result<Option<Vec<Resource>>, BoxError> {
                Err("backend down".into())
            }

            async fn read_messages(
                &self,
                _uri: &str,
            ) -> Result<Option<Vec<ChatMessage>>, BoxError> {
                Err("backend down".into())
            }

            async fn write_message(
                &self,
                _uri: &str,
                _message: &str,
            ) -> Result<Option<String>, BoxError> {
                Err("backend down".into())
            }
        }

        let layer = ChatLayer::new(
            Arc::new(FailingAccessor),
            ResourceTemplate::new("chat+{protocol}:///{path}", "chat thread"),
        );

        let err = layer.list_tools().await.unwrap_err();
        assert_eq!(err.to_string(), "backend down");
    }
}
