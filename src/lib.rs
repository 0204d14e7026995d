//! # chat-mcp
//!
//! This crate layers chat semantics over an MCP (Model Context Protocol)
//! host: chat threads become addressable resources, every discovered chat
//! protocol gets a synthesized message-send tool, and new messages fan out
//! as update notifications to subscribers.
//!
//! ## Overview
//!
//! The chat-mcp crate handles:
//! - **Discovery**: deriving the set of chat protocols from the resource
//!   URIs the embedding application exposes
//! - **Tools**: synthesizing one message-send tool per discovered protocol
//! - **Dispatch**: serving `tools/list`, `tools/call`, `resources/list`,
//!   `resources/templates/list`, and `resources/read` with fallback to
//!   handlers the host registers
//! - **Notifications**: emitting resource-updated and content-updated
//!   events when new messages arrive
//!
//! Everything else — the transport, thread storage, subscription
//! bookkeeping — stays with the embedding application and is reached
//! through the [`ChatAccessor`], [`HandlerInstaller`], and
//! [`NotificationSink`] traits.
//!
//! ## Resource URIs
//!
//! Chat threads are addressed as `chat+<protocol>:///<path>`, for example
//! `chat+irc:///#rust` or `chat+slack:///general/thread-7`. The `chat+`
//! prefix is the sole discriminator used for protocol discovery: listing
//! tools over resources with `chat+irc` and `chat+slack` URIs yields
//! exactly two tools, named `chat+irc` and `chat+slack`, each taking
//! mandatory string arguments `uri` and `message`.
//!
//! ## Attachment and fallbacks
//!
//! Attaching installs one handler per [`RequestKind`] through the host's
//! [`HandlerInstaller`]. A handler the host had already installed for one
//! of those kinds is captured as that kind's initial fallback; handlers
//! the host adds later go through [`ChatLayer::register_fallback`]. Each
//! facade handler answers from chat state where it can and merges or
//! delegates to the fallback where it cannot (fallback tools come first in
//! `tools/list`; local resources and templates come first in their
//! listings).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chat_mcp::{
//!     ChatAccessor, ChatLayer, ChatMessage, DispatchTable, RequestKind, Resource,
//!     ResourceTemplate,
//! };
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct MyThreads;
//!
//! #[async_trait]
//! impl ChatAccessor for MyThreads {
//!     async fn resources(&self) -> Result<Option<Vec<Resource>>, chat_mcp::BoxError> {
//!         Ok(Some(vec![Resource::new("chat+irc:///#rust", "#rust")]))
//!     }
//!
//!     async fn read_messages(
//!         &self,
//!         uri: &str,
//!     ) -> Result<Option<Vec<ChatMessage>>, chat_mcp::BoxError> {
//!         Ok(Some(Vec::new()))
//!     }
//!
//!     async fn write_message(
//!         &self,
//!         uri: &str,
//!         message: &str,
//!     ) -> Result<Option<String>, chat_mcp::BoxError> {
//!         Ok(Some(format!("Sent to {uri}")))
//!     }
//! }
//!
//! async fn setup() {
//!     let layer = Arc::new(ChatLayer::new(
//!         Arc::new(MyThreads),
//!         ResourceTemplate::new("chat+{protocol}:///{path}", "chat thread"),
//!     ));
//!
//!     let mut host = DispatchTable::new();
//!     layer.attach(&mut host).await;
//!
//!     let tools = host
//!         .dispatch(RequestKind::ListTools, serde_json::json!({}))
//!         .await
//!         .unwrap();
//!     println!("{tools}");
//! }
//! ```
//!
//! ## Notifications
//!
//! ```rust,no_run
//! use chat_mcp::NotificationDispatcher;
//! use std::sync::Arc;
//!
//! # async fn notify(
//! #     accessor: Arc<dyn chat_mcp::ChatAccessor>,
//! #     sink: Arc<dyn chat_mcp::NotificationSink>,
//! # ) {
//! let dispatcher = NotificationDispatcher::new(accessor, sink);
//!
//! // Returns immediately; await the handles only if delivery matters here.
//! let tasks = dispatcher.notify_new_message("chat+irc:///#rust", "m17");
//! tasks.join().await;
//! # }
//! ```

pub mod accessor;
pub mod discovery;
pub mod error;
pub mod host;
pub mod layer;
pub mod notify;
pub mod registry;
pub mod tools;
pub mod types;
pub mod uri;

// Re-export main types
pub use accessor::ChatAccessor;
pub use discovery::{discover_protocols, DiscoveryPolicy};
pub use error::{BoxError, ChatError, ChatResult};
pub use host::{DispatchTable, FunctionRequestHandler, HandlerInstaller, RequestHandler};
pub use layer::ChatLayer;
pub use notify::{NotificationDispatcher, NotificationSink, NotificationTasks};
pub use registry::{FallbackHandler, FunctionHandler, HandlerRegistry};
pub use tools::synthesize_tools;
pub use types::{
    Author, CallToolParams, CallToolResult, ChatMessage, ContentBlock, ListResourceTemplatesResult,
    ListResourcesResult, ListToolsResult, Notification, ReadResourceParams, ReadResourceResult,
    RequestKind, Resource, ResourceContent, ResourceTemplate, SendMessageArgs, ToolDefinition,
    CONTENT_UPDATED_METHOD,
};
pub use uri::{parse_chat_uri, ChatUri};
