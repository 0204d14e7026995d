//! Chat extension protocol types
//!
//! This module defines the data model shared by the dispatch facade, the
//! discovery machinery, and the notification dispatcher: chat resources and
//! messages, synthesized tool definitions, per-kind request/result payloads,
//! and the notification envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request kinds the chat layer intercepts on the host.
///
/// Each kind is an explicit compile-time tag. Fallback handlers are keyed by
/// this enum, so two distinct kinds can never collide the way shape-derived
/// keys could.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// `tools/list`
    ListTools,
    /// `tools/call`
    CallTool,
    /// `resources/list`
    ListResources,
    /// `resources/templates/list`
    ListResourceTemplates,
    /// `resources/read`
    ReadResource,
}

impl RequestKind {
    /// All kinds the facade installs handlers for.
    pub const ALL: [RequestKind; 5] = [
        RequestKind::ListTools,
        RequestKind::CallTool,
        RequestKind::ListResources,
        RequestKind::ListResourceTemplates,
        RequestKind::ReadResource,
    ];

    /// The MCP method name for this request kind.
    pub fn method(&self) -> &'static str {
        match self {
            RequestKind::ListTools => "tools/list",
            RequestKind::CallTool => "tools/call",
            RequestKind::ListResources => "resources/list",
            RequestKind::ListResourceTemplates => "resources/templates/list",
            RequestKind::ReadResource => "resources/read",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method())
    }
}

/// An addressable chat thread exposed through the host's resource listing.
///
/// The `uri` must match `chat+<protocol>:///<path>` to participate in
/// protocol discovery. Owned by the accessor contract; the chat layer never
/// mutates resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Resource URI
    pub uri: String,

    /// Human-readable name
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource {
    /// Create a new resource.
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Pattern descriptor advertising which resource URIs this chat layer serves.
///
/// One instance per chat layer, supplied at construction and immutable
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    /// URI template (e.g. `chat+irc:///{channel}`)
    pub uri_template: String,

    /// Human-readable name
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResourceTemplate {
    /// Create a new resource template.
    pub fn new(uri_template: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri_template: uri_template.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name
    pub name: String,

    /// Backend-specific author ID
    pub id: String,
}

/// A single chat event within a thread.
///
/// Produced by the accessor contract; the chat layer reads messages but
/// never persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message ID, unique within the thread
    pub id: String,

    /// URI of the thread this message belongs to
    pub uri: String,

    /// Message author
    pub author: Author,

    /// Message body
    pub content: String,

    /// When the message was produced
    pub timestamp: DateTime<Utc>,
}

/// Tool definition advertised through `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (unique identifier)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Input schema (JSON Schema)
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition with an empty object schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    /// Set the input schema.
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// Content block in tool-call results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content
    Text { text: String },
}

impl ContentBlock {
    /// Create a text content block.
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// `tools/list` result payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Available tools
    pub tools: Vec<ToolDefinition>,
}

/// `tools/call` request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Tool name
    pub name: String,

    /// Arguments
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Arguments accepted by every synthesized message-send tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageArgs {
    /// Thread URI to write into
    pub uri: String,

    /// Message body
    pub message: String,
}

/// `tools/call` result payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Result content
    pub content: Vec<ContentBlock>,
}

impl CallToolResult {
    /// Create a result with a single text content item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// `resources/list` result payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResourcesResult {
    /// Available resources
    pub resources: Vec<Resource>,
}

/// `resources/templates/list` result payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourceTemplatesResult {
    /// Available resource templates
    pub resource_templates: Vec<ResourceTemplate>,
}

/// `resources/read` request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceParams {
    /// Resource URI to read
    pub uri: String,
}

/// One content item in a `resources/read` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    /// Resource URI
    pub uri: String,

    /// MIME type of `text`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Content body
    pub text: String,
}

/// `resources/read` result payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadResourceResult {
    /// Resource contents
    pub contents: Vec<ResourceContent>,
}

/// Method name of the content-updated notification.
pub const CONTENT_UPDATED_METHOD: &str = "notifications/resources/content_updated";

/// A notification envelope delivered through the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification method
    pub method: String,

    /// Notification parameters
    pub params: serde_json::Value,
}

impl Notification {
    /// Create a content-updated notification.
    ///
    /// `content` is the full message payload, or `None` when the message
    /// could not be found in its thread (serialized as JSON `null`).
    pub fn content_updated(content: Option<&ChatMessage>) -> Self {
        Self {
            method: CONTENT_UPDATED_METHOD.to_string(),
            params: serde_json::json!({ "content": content }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kind_methods() {
        assert_eq!(RequestKind::ListTools.method(), "tools/list");
        assert_eq!(RequestKind::CallTool.to_string(), "tools/call");
        assert_eq!(RequestKind::ALL.len(), 5);
    }

    #[test]
    fn test_resource_template_wire_format() {
        let template = ResourceTemplate::new("chat+irc:///{channel}", "IRC channels");
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["uriTemplate"], "chat+irc:///{channel}");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_tool_definition_wire_format() {
        let tool = ToolDefinition::new("chat+irc", "Send a message").with_schema(
            serde_json::json!({
                "type": "object",
                "properties": {
                    "uri": {"type": "string"},
                    "message": {"type": "string"}
                },
                "required": ["uri", "message"]
            }),
        );
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["inputSchema"]["required"][0], "uri");
    }

    #[test]
    fn test_content_updated_payload() {
        let message = ChatMessage {
            id: "m1".to_string(),
            uri: "chat+irc:///#rust".to_string(),
            author: Author {
                name: "ferris".to_string(),
                id: "u42".to_string(),
            },
            content: "hello".to_string(),
            timestamp: Utc::now(),
        };

        let notification = Notification::content_updated(Some(&message));
        assert_eq!(notification.method, CONTENT_UPDATED_METHOD);
        assert_eq!(notification.params["content"]["id"], "m1");

        let absent = Notification::content_updated(None);
        assert!(absent.params["content"].is_null());
    }
}
