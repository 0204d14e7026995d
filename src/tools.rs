//! Message-send tool synthesis.
//!
//! Every discovered chat protocol gets exactly one tool, named after the
//! protocol itself, that writes a message into a thread of that protocol.

use crate::types::{ResourceTemplate, ToolDefinition};

/// Build one message-send tool definition per discovered protocol.
///
/// The tool name is the protocol string (`chat+irc` and so on) and the
/// description references the configured resource template's name. Every
/// synthesized tool takes the same two mandatory string arguments, `uri`
/// and `message`.
///
/// Synthesized names are not deduplicated against tools contributed by a
/// fallback handler; avoiding that collision is the embedder's job.
pub fn synthesize_tools(protocols: &[String], template: &ResourceTemplate) -> Vec<ToolDefinition> {
    protocols
        .iter()
        .map(|protocol| {
            ToolDefinition::new(
                protocol,
                format!("Send a message to a {} thread", template.name),
            )
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "uri": {
                        "type": "string",
                        "description": "URI of the chat thread to write into"
                    },
                    "message": {
                        "type": "string",
                        "description": "Message body to send"
                    }
                },
                "required": ["uri", "message"]
            }))
        })
        .collect()
}
