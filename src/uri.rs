//! Chat resource URI parsing.
//!
//! Chat thread URIs have the shape `chat+<protocol>:///<path>`. The
//! `chat+` prefix is the sole discriminator used for protocol discovery.

/// A parsed chat resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUri {
    /// Protocol discriminator, including the `chat+` marker
    /// (e.g. `chat+irc`).
    pub protocol: String,

    /// Everything after the triple slash. May be empty.
    pub pathname: String,
}

/// Parse a chat resource URI.
///
/// Returns `Some` iff `uri` matches `chat+<protocol>:///<path>` where
/// `<protocol>` is one or more non-colon characters. Non-matching input
/// yields `None`, never an error; callers decide whether that is fatal.
///
/// # Example
///
/// ```rust
/// use chat_mcp::uri::parse_chat_uri;
///
/// let parsed = parse_chat_uri("chat+irc:///#rust").unwrap();
/// assert_eq!(parsed.protocol, "chat+irc");
/// assert_eq!(parsed.pathname, "#rust");
/// ```
pub fn parse_chat_uri(uri: &str) -> Option<ChatUri> {
    let rest = uri.strip_prefix("chat+")?;
    let colon = rest.find(':')?;
    if colon == 0 {
        return None;
    }
    let (name, tail) = rest.split_at(colon);
    let pathname = tail.strip_prefix(":///")?;

    Some(ChatUri {
        protocol: format!("chat+{name}"),
        pathname: pathname.to_string(),
    })
}
