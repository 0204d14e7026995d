//! Protocol discovery.
//!
//! The set of chat protocols is not stored anywhere: it is the deduplicated
//! image of the URI parser over whatever resources the accessor contract
//! currently reports. Discovery runs on demand, once per request that needs
//! it.

use crate::accessor::ChatAccessor;
use crate::error::{ChatError, ChatResult};
use crate::uri::parse_chat_uri;
use tracing::warn;

/// Policy for resources whose URI does not parse as a chat URI.
///
/// The strict default makes a single malformed resource abort discovery for
/// every resource, which in turn disables tool synthesis for the whole
/// request. That is deliberate: a malformed URI in the accessor's output is
/// a bug in the embedding application, and surfacing it beats silently
/// serving a partial tool set. Embedders that prefer degraded service can
/// opt into `SkipMalformed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscoveryPolicy {
    /// Abort discovery with [`ChatError::MalformedResourceUri`] on the
    /// first resource that fails to parse.
    #[default]
    FailFast,

    /// Skip resources that fail to parse, logging a warning per URI.
    SkipMalformed,
}

/// Discover the distinct chat protocols present in the accessor's current
/// resource set.
///
/// An absent resource list is treated as empty. The result is deduplicated
/// and ordered by first occurrence, so it is deterministic for a fixed
/// resource list.
pub async fn discover_protocols(
    accessor: &dyn ChatAccessor,
    policy: DiscoveryPolicy,
) -> ChatResult<Vec<String>> {
    let resources = accessor
        .resources()
        .await
        .map_err(ChatError::Accessor)?
        .unwrap_or_default();

    let mut protocols: Vec<String> = Vec::new();
    for resource in &resources {
        match parse_chat_uri(&resource.uri) {
            Some(parsed) => {
                if !protocols.contains(&parsed.protocol) {
                    protocols.push(parsed.protocol);
                }
            }
            None => match policy {
                DiscoveryPolicy::FailFast => {
                    return Err(ChatError::MalformedResourceUri(resource.uri.clone()));
                }
                DiscoveryPolicy::SkipMalformed => {
                    warn!(uri = %resource.uri, "Skipping resource with malformed chat URI");
                }
            },
        }
    }

    Ok(protocols)
}
