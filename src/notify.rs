//! Update notification dispatch.
//!
//! When the embedding application learns of a new chat message it calls
//! [`NotificationDispatcher::notify_new_message`]. Two independent tasks
//! are spawned: a transport-native resource-updated event for the thread
//! URI, and a content-updated notification carrying the full message
//! payload. Delivery failures on either path are logged and swallowed;
//! they never reach the notifying caller.

use crate::accessor::ChatAccessor;
use crate::error::BoxError;
use crate::types::Notification;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Transport interface for pushing notifications to subscribers.
///
/// Subscription bookkeeping is entirely the transport's concern; the
/// dispatcher emits, it does not track who listens.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Emit the transport-native resource-updated event for `uri`.
    async fn resource_updated(&self, uri: &str) -> Result<(), BoxError>;

    /// Deliver a custom notification envelope.
    async fn send(&self, notification: Notification) -> Result<(), BoxError>;
}

/// Handles for the two in-flight notification tasks.
///
/// `notify_new_message` returns before either notification is delivered.
/// The caller may await delivery through [`NotificationTasks::join`], keep
/// the handles, or drop the value to fire and forget; dropping does not
/// cancel the tasks.
pub struct NotificationTasks {
    /// The resource-updated emission.
    pub resource_updated: JoinHandle<()>,

    /// The content-updated emission.
    pub content_updated: JoinHandle<()>,
}

impl NotificationTasks {
    /// Wait for both notification tasks to finish.
    ///
    /// Finishing means the delivery attempt completed, not that it
    /// succeeded; failures were already logged inside the tasks.
    pub async fn join(self) {
        let _ = self.resource_updated.await;
        let _ = self.content_updated.await;
    }
}

/// Emits update notifications for new chat messages.
///
/// Built from the same accessor contract as the chat layer plus the
/// transport's [`NotificationSink`]; both are explicit dependencies, there
/// is no shared server handle.
pub struct NotificationDispatcher {
    accessor: Arc<dyn ChatAccessor>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    /// Create a new dispatcher.
    pub fn new(accessor: Arc<dyn ChatAccessor>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { accessor, sink }
    }

    /// Announce that the thread at `uri` has a new message `message_id`.
    ///
    /// Spawns the two notification tasks and returns their handles
    /// immediately. The resource-updated event always names `uri`; the
    /// content-updated notification carries the full message found under
    /// `message_id` in the thread's current message list, or a `null`
    /// payload when no entry matches.
    pub fn notify_new_message(&self, uri: &str, message_id: &str) -> NotificationTasks {
        let resource_updated = {
            let sink = Arc::clone(&self.sink);
            let uri = uri.to_string();
            tokio::spawn(async move {
                if let Err(e) = sink.resource_updated(&uri).await {
                    warn!(uri = %uri, error = %e, "Failed to emit resource-updated notification");
                }
            })
        };

        let content_updated = {
            let accessor = Arc::clone(&self.accessor);
            let sink = Arc::clone(&self.sink);
            let uri = uri.to_string();
            let message_id = message_id.to_string();
            tokio::spawn(async move {
                let messages = match accessor.read_messages(&uri).await {
                    Ok(messages) => messages.unwrap_or_default(),
                    Err(e) => {
                        warn!(uri = %uri, error = %e, "Failed to read messages for content-updated notification");
                        return;
                    }
                };

                let message = messages.iter().find(|m| m.id == message_id);
                let notification = Notification::content_updated(message);
                if let Err(e) = sink.send(notification).await {
                    warn!(uri = %uri, error = %e, "Failed to emit content-updated notification");
                }
            })
        };

        NotificationTasks {
            resource_updated,
            content_updated,
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher").finish_non_exhaustive()
    }
}
