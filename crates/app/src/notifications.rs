//! Notification Dispatch
//!
//! Campaign messages leave the engine through a [`NotificationDispatcher`].
//! Delivery failures are reported per recipient and never abort a campaign.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// A message for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Short title shown in the notification tray.
    pub title: String,

    /// Message body.
    pub body: String,
}

/// Delivery failure for one recipient.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The recipient has no reachable channel.
    #[error("recipient unreachable")]
    Unreachable,

    /// The delivery provider refused the message.
    #[error("notification provider error")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Outbound notification channel.
#[automock]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver `notification` to `recipient`.
    async fn send(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError>;
}

/// Dispatcher that only records deliveries in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        info!(recipient, title = %notification.title, "notification dispatched");

        Ok(())
    }
}
