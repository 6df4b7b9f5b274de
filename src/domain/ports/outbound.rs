//! Outbound ports: event publication, notification delivery and code generation

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::Event;

/// Fire-and-forget publication of committed booking facts.
///
/// Implementations must not block the caller on delivery.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: Event);
}

/// Produces short, human-readable booking codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Member,
    Admin,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub audience: Audience,
}

/// Receipt returned by transports that confirm delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAck {
    pub message_id: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Recipient rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: NotificationMessage) -> Result<Option<DeliveryAck>, NotifyError>;
}
