//! Notification transports

use async_trait::async_trait;
use tracing::info;

use crate::domain::{DeliveryAck, NotificationMessage, Notifier, NotifyError};

/// Writes every notification to the log instead of a mailbox.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: NotificationMessage) -> Result<Option<DeliveryAck>, NotifyError> {
        if message.recipient.trim().is_empty() {
            return Err(NotifyError::Rejected("empty recipient".into()));
        }
        let message_id = uuid::Uuid::new_v4().to_string();
        info!(
            target: "meetbook::notify",
            %message_id,
            recipient = %message.recipient,
            audience = message.audience.as_str(),
            subject = %message.subject,
            body = %message.body,
            "✉️ Notification"
        );
        Ok(Some(DeliveryAck { message_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Audience;

    fn message(recipient: &str) -> NotificationMessage {
        NotificationMessage {
            recipient: recipient.into(),
            subject: "Booking confirmed: Fjord".into(),
            body: "See you there".into(),
            audience: Audience::Member,
        }
    }

    #[tokio::test]
    async fn acknowledges_with_message_id() {
        let ack = LogNotifier.send(message("ann@example.com")).await.unwrap();
        assert!(ack.is_some_and(|a| !a.message_id.is_empty()));
    }

    #[tokio::test]
    async fn blank_recipient_is_rejected() {
        let err = LogNotifier.send(message("  ")).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(_)));
    }
}
