//! Turns booking events into member notifications.
//!
//! Each event is handled on its own task, so a slow or failing notifier
//! never holds up the bus or other deliveries. Failures are logged and
//! dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::event_bus::EventBus;
use crate::config::NotificationSettings;
use crate::domain::{
    Audience, Booking, DomainError, DomainResult, Event, EventMessage, MeetingRoom,
    NotificationMessage, Notifier, RepositoryProvider,
};
use crate::shared::ShutdownSignal;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Copy settings for rendered messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTemplates {
    /// Figure quoted in reminder copy
    pub reminder_notice_minutes: i64,
}

impl NotificationTemplates {
    pub fn from_settings(settings: &NotificationSettings) -> Self {
        Self {
            reminder_notice_minutes: settings.reminder_notice_minutes,
        }
    }

    pub fn render(&self, event: &Event, booking: &Booking, room_name: &str) -> (String, String) {
        let start = booking.start_time.format(TIME_FORMAT);
        let finish = booking
            .finish_time
            .map(|f| f.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());

        match event {
            Event::BookingCreated(_) => (
                format!("Booking confirmed: {room_name}"),
                format!(
                    "Your booking {} of {room_name} for {} attendee(s) from {start} to {finish} is confirmed.",
                    booking.code, booking.attendee_count
                ),
            ),
            Event::BookingChanged(_) => (
                format!("Booking changed: {room_name}"),
                format!(
                    "Your booking {} now runs in {room_name} from {start} to {finish} for {} attendee(s).",
                    booking.code, booking.attendee_count
                ),
            ),
            Event::BookingExtended(_) => (
                format!("Booking extended: {room_name}"),
                format!(
                    "Your booking {} of {room_name} now ends at {finish}.",
                    booking.code
                ),
            ),
            Event::BookingFinished(_) => (
                format!("Booking finished: {room_name}"),
                format!(
                    "Your booking {} of {room_name} was closed at {finish}.",
                    booking.code
                ),
            ),
            Event::BookingCancelled(_) => (
                format!("Booking cancelled: {room_name}"),
                format!(
                    "Your booking {} of {room_name} starting {start} has been cancelled.",
                    booking.code
                ),
            ),
            Event::BookingReminder(_) => (
                format!(
                    "Reminder: {room_name} in {} minutes",
                    self.reminder_notice_minutes
                ),
                format!(
                    "Your booking {} of {room_name} starts in {} minutes, at {start}.",
                    booking.code, self.reminder_notice_minutes
                ),
            ),
        }
    }
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        Self::from_settings(&NotificationSettings::default())
    }
}

#[derive(Clone)]
pub struct NotificationListener {
    repos: Arc<dyn RepositoryProvider>,
    notifier: Arc<dyn Notifier>,
    templates: NotificationTemplates,
}

impl NotificationListener {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: Arc<dyn Notifier>,
        templates: NotificationTemplates,
    ) -> Self {
        Self {
            repos,
            notifier,
            templates,
        }
    }

    /// Subscribe now and dispatch events until the bus closes or shutdown fires.
    pub fn start(self, bus: &EventBus, shutdown: ShutdownSignal) -> JoinHandle<()> {
        let mut subscriber = bus.subscribe();

        tokio::spawn(async move {
            info!("📨 Notification listener started");
            loop {
                tokio::select! {
                    msg = subscriber.recv() => {
                        let Some(msg) = msg else { break };
                        let listener = self.clone();
                        tokio::spawn(async move { listener.deliver(msg).await });
                    }
                    _ = shutdown.notified().wait() => {
                        info!("📨 Notification listener shutting down");
                        break;
                    }
                }
            }
            info!("📨 Notification listener stopped");
        })
    }

    /// Handle a single event. Never fails outward.
    pub async fn deliver(&self, msg: EventMessage) {
        let event_type = msg.event.event_type();
        let booking_id = msg.event.booking_id().to_string();

        let message = match self.compose(&msg.event).await {
            Ok(message) => message,
            Err(e) => {
                warn!(event_type, %booking_id, error = %e, "Could not prepare notification");
                return;
            }
        };

        match self.notifier.send(message).await {
            Ok(ack) => {
                debug!(event_type, %booking_id, ?ack, "Notification sent");
            }
            Err(e) => {
                warn!(event_type, %booking_id, error = %e, "Notification delivery failed");
            }
        }
    }

    async fn compose(&self, event: &Event) -> DomainResult<NotificationMessage> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(event.booking_id())
            .await?
            .ok_or_else(|| DomainError::booking_not_found(event.booking_id()))?;

        let room_name = self
            .repos
            .rooms()
            .find_by_id(&booking.room_id)
            .await?
            .map(|room: MeetingRoom| room.name)
            .unwrap_or_else(|| booking.room_id.clone());

        let (subject, body) = self.templates.render(event, &booking, &room_name);
        Ok(NotificationMessage {
            recipient: event.member_email().to_string(),
            subject,
            body,
            audience: Audience::Member,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BookingLifecycleEvent, DeliveryAck, EventPublisher, NotifyError, ReminderEvent,
    };
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingNotifier {
        sent: Mutex<Vec<NotificationMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CollectingNotifier {
        async fn send(
            &self,
            message: NotificationMessage,
        ) -> Result<Option<DeliveryAck>, NotifyError> {
            if self.fail {
                return Err(NotifyError::Delivery("smtp down".into()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(None)
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, h, m, 0).unwrap()
    }

    async fn setup(fail: bool) -> (NotificationListener, Arc<CollectingNotifier>, Booking) {
        let repos = Arc::new(
            InMemoryRepositoryProvider::new().with_room(MeetingRoom::new("r1", "Fjord", 6)),
        );
        let booking = Booking::new("B-ABCD1234", "m1", "r1", at(10, 0), Duration::hours(1), 3, at(8, 0));
        repos.bookings().insert(&booking).await.unwrap();
        let notifier = Arc::new(CollectingNotifier {
            fail,
            ..Default::default()
        });
        let listener = NotificationListener::new(
            repos,
            notifier.clone(),
            NotificationTemplates {
                reminder_notice_minutes: 15,
            },
        );
        (listener, notifier, booking)
    }

    fn created(booking: &Booking) -> Event {
        Event::BookingCreated(BookingLifecycleEvent::new(&booking.id, "ann@example.com", at(8, 0)))
    }

    #[tokio::test]
    async fn created_event_is_rendered_with_room_name() {
        let (listener, notifier, booking) = setup(false).await;
        listener.deliver(EventMessage::new(created(&booking))).await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "ann@example.com");
        assert_eq!(sent[0].subject, "Booking confirmed: Fjord");
        assert!(sent[0].body.contains("B-ABCD1234"));
        assert!(sent[0].body.contains("2026-05-04 10:00 UTC"));
        assert_eq!(sent[0].audience, Audience::Member);
    }

    #[tokio::test]
    async fn reminder_copy_uses_configured_minutes() {
        let (listener, notifier, booking) = setup(false).await;
        let reminder = Event::BookingReminder(ReminderEvent {
            booking_id: booking.id.clone(),
            member_email: "ann@example.com".into(),
            starts_at: booking.start_time,
            timestamp: at(9, 50),
        });
        listener.deliver(EventMessage::new(reminder)).await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Reminder: Fjord in 15 minutes");
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let (listener, notifier, booking) = setup(true).await;
        listener.deliver(EventMessage::new(created(&booking))).await;
        assert!(notifier.sent.lock().unwrap().is_empty());

        let unknown = Event::BookingCancelled(BookingLifecycleEvent::new("gone", "x@example.com", at(8, 0)));
        listener.deliver(EventMessage::new(unknown)).await;
    }

    #[tokio::test]
    async fn listener_consumes_bus_events() {
        let (listener, notifier, booking) = setup(false).await;
        let bus = EventBus::new();
        let shutdown = ShutdownSignal::new();
        let handle = listener.start(&bus, shutdown.clone());

        bus.publish(created(&booking));

        let mut delivered = false;
        for _ in 0..50 {
            if !notifier.sent.lock().unwrap().is_empty() {
                delivered = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(delivered);

        shutdown.trigger();
        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
