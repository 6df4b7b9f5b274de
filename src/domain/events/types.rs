//! Booking events
//!
//! Published after a booking mutation has been committed, or by the
//! reminder scheduler. Consumers look up anything else they need by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event types for notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    BookingCreated(BookingLifecycleEvent),
    BookingChanged(BookingLifecycleEvent),
    BookingExtended(BookingLifecycleEvent),
    BookingFinished(BookingLifecycleEvent),
    BookingCancelled(BookingLifecycleEvent),
    BookingReminder(ReminderEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BookingCreated(_) => "booking_created",
            Event::BookingChanged(_) => "booking_changed",
            Event::BookingExtended(_) => "booking_extended",
            Event::BookingFinished(_) => "booking_finished",
            Event::BookingCancelled(_) => "booking_cancelled",
            Event::BookingReminder(_) => "booking_reminder",
        }
    }

    pub fn booking_id(&self) -> &str {
        match self {
            Event::BookingCreated(e)
            | Event::BookingChanged(e)
            | Event::BookingExtended(e)
            | Event::BookingFinished(e)
            | Event::BookingCancelled(e) => &e.booking_id,
            Event::BookingReminder(e) => &e.booking_id,
        }
    }

    pub fn member_email(&self) -> &str {
        match self {
            Event::BookingCreated(e)
            | Event::BookingChanged(e)
            | Event::BookingExtended(e)
            | Event::BookingFinished(e)
            | Event::BookingCancelled(e) => &e.member_email,
            Event::BookingReminder(e) => &e.member_email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingLifecycleEvent {
    pub booking_id: String,
    pub member_email: String,
    pub timestamp: DateTime<Utc>,
}

impl BookingLifecycleEvent {
    pub fn new(
        booking_id: impl Into<String>,
        member_email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id: booking_id.into(),
            member_email: member_email.into(),
            timestamp,
        }
    }
}

/// Emitted once per booking found by a reminder scan. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub booking_id: String,
    pub member_email: String,
    pub starts_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
