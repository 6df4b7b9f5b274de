//! Booking DTOs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{BookingChanges, EntryAck, NewBooking};
use crate::domain::Booking;

/// Request to reserve a room
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, max = 64))]
    pub room_id: String,
    /// Start time (RFC 3339). Seconds are dropped.
    pub start_time: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub attendee_count: u32,
    /// Length in minutes, defaults to the configured booking duration
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i64>,
}

impl From<CreateBookingRequest> for NewBooking {
    fn from(r: CreateBookingRequest) -> Self {
        NewBooking {
            room_id: r.room_id,
            start_time: r.start_time,
            attendee_count: r.attendee_count,
            duration: r.duration_minutes.map(Duration::minutes),
        }
    }
}

/// Partial booking change. Omitted fields keep their current value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingRequest {
    #[validate(length(min = 1, max = 64))]
    pub room_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub attendee_count: Option<u32>,
}

impl From<UpdateBookingRequest> for BookingChanges {
    fn from(r: UpdateBookingRequest) -> Self {
        BookingChanges {
            start_time: r.start_time,
            attendee_count: r.attendee_count,
            room_id: r.room_id,
        }
    }
}

/// Check-in at the room door
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EntryRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: String,
    pub code: String,
    pub room_id: String,
    pub member_id: String,
    pub start_time: DateTime<Utc>,
    /// Absent once cancelled
    pub finish_time: Option<DateTime<Utc>>,
    pub attendee_count: u32,
    /// CHANGED, EXTENDED, FINISHED or CANCELLED
    pub tag: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            code: b.code,
            room_id: b.room_id,
            member_id: b.member_id,
            start_time: b.start_time,
            finish_time: b.finish_time,
            attendee_count: b.attendee_count,
            tag: b.tag.map(|t| t.as_str().to_string()),
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryResponse {
    pub booking_id: String,
    pub entry_time: DateTime<Utc>,
}

impl From<EntryAck> for EntryResponse {
    fn from(a: EntryAck) -> Self {
        Self {
            booking_id: a.booking_id,
            entry_time: a.entry_time,
        }
    }
}
