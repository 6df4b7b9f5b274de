//! Booking repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Booking;
use crate::shared::{DomainResult, PaginatedResult, PaginationParams};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>>;

    /// Persist a new booking.
    ///
    /// The overlap check and the write happen atomically; a booking that
    /// would overlap a non-cancelled booking in the same room is rejected
    /// with `DomainError::AlreadyBooked`.
    async fn insert(&self, booking: &Booking) -> DomainResult<()>;

    /// Overwrite an existing booking in place, with the same atomic overlap
    /// guard as [`insert`](Self::insert) (the booking itself excluded).
    async fn update(&self, booking: &Booking) -> DomainResult<()>;

    /// Non-cancelled bookings in `room_id` overlapping `[start, end)`.
    async fn find_overlapping(
        &self,
        room_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Booking>>;

    /// Non-cancelled bookings whose start equals `start` exactly.
    async fn find_starting_at(&self, start: DateTime<Utc>) -> DomainResult<Vec<Booking>>;

    /// Bookings owned by a member, newest start first
    async fn list_for_member(
        &self,
        member_id: &str,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>>;

    /// All bookings, newest start first
    async fn list_all(&self, page: PaginationParams) -> DomainResult<PaginatedResult<Booking>>;

    /// Bookings in a room starting within `[from, to)`, ordered by start
    async fn list_for_room_between(
        &self,
        room_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>>;
}
