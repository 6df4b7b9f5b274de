//! In-memory storage implementation
//!
//! Backs the service tests. Booking writes hold the store's write lock
//! across the overlap check and the write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::domain::{
    Booking, BookingRepository, DomainError, DomainResult, MeetingRoom, Member, MemberDirectory,
    RepositoryProvider, RoomDirectory,
};
use crate::shared::{PaginatedResult, PaginationParams};

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<String, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn overlapping<'a>(
    bookings: impl Iterator<Item = &'a Booking>,
    room_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> Vec<Booking> {
    bookings
        .filter(|b| b.room_id == room_id)
        .filter(|b| exclude_id != Some(b.id.as_str()))
        .filter(|b| b.overlaps(start, end))
        .cloned()
        .collect()
}

fn page_newest_first(
    mut items: Vec<Booking>,
    page: PaginationParams,
) -> PaginatedResult<Booking> {
    items.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(a.id.cmp(&b.id)));
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    PaginatedResult::new(items, total, page.page, page.limit)
}

fn ensure_free(
    existing: &HashMap<String, Booking>,
    booking: &Booking,
) -> DomainResult<()> {
    if let Some((start, end)) = booking.interval() {
        let clash = overlapping(
            existing.values(),
            &booking.room_id,
            start,
            end,
            Some(&booking.id),
        );
        if let Some(other) = clash.first() {
            return Err(DomainError::AlreadyBooked(format!(
                "room {} is taken by booking {}",
                booking.room_id, other.id
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(id).cloned())
    }

    async fn insert(&self, booking: &Booking) -> DomainResult<()> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(DomainError::Internal(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        ensure_free(&bookings, booking)?;
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> DomainResult<()> {
        let mut bookings = self.bookings.write().await;
        if !bookings.contains_key(&booking.id) {
            return Err(DomainError::booking_not_found(&booking.id));
        }
        ensure_free(&bookings, booking)?;
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn find_overlapping(
        &self,
        room_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(overlapping(bookings.values(), room_id, start, end, exclude_id))
    }

    async fn find_starting_at(&self, start: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|b| !b.is_cancelled() && b.start_time == start)
            .cloned()
            .collect())
    }

    async fn list_for_member(
        &self,
        member_id: &str,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>> {
        let bookings = self.bookings.read().await;
        let owned = bookings
            .values()
            .filter(|b| b.member_id == member_id)
            .cloned()
            .collect();
        Ok(page_newest_first(owned, page))
    }

    async fn list_all(&self, page: PaginationParams) -> DomainResult<PaginatedResult<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(page_newest_first(bookings.values().cloned().collect(), page))
    }

    async fn list_for_room_between(
        &self,
        room_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut found: Vec<Booking> = bookings
            .values()
            .filter(|b| b.room_id == room_id && b.start_time >= from && b.start_time < to)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.start_time);
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryRoomDirectory {
    rooms: DashMap<String, MeetingRoom>,
}

impl InMemoryRoomDirectory {
    pub fn insert(&self, room: MeetingRoom) {
        self.rooms.insert(room.id.clone(), room);
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<MeetingRoom>> {
        Ok(self.rooms.get(id).map(|r| r.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryMemberDirectory {
    members: DashMap<String, Member>,
}

impl InMemoryMemberDirectory {
    pub fn insert(&self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Member>> {
        Ok(self
            .members
            .iter()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .map(|m| m.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Member>> {
        Ok(self.members.get(id).map(|m| m.clone()))
    }
}

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    bookings: InMemoryBookingRepository,
    rooms: InMemoryRoomDirectory,
    members: InMemoryMemberDirectory,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(self, room: MeetingRoom) -> Self {
        self.rooms.insert(room);
        self
    }

    pub fn with_member(self, member: Member) -> Self {
        self.members.insert(member);
        self
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn rooms(&self) -> &dyn RoomDirectory {
        &self.rooms
    }

    fn members(&self) -> &dyn MemberDirectory {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, h, m, 0).unwrap()
    }

    fn booking(room: &str, h: u32) -> Booking {
        Booking::new("C", "m1", room, at(h, 0), Duration::hours(1), 2, at(7, 0))
    }

    #[tokio::test]
    async fn insert_rejects_overlap_in_same_room_only() {
        let repo = InMemoryBookingRepository::new();
        repo.insert(&booking("r1", 10)).await.unwrap();

        let clash = repo.insert(&booking("r1", 10)).await.unwrap_err();
        assert!(matches!(clash, DomainError::AlreadyBooked(_)));

        repo.insert(&booking("r2", 10)).await.unwrap();
        repo.insert(&booking("r1", 11)).await.unwrap();
    }

    #[tokio::test]
    async fn update_excludes_itself_and_ignores_cancelled() {
        let repo = InMemoryBookingRepository::new();
        let mut first = booking("r1", 10);
        repo.insert(&first).await.unwrap();

        first.extend_by(Duration::minutes(30));
        repo.update(&first).await.unwrap();

        first.cancel();
        repo.update(&first).await.unwrap();
        repo.insert(&booking("r1", 10)).await.unwrap();
    }

    #[tokio::test]
    async fn update_of_unknown_booking_is_not_found() {
        let repo = InMemoryBookingRepository::new();
        let err = repo.update(&booking("r1", 10)).await.unwrap_err();
        assert_eq!(err.code(), "booking_not_found");
    }

    #[tokio::test]
    async fn member_pages_are_newest_first() {
        let repo = InMemoryBookingRepository::new();
        for h in [9, 11, 13] {
            repo.insert(&booking("r1", h)).await.unwrap();
        }
        let page = repo
            .list_for_member("m1", PaginationParams::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].start_time, at(13, 0));
        assert_eq!(page.items[1].start_time, at(11, 0));
    }

    #[tokio::test]
    async fn member_lookup_by_email_ignores_case() {
        let dir = InMemoryMemberDirectory::default();
        dir.insert(Member {
            id: "m1".into(),
            email: "Ann@Example.com".into(),
            display_name: "Ann".into(),
            role: crate::domain::MemberRole::Member,
        });
        assert!(dir.find_by_email("ann@example.com").await.unwrap().is_some());
        assert!(dir.find_by_email("bob@example.com").await.unwrap().is_none());
    }
}
