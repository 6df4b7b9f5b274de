//! Booking lifecycle service: application-layer orchestration
//!
//! Every mutation is validated here, written through the repository's
//! guarded write, and only then announced on the event publisher.
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use metrics::counter;
use tracing::{debug, info, warn};

use super::conflict::ConflictDetector;
use crate::config::BookingSettings;
use crate::domain::{
    Booking, BookingLifecycleEvent, Caller, CodeGenerator, DomainError, DomainResult, Event,
    EventPublisher, MeetingRoom, RepositoryProvider,
};
use crate::shared::{truncate_to_minute, Clock, ErrorKind, PaginatedResult, PaginationParams};

/// Durations applied when a request leaves them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub default_duration: Duration,
    pub extension: Duration,
}

impl BookingPolicy {
    pub fn from_settings(settings: &BookingSettings) -> Self {
        Self {
            default_duration: settings.default_duration(),
            extension: settings.extension(),
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::from_settings(&BookingSettings::default())
    }
}

/// Request to reserve a room.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_id: String,
    pub start_time: DateTime<Utc>,
    pub attendee_count: u32,
    /// Falls back to the policy's default duration
    pub duration: Option<Duration>,
}

/// Partial change to an existing booking. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct BookingChanges {
    pub start_time: Option<DateTime<Utc>>,
    pub attendee_count: Option<u32>,
    pub room_id: Option<String>,
}

impl BookingChanges {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.attendee_count.is_none() && self.room_id.is_none()
    }
}

/// Create, update, extend, finish and cancel bookings, plus the read side.
#[derive(Clone)]
pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    conflicts: ConflictDetector,
    events: Arc<dyn EventPublisher>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl BookingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        events: Arc<dyn EventPublisher>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            conflicts: ConflictDetector::new(repos.clone()),
            repos,
            events,
            codes,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    // ── Commands (mutations) ────────────────────────────────────

    pub async fn create(&self, caller: &Caller, request: NewBooking) -> DomainResult<Booking> {
        let now = self.clock.now();
        let duration = request.duration.unwrap_or(self.policy.default_duration);

        if request.attendee_count == 0 {
            return Err(DomainError::Validation(
                "attendee_count must be at least 1".into(),
            ));
        }
        if duration <= Duration::zero() {
            return Err(DomainError::Validation("duration must be positive".into()));
        }
        let start = truncate_to_minute(request.start_time);
        if start < now {
            return Err(DomainError::InvalidTime(format!(
                "start time {start} is in the past"
            )));
        }

        let member = self
            .repos
            .members()
            .find_by_id(&caller.member_id)
            .await?
            .ok_or_else(|| DomainError::member_not_found("id", &caller.member_id))?;
        let room = self.room(&request.room_id).await?;
        ensure_capacity(&room, request.attendee_count)?;

        self.ensure_free(&room.id, start, start + duration, None)
            .await?;

        let booking = Booking::new(
            self.codes.generate(),
            member.id,
            room.id,
            start,
            duration,
            request.attendee_count,
            now,
        );
        self.repos
            .bookings()
            .insert(&booking)
            .await
            .map_err(count_conflict)?;

        counter!("bookings_created_total").increment(1);
        info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            member_id = %booking.member_id,
            start = %booking.start_time,
            "Booking created"
        );
        self.events.publish(Event::BookingCreated(BookingLifecycleEvent::new(
            &booking.id,
            member.email,
            now,
        )));
        Ok(booking)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        booking_id: &str,
        changes: BookingChanges,
    ) -> DomainResult<Booking> {
        let mut booking = self.owned_booking(caller, booking_id).await?;
        ensure_open(&booking, "update")?;

        let now = self.clock.now();
        let duration = booking.duration().unwrap_or(self.policy.default_duration);
        let start = truncate_to_minute(changes.start_time.unwrap_or(booking.start_time));
        let attendees = changes.attendee_count.unwrap_or(booking.attendee_count);
        let room_id = changes.room_id.unwrap_or_else(|| booking.room_id.clone());

        if attendees == 0 {
            return Err(DomainError::Validation(
                "attendee_count must be at least 1".into(),
            ));
        }
        if start < now {
            return Err(DomainError::InvalidTime(format!(
                "start time {start} is in the past"
            )));
        }

        let room = self.room(&room_id).await?;
        ensure_capacity(&room, attendees)?;

        self.ensure_free(&room.id, start, start + duration, Some(&booking.id))
            .await?;

        let email = self.owner_email(&booking).await?;
        booking.room_id = room.id;
        booking.attendee_count = attendees;
        booking.reschedule(start, duration);
        booking.mark_changed();
        self.commit(&booking).await?;

        self.announce("update", &booking, email, now, Event::BookingChanged);
        Ok(booking)
    }

    /// Push the planned finish out by one extension increment.
    pub async fn extend(&self, caller: &Caller, booking_id: &str) -> DomainResult<Booking> {
        let mut booking = self.owned_booking(caller, booking_id).await?;
        ensure_open(&booking, "extend")?;

        let Some(finish) = booking.finish_time else {
            return Err(DomainError::Validation(format!(
                "booking {booking_id} has no finish time"
            )));
        };
        let extended = finish + self.policy.extension;
        self.ensure_free(&booking.room_id, booking.start_time, extended, Some(&booking.id))
            .await?;

        let email = self.owner_email(&booking).await?;
        booking.extend_by(self.policy.extension);
        self.commit(&booking).await?;

        self.announce("extend", &booking, email, self.clock.now(), Event::BookingExtended);
        Ok(booking)
    }

    /// Close the booking early. Finishing twice has no further effect.
    pub async fn finish(&self, caller: &Caller, booking_id: &str) -> DomainResult<Booking> {
        let mut booking = self.owned_booking(caller, booking_id).await?;
        ensure_active(&booking, "finish")?;

        if booking.is_finished() {
            debug!(booking_id, "Booking already finished");
            return Ok(booking);
        }

        let now = self.clock.now();
        if now <= booking.start_time {
            return Err(DomainError::InvalidTime(format!(
                "booking {booking_id} has not started yet"
            )));
        }

        let email = self.owner_email(&booking).await?;
        booking.finish_at(now);
        self.commit(&booking).await?;

        self.announce("finish", &booking, email, now, Event::BookingFinished);
        Ok(booking)
    }

    pub async fn cancel(&self, caller: &Caller, booking_id: &str) -> DomainResult<Booking> {
        let mut booking = self.owned_booking(caller, booking_id).await?;

        if booking.is_cancelled() {
            debug!(booking_id, "Booking already cancelled");
            return Ok(booking);
        }

        let email = self.owner_email(&booking).await?;
        booking.cancel();
        self.commit(&booking).await?;

        self.announce("cancel", &booking, email, self.clock.now(), Event::BookingCancelled);
        Ok(booking)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, caller: &Caller, booking_id: &str) -> DomainResult<Booking> {
        self.owned_booking(caller, booking_id).await
    }

    /// The caller's own bookings, newest start first.
    pub async fn list_for_member(
        &self,
        caller: &Caller,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>> {
        self.repos
            .bookings()
            .list_for_member(&caller.member_id, page)
            .await
    }

    /// Every booking in the system. Admins only.
    pub async fn list_all(
        &self,
        caller: &Caller,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<Booking>> {
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "listing all bookings requires the admin role".into(),
            ));
        }
        self.repos.bookings().list_all(page).await
    }

    /// Bookings in a room starting on the given UTC calendar day.
    pub async fn list_for_room_on(
        &self,
        room_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        let room = self.room(room_id).await?;
        let from = date.and_time(NaiveTime::MIN).and_utc();
        let to = from + Duration::days(1);
        self.repos
            .bookings()
            .list_for_room_between(&room.id, from, to)
            .await
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn room(&self, room_id: &str) -> DomainResult<MeetingRoom> {
        self.repos
            .rooms()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::room_not_found(room_id))
    }

    async fn owned_booking(&self, caller: &Caller, booking_id: &str) -> DomainResult<Booking> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::booking_not_found(booking_id))?;

        if !caller.may_access(&booking.member_id) {
            warn!(
                booking_id,
                member_id = %caller.member_id,
                "Access to foreign booking denied"
            );
            return Err(DomainError::Forbidden(format!(
                "booking {booking_id} belongs to another member"
            )));
        }
        Ok(booking)
    }

    async fn owner_email(&self, booking: &Booking) -> DomainResult<String> {
        self.repos
            .members()
            .find_by_id(&booking.member_id)
            .await?
            .map(|m| m.email)
            .ok_or_else(|| DomainError::member_not_found("id", &booking.member_id))
    }

    async fn ensure_free(
        &self,
        room_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<()> {
        if let Some(other) = self
            .conflicts
            .first_conflict(room_id, start, end, exclude_id)
            .await?
        {
            counter!("booking_conflicts_total").increment(1);
            return Err(DomainError::AlreadyBooked(format!(
                "room {room_id} is taken by booking {} from {}",
                other.id, other.start_time
            )));
        }
        Ok(())
    }

    async fn commit(&self, booking: &Booking) -> DomainResult<()> {
        self.repos
            .bookings()
            .update(booking)
            .await
            .map_err(count_conflict)
    }

    fn announce(
        &self,
        op: &'static str,
        booking: &Booking,
        email: String,
        at: DateTime<Utc>,
        wrap: fn(BookingLifecycleEvent) -> Event,
    ) {
        counter!("booking_lifecycle_total", "op" => op).increment(1);
        info!(booking_id = %booking.id, tag = ?booking.tag, op, "Booking updated");
        self.events
            .publish(wrap(BookingLifecycleEvent::new(&booking.id, email, at)));
    }
}

fn ensure_capacity(room: &MeetingRoom, attendees: u32) -> DomainResult<()> {
    if room.fits(attendees) {
        Ok(())
    } else {
        Err(DomainError::CapacityExceeded {
            requested: attendees,
            capacity: room.capacity,
        })
    }
}

fn ensure_active(booking: &Booking, op: &str) -> DomainResult<()> {
    if booking.is_cancelled() {
        return Err(DomainError::Validation(format!(
            "cannot {op} cancelled booking {}",
            booking.id
        )));
    }
    Ok(())
}

/// Cancelled and finished bookings are closed to reschedules and extensions.
fn ensure_open(booking: &Booking, op: &str) -> DomainResult<()> {
    ensure_active(booking, op)?;
    if booking.is_finished() {
        return Err(DomainError::Validation(format!(
            "cannot {op} finished booking {}",
            booking.id
        )));
    }
    Ok(())
}

/// A guarded write lost to a concurrent commit.
fn count_conflict(err: DomainError) -> DomainError {
    if err.kind() == ErrorKind::Conflict {
        counter!("booking_conflicts_total").increment(1);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::RecordingPublisher;
    use crate::domain::{LifecycleTag, Member, MemberRole};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::FixedClock;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SequentialCodes(AtomicUsize);

    impl CodeGenerator for SequentialCodes {
        fn generate(&self) -> String {
            format!("B-{:08}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, h, m, 0).unwrap()
    }

    fn member(id: &str, email: &str, role: MemberRole) -> Member {
        Member {
            id: id.into(),
            email: email.into(),
            display_name: id.into(),
            role,
        }
    }

    struct Harness {
        service: BookingService,
        events: Arc<RecordingPublisher>,
        clock: Arc<FixedClock>,
    }

    fn harness() -> Harness {
        let repos = Arc::new(
            InMemoryRepositoryProvider::new()
                .with_room(MeetingRoom::new("r1", "Fjord", 4))
                .with_room(MeetingRoom::new("r2", "Summit", 10))
                .with_member(member("m1", "ann@example.com", MemberRole::Member))
                .with_member(member("m2", "bob@example.com", MemberRole::Member))
                .with_member(member("a1", "root@example.com", MemberRole::Admin)),
        );
        let events = Arc::new(RecordingPublisher::new());
        let clock = Arc::new(FixedClock::new(at(9, 0)));
        let service = BookingService::new(
            repos,
            events.clone(),
            Arc::new(SequentialCodes(AtomicUsize::new(1))),
            clock.clone(),
            BookingPolicy::default(),
        );
        Harness {
            service,
            events,
            clock,
        }
    }

    fn request(room: &str, start: DateTime<Utc>, attendees: u32) -> NewBooking {
        NewBooking {
            room_id: room.into(),
            start_time: start,
            attendee_count: attendees,
            duration: None,
        }
    }

    fn ann() -> Caller {
        Caller::member("m1")
    }

    #[tokio::test]
    async fn create_applies_defaults_and_publishes() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0) + Duration::seconds(42), 3))
            .await
            .unwrap();

        assert_eq!(booking.start_time, at(10, 0));
        assert_eq!(booking.finish_time, Some(at(11, 0)));
        assert_eq!(booking.created_at, at(9, 0));
        assert_eq!(booking.code, "B-00000001");
        assert_eq!(booking.tag, None);

        let events = h.events.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::BookingCreated(e)
            if e.booking_id == booking.id && e.member_email == "ann@example.com"));
    }

    #[tokio::test]
    async fn create_rejects_bad_requests() {
        let h = harness();

        let past = h.service.create(&ann(), request("r1", at(8, 0), 2)).await;
        assert_eq!(past.unwrap_err().kind(), ErrorKind::Validation);

        let crowded = h.service.create(&ann(), request("r1", at(10, 0), 5)).await;
        let err = crowded.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), "capacity_exceeded");

        let nobody = h.service.create(&ann(), request("r1", at(10, 0), 0)).await;
        assert_eq!(nobody.unwrap_err().code(), "invalid_request");

        let ghost = h.service.create(&ann(), request("nope", at(10, 0), 2)).await;
        assert_eq!(ghost.unwrap_err().code(), "room_not_found");

        let zero = NewBooking {
            duration: Some(Duration::zero()),
            ..request("r1", at(10, 0), 2)
        };
        assert_eq!(
            h.service.create(&ann(), zero).await.unwrap_err().code(),
            "invalid_request"
        );

        assert!(h.events.events().is_empty());
    }

    #[tokio::test]
    async fn overlapping_create_is_a_conflict() {
        let h = harness();
        h.service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();

        let err = h
            .service
            .create(&Caller::member("m2"), request("r1", at(10, 30), 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        h.service
            .create(&Caller::member("m2"), request("r1", at(11, 0), 2))
            .await
            .unwrap();
        h.service
            .create(&Caller::member("m2"), request("r2", at(10, 30), 2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_one() {
        let h = harness();
        let service = Arc::new(h.service);

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let who = if i % 2 == 0 { "m1" } else { "m2" };
                service
                    .create(&Caller::member(who), request("r1", at(10, i), 2))
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(h.events.events().len(), 1);
    }

    #[tokio::test]
    async fn random_creates_never_overlap() {
        let h = harness();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let offset = rng.gen_range(0..(10 * 60));
            let length = rng.gen_range(15..=120);
            let room = if rng.gen_bool(0.5) { "r1" } else { "r2" };
            let req = NewBooking {
                duration: Some(Duration::minutes(length)),
                ..request(room, at(10, 0) + Duration::minutes(offset), 2)
            };
            match h.service.create(&ann(), req).await {
                Ok(_) => {}
                Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
            }
        }

        let all = h
            .service
            .list_all(&Caller::admin("a1"), PaginationParams::new(Some(1), Some(100)))
            .await
            .unwrap()
            .items;
        assert!(all.len() > 1);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                if a.room_id != b.room_id {
                    continue;
                }
                let (s, f) = b.interval().unwrap();
                assert!(!a.overlaps(s, f), "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[tokio::test]
    async fn update_moves_and_keeps_duration() {
        let h = harness();
        let booking = h
            .service
            .create(
                &ann(),
                NewBooking {
                    duration: Some(Duration::minutes(90)),
                    ..request("r1", at(10, 0), 2)
                },
            )
            .await
            .unwrap();

        let moved = h
            .service
            .update(
                &ann(),
                &booking.id,
                BookingChanges {
                    start_time: Some(at(10, 30)),
                    room_id: Some("r2".into()),
                    attendee_count: Some(8),
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.start_time, at(10, 30));
        assert_eq!(moved.finish_time, Some(at(12, 0)));
        assert_eq!(moved.room_id, "r2");
        assert_eq!(moved.attendee_count, 8);
        assert_eq!(moved.tag, Some(LifecycleTag::Changed));
        assert_eq!(moved.created_at, booking.created_at);
        assert_eq!(h.events.event_types(), vec!["booking_created", "booking_changed"]);
    }

    #[tokio::test]
    async fn update_checks_owner_capacity_and_neighbours() {
        let h = harness();
        let mine = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();
        h.service
            .create(&Caller::member("m2"), request("r1", at(12, 0), 2))
            .await
            .unwrap();

        let foreign = h
            .service
            .update(&Caller::member("m2"), &mine.id, BookingChanges::default())
            .await;
        assert_eq!(foreign.unwrap_err().kind(), ErrorKind::Forbidden);

        let crowded = BookingChanges {
            attendee_count: Some(9),
            ..Default::default()
        };
        assert_eq!(
            h.service.update(&ann(), &mine.id, crowded).await.unwrap_err().code(),
            "capacity_exceeded"
        );

        let clash = BookingChanges {
            start_time: Some(at(11, 30)),
            ..Default::default()
        };
        assert_eq!(
            h.service.update(&ann(), &mine.id, clash).await.unwrap_err().kind(),
            ErrorKind::Conflict
        );

        let missing = h
            .service
            .update(&ann(), "no-such-booking", BookingChanges::default())
            .await;
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);

        // Admins may edit anyone's booking.
        let fine = BookingChanges {
            attendee_count: Some(4),
            ..Default::default()
        };
        h.service
            .update(&Caller::admin("a1"), &mine.id, fine)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn extend_adds_exactly_one_increment() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();

        let extended = h.service.extend(&ann(), &booking.id).await.unwrap();
        assert_eq!(
            extended.finish_time,
            Some(booking.finish_time.unwrap() + h.service.policy().extension)
        );
        assert_eq!(extended.tag, Some(LifecycleTag::Extended));
        assert_eq!(h.events.event_types().last(), Some(&"booking_extended"));
    }

    #[tokio::test]
    async fn extend_into_neighbour_is_a_conflict() {
        let h = harness();
        let first = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();
        h.service
            .create(&Caller::member("m2"), request("r1", at(11, 15), 2))
            .await
            .unwrap();

        let err = h.service.extend(&ann(), &first.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let unchanged = h.service.get(&ann(), &first.id).await.unwrap();
        assert_eq!(unchanged.finish_time, Some(at(11, 0)));
        assert_eq!(unchanged.tag, None);
    }

    #[tokio::test]
    async fn cancel_frees_the_slot() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();

        let cancelled = h.service.cancel(&ann(), &booking.id).await.unwrap();
        assert_eq!(cancelled.tag, Some(LifecycleTag::Cancelled));
        assert_eq!(cancelled.finish_time, None);

        h.service
            .create(&Caller::member("m2"), request("r1", at(10, 0), 2))
            .await
            .unwrap();

        // Second cancel is a quiet no-op.
        h.service.cancel(&ann(), &booking.id).await.unwrap();
        assert_eq!(
            h.events.event_types(),
            vec!["booking_created", "booking_cancelled", "booking_created"]
        );
    }

    #[tokio::test]
    async fn cancelled_bookings_reject_further_changes() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();
        h.service.cancel(&ann(), &booking.id).await.unwrap();

        for err in [
            h.service.extend(&ann(), &booking.id).await.unwrap_err(),
            h.service.finish(&ann(), &booking.id).await.unwrap_err(),
            h.service
                .update(&ann(), &booking.id, BookingChanges::default())
                .await
                .unwrap_err(),
        ] {
            assert_eq!(err.code(), "invalid_request");
        }
    }

    #[tokio::test]
    async fn cancel_by_stranger_is_forbidden() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();
        let err = h
            .service
            .cancel(&Caller::member("m2"), &booking.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn finish_twice_equals_finish_once() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();

        let early = h.service.finish(&ann(), &booking.id).await.unwrap_err();
        assert_eq!(early.code(), "invalid_time");

        h.clock.set(at(10, 20));
        let once = h.service.finish(&ann(), &booking.id).await.unwrap();
        assert_eq!(once.finish_time, Some(at(10, 20)));
        assert_eq!(once.tag, Some(LifecycleTag::Finished));

        h.clock.set(at(10, 40));
        let twice = h.service.finish(&ann(), &booking.id).await.unwrap();
        assert_eq!(twice, once);
        assert_eq!(
            h.events.event_types(),
            vec!["booking_created", "booking_finished"]
        );
    }

    #[tokio::test]
    async fn start_within_the_current_minute_is_in_the_past() {
        let h = harness();
        h.clock.set(at(9, 0) + Duration::seconds(10));

        let err = h
            .service
            .create(&ann(), request("r1", at(9, 0) + Duration::seconds(40), 2))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_time");

        let booking = h
            .service
            .create(&ann(), request("r1", at(9, 1) + Duration::seconds(5), 2))
            .await
            .unwrap();
        assert_eq!(booking.start_time, at(9, 1));

        let moved = BookingChanges {
            start_time: Some(at(9, 0) + Duration::seconds(50)),
            ..Default::default()
        };
        assert_eq!(
            h.service.update(&ann(), &booking.id, moved).await.unwrap_err().code(),
            "invalid_time"
        );
    }

    #[tokio::test]
    async fn finished_bookings_cannot_be_extended() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();
        h.clock.set(at(10, 30));
        let done = h.service.finish(&ann(), &booking.id).await.unwrap();

        let err = h.service.extend(&ann(), &booking.id).await.unwrap_err();
        assert_eq!(err.code(), "invalid_request");

        let stored = h.service.get(&ann(), &booking.id).await.unwrap();
        assert_eq!(stored, done);
        assert_eq!(stored.tag, Some(LifecycleTag::Finished));
        assert_eq!(
            h.events.event_types(),
            vec!["booking_created", "booking_finished"]
        );
    }

    #[tokio::test]
    async fn finish_after_planned_end_keeps_planned_end() {
        let h = harness();
        let booking = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();
        h.clock.set(at(13, 0));
        let done = h.service.finish(&ann(), &booking.id).await.unwrap();
        assert_eq!(done.finish_time, Some(at(11, 0)));
    }

    #[tokio::test]
    async fn reads_respect_ownership_and_role() {
        let h = harness();
        let mine = h
            .service
            .create(&ann(), request("r1", at(10, 0), 2))
            .await
            .unwrap();
        h.service
            .create(&Caller::member("m2"), request("r2", at(10, 0), 2))
            .await
            .unwrap();

        assert_eq!(
            h.service
                .get(&Caller::member("m2"), &mine.id)
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::Forbidden
        );
        h.service.get(&Caller::admin("a1"), &mine.id).await.unwrap();

        let own = h
            .service
            .list_for_member(&ann(), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(own.total, 1);
        assert_eq!(own.items[0].id, mine.id);

        let denied = h
            .service
            .list_all(&ann(), PaginationParams::default())
            .await
            .unwrap_err();
        assert_eq!(denied.kind(), ErrorKind::Forbidden);

        let all = h
            .service
            .list_all(&Caller::admin("a1"), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn room_day_listing_is_ordered_and_bounded() {
        let h = harness();
        for hour in [15, 10, 12] {
            h.service
                .create(&ann(), request("r1", at(hour, 0), 2))
                .await
                .unwrap();
        }
        let tomorrow = Utc.with_ymd_and_hms(2026, 5, 5, 10, 0, 0).unwrap();
        h.service
            .create(&ann(), request("r1", tomorrow, 2))
            .await
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        let listed = h.service.list_for_room_on("r1", day).await.unwrap();
        let starts: Vec<_> = listed.iter().map(|b| b.start_time).collect();
        assert_eq!(starts, vec![at(10, 0), at(12, 0), at(15, 0)]);

        let err = h.service.list_for_room_on("ghost", day).await.unwrap_err();
        assert_eq!(err.code(), "room_not_found");
    }
}
