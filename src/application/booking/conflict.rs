//! Overlap detection for meeting-room bookings.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Booking, DomainError, DomainResult, RepositoryProvider};

/// Decides whether a candidate interval collides with an existing,
/// non-cancelled booking in the same room.
///
/// This is a point-in-time read. The race between this check and the
/// subsequent write is closed by the repository's guarded writes.
#[derive(Clone)]
pub struct ConflictDetector {
    repos: Arc<dyn RepositoryProvider>,
}

impl ConflictDetector {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn has_conflict(
        &self,
        room_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<bool> {
        Ok(self
            .first_conflict(room_id, start, end, exclude_id)
            .await?
            .is_some())
    }

    /// The earliest booking overlapping `[start, end)`, if any.
    pub async fn first_conflict(
        &self,
        room_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<Option<Booking>> {
        if start >= end {
            return Err(DomainError::InvalidTime(format!(
                "interval start {start} must be before end {end}"
            )));
        }

        let mut clashes = self
            .repos
            .bookings()
            .find_overlapping(room_id, start, end, exclude_id)
            .await?;
        // Repositories filter already; re-check so a loose backend cannot leak cancelled rows.
        clashes.retain(|b| b.overlaps(start, end));
        clashes.sort_by_key(|b| b.start_time);
        Ok(clashes.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, h, m, 0).unwrap()
    }

    async fn detector_with(bookings: Vec<Booking>) -> ConflictDetector {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        for b in &bookings {
            repos.bookings().insert(b).await.unwrap();
        }
        ConflictDetector::new(repos)
    }

    fn booking(room: &str, h: u32) -> Booking {
        Booking::new("C", "m1", room, at(h, 0), Duration::hours(1), 2, at(7, 0))
    }

    #[tokio::test]
    async fn touching_intervals_do_not_conflict() {
        let detector = detector_with(vec![booking("r1", 10)]).await;
        assert!(!detector.has_conflict("r1", at(11, 0), at(12, 0), None).await.unwrap());
        assert!(!detector.has_conflict("r1", at(9, 0), at(10, 0), None).await.unwrap());
        assert!(detector.has_conflict("r1", at(10, 59), at(12, 0), None).await.unwrap());
    }

    #[tokio::test]
    async fn other_rooms_are_ignored() {
        let detector = detector_with(vec![booking("r1", 10)]).await;
        assert!(!detector.has_conflict("r2", at(10, 0), at(11, 0), None).await.unwrap());
    }

    #[tokio::test]
    async fn cancelled_bookings_free_their_slot() {
        let mut cancelled = booking("r1", 10);
        cancelled.cancel();
        let detector = detector_with(vec![cancelled]).await;
        assert!(!detector.has_conflict("r1", at(10, 0), at(11, 0), None).await.unwrap());
    }

    #[tokio::test]
    async fn excluded_booking_does_not_conflict_with_itself() {
        let own = booking("r1", 10);
        let id = own.id.clone();
        let detector = detector_with(vec![own]).await;
        assert!(!detector
            .has_conflict("r1", at(10, 30), at(11, 30), Some(&id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn empty_interval_is_rejected() {
        let detector = detector_with(vec![]).await;
        let err = detector
            .has_conflict("r1", at(10, 0), at(10, 0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTime(_)));
    }

    #[tokio::test]
    async fn first_conflict_is_the_earliest() {
        let detector = detector_with(vec![booking("r1", 12), booking("r1", 10)]).await;
        let hit = detector
            .first_conflict("r1", at(9, 0), at(14, 0), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.start_time, at(10, 0));
    }
}
