//! Booking domain entity

use chrono::{DateTime, Duration, Utc};

use crate::shared::truncate_to_minute;

/// Most recent state-changing action applied to a booking.
///
/// Overwritten by every lifecycle operation, never accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleTag {
    Extended,
    Finished,
    Cancelled,
    Changed,
}

impl LifecycleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extended => "EXTENDED",
            Self::Finished => "FINISHED",
            Self::Cancelled => "CANCELLED",
            Self::Changed => "CHANGED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EXTENDED" => Some(Self::Extended),
            "FINISHED" => Some(Self::Finished),
            "CANCELLED" => Some(Self::Cancelled),
            "CHANGED" => Some(Self::Changed),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifecycleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reservation of one meeting room by one member for one interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    /// Opaque booking identifier (UUID)
    pub id: String,
    /// Short code presented at check-in
    pub code: String,
    /// Start of the reserved interval, whole minutes
    pub start_time: DateTime<Utc>,
    pub attendee_count: u32,
    /// Exclusive end of the interval; `None` once cancelled
    pub finish_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub member_id: String,
    pub room_id: String,
    pub tag: Option<LifecycleTag>,
}

impl Booking {
    pub fn new(
        code: impl Into<String>,
        member_id: impl Into<String>,
        room_id: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: Duration,
        attendee_count: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        let start_time = truncate_to_minute(start_time);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code: code.into(),
            start_time,
            attendee_count,
            finish_time: Some(start_time + duration),
            created_at,
            member_id: member_id.into(),
            room_id: room_id.into(),
            tag: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.tag == Some(LifecycleTag::Cancelled)
    }

    pub fn is_finished(&self) -> bool {
        self.tag == Some(LifecycleTag::Finished)
    }

    /// Interval occupied in the room, if the booking still holds one.
    pub fn interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if self.is_cancelled() {
            return None;
        }
        self.finish_time.map(|finish| (self.start_time, finish))
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        match self.interval() {
            Some((s, f)) => s < end && start < f,
            None => false,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.finish_time.map(|f| f - self.start_time)
    }

    /// Move the booking; the duration is kept.
    pub fn reschedule(&mut self, start_time: DateTime<Utc>, duration: Duration) {
        let start_time = truncate_to_minute(start_time);
        self.start_time = start_time;
        self.finish_time = Some(start_time + duration);
    }

    pub fn mark_changed(&mut self) {
        self.tag = Some(LifecycleTag::Changed);
    }

    pub fn extend_by(&mut self, increment: Duration) {
        if let Some(finish) = self.finish_time {
            self.finish_time = Some(finish + increment);
            self.tag = Some(LifecycleTag::Extended);
        }
    }

    /// Close the booking at `now`, never later than the planned finish.
    pub fn finish_at(&mut self, now: DateTime<Utc>) {
        self.finish_time = Some(match self.finish_time {
            Some(planned) if planned < now => planned,
            _ => now,
        });
        self.tag = Some(LifecycleTag::Finished);
    }

    pub fn cancel(&mut self) {
        self.tag = Some(LifecycleTag::Cancelled);
        self.finish_time = None;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, h, m, 0).unwrap()
    }

    fn sample_booking() -> Booking {
        Booking::new("B-CODE-001", "m1", "r1", at(10, 0), Duration::hours(1), 4, at(8, 0))
    }

    #[test]
    fn new_booking_has_no_tag_and_planned_finish() {
        let b = sample_booking();
        assert_eq!(b.tag, None);
        assert_eq!(b.finish_time, Some(at(11, 0)));
        assert_eq!(b.interval(), Some((at(10, 0), at(11, 0))));
    }

    #[test]
    fn start_time_is_truncated_to_minute() {
        let b = Booking::new(
            "C",
            "m1",
            "r1",
            at(10, 0) + Duration::seconds(42),
            Duration::minutes(30),
            1,
            at(8, 0),
        );
        assert_eq!(b.start_time, at(10, 0));
        assert_eq!(b.finish_time, Some(at(10, 30)));
    }

    #[test]
    fn overlap_is_half_open() {
        let b = sample_booking();
        assert!(b.overlaps(at(10, 30), at(11, 30)));
        assert!(b.overlaps(at(9, 0), at(10, 1)));
        assert!(!b.overlaps(at(11, 0), at(12, 0)));
        assert!(!b.overlaps(at(9, 0), at(10, 0)));
    }

    #[test]
    fn cancel_frees_interval() {
        let mut b = sample_booking();
        b.cancel();
        assert!(b.is_cancelled());
        assert_eq!(b.finish_time, None);
        assert!(!b.overlaps(at(10, 0), at(11, 0)));
    }

    #[test]
    fn extend_moves_finish_and_tags() {
        let mut b = sample_booking();
        b.extend_by(Duration::minutes(30));
        assert_eq!(b.finish_time, Some(at(11, 30)));
        assert_eq!(b.tag, Some(LifecycleTag::Extended));
    }

    #[test]
    fn finish_never_goes_past_planned_finish() {
        let mut early = sample_booking();
        early.finish_at(at(10, 20));
        assert_eq!(early.finish_time, Some(at(10, 20)));

        let mut late = sample_booking();
        late.finish_at(at(12, 0));
        assert_eq!(late.finish_time, Some(at(11, 0)));
        assert!(late.is_finished());
    }

    #[test]
    fn reschedule_keeps_duration() {
        let mut b = sample_booking();
        b.reschedule(at(14, 0), b.duration().unwrap());
        assert_eq!(b.interval(), Some((at(14, 0), at(15, 0))));
    }

    #[test]
    fn tag_parse_rejects_unknown() {
        for tag in [
            LifecycleTag::Extended,
            LifecycleTag::Finished,
            LifecycleTag::Cancelled,
            LifecycleTag::Changed,
        ] {
            assert_eq!(LifecycleTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(LifecycleTag::parse("DELETED"), None);
    }
}
