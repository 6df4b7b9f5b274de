//! Background task that reminds members shortly before their booking starts.
//!
//! Every tick looks for bookings starting exactly `lead` minutes after the
//! current minute and publishes one reminder per match. A booking missed
//! because a tick drifted past its minute is not retried, and a minute that
//! was already scanned is never scanned twice.

use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::ReminderSettings;
use crate::domain::{
    Booking, DomainError, DomainResult, Event, EventPublisher, ReminderEvent, RepositoryProvider,
};
use crate::shared::{truncate_to_minute, Clock, ShutdownSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSchedule {
    pub interval: std::time::Duration,
    pub lead: Duration,
    /// Ticks run while `active_start_hour <= hour(UTC) < active_end_hour`
    pub active_start_hour: u32,
    pub active_end_hour: u32,
}

impl ReminderSchedule {
    pub fn from_settings(settings: &ReminderSettings) -> Self {
        Self {
            interval: std::time::Duration::from_secs(settings.interval_secs),
            lead: settings.lead(),
            active_start_hour: settings.active_start_hour,
            active_end_hour: settings.active_end_hour,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        (self.active_start_hour..self.active_end_hour).contains(&now.hour())
    }
}

impl Default for ReminderSchedule {
    fn default() -> Self {
        Self::from_settings(&ReminderSettings::default())
    }
}

/// Outcome of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderScanReport {
    pub target: DateTime<Utc>,
    pub matched: usize,
    pub published: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    repos: Arc<dyn RepositoryProvider>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    schedule: ReminderSchedule,
}

impl ReminderScheduler {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        schedule: ReminderSchedule,
    ) -> Self {
        Self {
            repos,
            events,
            clock,
            schedule,
        }
    }

    /// Spawn the periodic loop. It exits when `shutdown` fires.
    pub fn start(self, shutdown: ShutdownSignal) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.schedule.interval.as_secs(),
                lead_minutes = self.schedule.lead.num_minutes(),
                "⏰ Reminder scheduler started"
            );

            let mut interval = tokio::time::interval(self.schedule.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_target = None;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match self.tick(last_target).await {
                            Ok(Some(report)) => last_target = Some(report.target),
                            Ok(None) => {}
                            Err(e) => warn!(error = %e, "Reminder scan failed"),
                        }
                    }
                    _ = shutdown.notified().wait() => {
                        info!("⏰ Reminder scheduler shutting down");
                        break;
                    }
                }
            }

            info!("⏰ Reminder scheduler stopped");
        })
    }

    /// One scheduled tick. Skipped outside active hours and when the target
    /// minute equals `last_target`.
    pub async fn tick(
        &self,
        last_target: Option<DateTime<Utc>>,
    ) -> DomainResult<Option<ReminderScanReport>> {
        let now = self.clock.now();
        if !self.schedule.is_active_at(now) {
            debug!(%now, "Outside reminder hours, skipping scan");
            return Ok(None);
        }
        if last_target == Some(self.target_for(now)) {
            debug!(%now, "Minute already scanned");
            return Ok(None);
        }
        self.scan(now).await.map(Some)
    }

    fn target_for(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        truncate_to_minute(now) + self.schedule.lead
    }

    pub async fn scan(&self, now: DateTime<Utc>) -> DomainResult<ReminderScanReport> {
        let target = self.target_for(now);
        let due = self.repos.bookings().find_starting_at(target).await?;

        let mut report = ReminderScanReport {
            target,
            matched: due.len(),
            published: 0,
            failed: 0,
        };
        if due.is_empty() {
            return Ok(report);
        }

        info!(count = due.len(), %target, "Sending booking reminders");

        for booking in &due {
            match self.remind(booking, now).await {
                Ok(()) => report.published += 1,
                Err(e) => {
                    warn!(booking_id = %booking.id, error = %e, "Failed to send reminder");
                    report.failed += 1;
                }
            }
        }

        counter!("reminders_published_total").increment(report.published as u64);
        counter!("reminder_failures_total").increment(report.failed as u64);
        Ok(report)
    }

    async fn remind(&self, booking: &Booking, now: DateTime<Utc>) -> DomainResult<()> {
        let member = self
            .repos
            .members()
            .find_by_id(&booking.member_id)
            .await?
            .ok_or_else(|| DomainError::member_not_found("id", &booking.member_id))?;

        self.events.publish(Event::BookingReminder(ReminderEvent {
            booking_id: booking.id.clone(),
            member_email: member.email,
            starts_at: booking.start_time,
            timestamp: now,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::RecordingPublisher;
    use crate::domain::{Member, MemberRole};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::FixedClock;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, h, m, 0).unwrap()
    }

    fn booking(member: &str, room: &str, start: DateTime<Utc>) -> Booking {
        Booking::new("C", member, room, start, Duration::minutes(30), 2, at(7, 0))
    }

    async fn setup(bookings: &[Booking]) -> (ReminderScheduler, Arc<RecordingPublisher>, Arc<FixedClock>) {
        let repos = Arc::new(InMemoryRepositoryProvider::new().with_member(Member {
            id: "m1".into(),
            email: "ann@example.com".into(),
            display_name: "Ann".into(),
            role: MemberRole::Member,
        }));
        for b in bookings {
            repos.bookings().insert(b).await.unwrap();
        }
        let events = Arc::new(RecordingPublisher::new());
        let clock = Arc::new(FixedClock::new(at(9, 50)));
        let scheduler = ReminderScheduler::new(
            repos,
            events.clone(),
            clock.clone(),
            ReminderSchedule::default(),
        );
        (scheduler, events, clock)
    }

    #[tokio::test]
    async fn matches_only_the_exact_minute() {
        let on_time = booking("m1", "r1", at(10, 0));
        let bookings = [
            booking("m1", "r2", at(9, 59)),
            on_time.clone(),
            booking("m1", "r3", at(10, 1)),
        ];
        let (scheduler, events, _) = setup(&bookings).await;

        let report = scheduler.scan(at(9, 50) + Duration::seconds(37)).await.unwrap();
        assert_eq!(report.target, at(10, 0));
        assert_eq!(report.matched, 1);
        assert_eq!(report.published, 1);

        let events = events.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::BookingReminder(r)
            if r.booking_id == on_time.id && r.member_email == "ann@example.com"));
    }

    #[tokio::test]
    async fn cancelled_bookings_are_not_reminded() {
        let mut cancelled = booking("m1", "r1", at(10, 0));
        cancelled.cancel();
        let (scheduler, events, _) = setup(&[cancelled]).await;

        let report = scheduler.scan(at(9, 50)).await.unwrap();
        assert_eq!(report.matched, 0);
        assert!(events.events().is_empty());
    }

    #[tokio::test]
    async fn missing_member_does_not_abort_the_batch() {
        let bookings = [
            booking("ghost", "r1", at(10, 0)),
            booking("m1", "r2", at(10, 0)),
        ];
        let (scheduler, events, _) = setup(&bookings).await;

        let report = scheduler.scan(at(9, 50)).await.unwrap();
        assert_eq!(report.matched, 2);
        assert_eq!(report.published, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(events.events().len(), 1);
    }

    #[tokio::test]
    async fn ticks_outside_active_hours_are_skipped() {
        let (scheduler, _, clock) = setup(&[booking("m1", "r1", at(20, 10))]).await;

        clock.set(at(20, 0));
        assert_eq!(scheduler.tick(None).await.unwrap(), None);

        clock.set(at(7, 59));
        assert_eq!(scheduler.tick(None).await.unwrap(), None);

        clock.set(at(8, 0));
        assert!(scheduler.tick(None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn tick_skips_an_already_scanned_minute() {
        let (scheduler, events, clock) = setup(&[booking("m1", "r1", at(10, 0))]).await;

        let first = scheduler.tick(None).await.unwrap().unwrap();
        assert_eq!(first.published, 1);
        assert_eq!(scheduler.tick(Some(first.target)).await.unwrap(), None);

        clock.set(at(9, 51));
        let next = scheduler.tick(Some(first.target)).await.unwrap().unwrap();
        assert_eq!(next.target, at(10, 1));
        assert_eq!(events.events().len(), 1);
    }

    /// Lets the spawned loop run until it parks on its next tick.
    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_loop_reminds_each_booking_once() {
        let bookings = [booking("m1", "r1", at(10, 0)), booking("m1", "r2", at(10, 1))];
        let (scheduler, events, clock) = setup(&bookings).await;
        let shutdown = ShutdownSignal::new();
        let handle = scheduler.start(shutdown.clone());

        settle().await;
        assert_eq!(events.events().len(), 1);

        // Three periods pass while the wall clock stays in the same minute.
        tokio::time::advance(std::time::Duration::from_secs(180)).await;
        settle().await;
        assert_eq!(events.events().len(), 1);

        clock.set(at(9, 51));
        tokio::time::advance(std::time::Duration::from_secs(60)).await;
        settle().await;
        let events = events.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], Event::BookingReminder(r) if r.booking_id == bookings[1].id));

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn loop_stops_on_shutdown() {
        let (scheduler, _, _) = setup(&[]).await;
        let shutdown = ShutdownSignal::new();
        let handle = scheduler.start(shutdown.clone());
        shutdown.trigger();
        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
