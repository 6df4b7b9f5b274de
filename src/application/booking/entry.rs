//! Check-in verification against the booking's entry window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tracing::info;

use crate::config::EntrySettings;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Accepted check-in. Nothing is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAck {
    pub booking_id: String,
    pub entry_time: DateTime<Utc>,
}

/// Entry is allowed within `[start - lead, start + grace]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryWindow {
    pub lead: Duration,
    pub grace: Duration,
}

impl EntryWindow {
    pub fn from_settings(settings: &EntrySettings) -> Self {
        Self {
            lead: settings.lead_window(),
            grace: settings.grace_window(),
        }
    }
}

impl Default for EntryWindow {
    fn default() -> Self {
        Self::from_settings(&EntrySettings::default())
    }
}

#[derive(Clone)]
pub struct EntryVerifier {
    repos: Arc<dyn RepositoryProvider>,
    window: EntryWindow,
}

impl EntryVerifier {
    pub fn new(repos: Arc<dyn RepositoryProvider>, window: EntryWindow) -> Self {
        Self { repos, window }
    }

    pub async fn verify_entry(
        &self,
        booking_id: &str,
        submitted_code: &str,
        entry_time: DateTime<Utc>,
    ) -> DomainResult<EntryAck> {
        let outcome = self.check(booking_id, submitted_code, entry_time).await;
        let result = match &outcome {
            Ok(_) => "accepted",
            Err(e) => e.code(),
        };
        counter!("entry_verifications_total", "result" => result).increment(1);
        outcome
    }

    async fn check(
        &self,
        booking_id: &str,
        submitted_code: &str,
        entry_time: DateTime<Utc>,
    ) -> DomainResult<EntryAck> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::booking_not_found(booking_id))?;

        if booking.code != submitted_code {
            info!(booking_id, "Entry refused: wrong code");
            return Err(DomainError::CodeMismatch);
        }
        if booking.is_cancelled() {
            return Err(DomainError::Validation(format!(
                "booking {booking_id} is cancelled"
            )));
        }

        let opens_at = booking.start_time - self.window.lead;
        if entry_time < opens_at {
            return Err(DomainError::BookingTimeNotReached { opens_at });
        }
        let closed_at = booking.start_time + self.window.grace;
        if entry_time > closed_at {
            return Err(DomainError::BookingTimeHasPassed { closed_at });
        }

        info!(booking_id, %entry_time, "Entry accepted");
        Ok(EntryAck {
            booking_id: booking.id,
            entry_time,
        })
    }
}
