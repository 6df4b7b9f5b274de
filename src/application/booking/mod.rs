//! Booking use-cases: conflict detection, lifecycle, check-in.

pub mod conflict;
pub mod entry;
pub mod service;

pub use conflict::ConflictDetector;
pub use entry::{EntryAck, EntryVerifier, EntryWindow};
pub use service::{BookingChanges, BookingPolicy, BookingService, NewBooking};
