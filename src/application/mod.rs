//! Application layer: booking use-cases, reminders and event fan-out.

pub mod booking;
pub mod events;
pub mod reminder;

pub use booking::{
    BookingChanges, BookingPolicy, BookingService, ConflictDetector, EntryAck, EntryVerifier,
    EntryWindow, NewBooking,
};
pub use events::{
    create_event_bus, EventBus, EventSubscriber, NotificationListener, NotificationTemplates,
    RecordingPublisher, SharedEventBus,
};
pub use reminder::{ReminderScanReport, ReminderSchedule, ReminderScheduler};
