//! Domain layer: entities, events and the traits the core depends on.

pub mod booking;
pub mod events;
pub mod member;
pub mod ports;
pub mod repositories;
pub mod room;

// Re-export commonly used types
pub use booking::{Booking, BookingRepository, LifecycleTag};
pub use events::{BookingLifecycleEvent, Event, EventMessage, ReminderEvent};
pub use member::{Caller, Member, MemberDirectory, MemberRole};
pub use ports::{
    Audience, CodeGenerator, DeliveryAck, EventPublisher, NotificationMessage, Notifier,
    NotifyError,
};
pub use repositories::{DomainResult, RepositoryProvider};
pub use room::{MeetingRoom, RoomDirectory};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
