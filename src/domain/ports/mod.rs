//! Domain ports (hexagonal architecture boundaries)
//!
//! Trait contracts for the collaborators the booking core calls out to.
//! Storage-side lookups live next to their aggregates
//! (`BookingRepository`, `RoomDirectory`, `MemberDirectory`).

pub mod outbound;

pub use outbound::{
    Audience, CodeGenerator, DeliveryAck, EventPublisher, NotificationMessage, Notifier,
    NotifyError,
};
