//! Application events (pub/sub)
//!
//! Event types are defined in `domain::events`. The broadcast bus, the
//! notification listener and the in-memory recorder live here.

pub mod event_bus;
pub mod listener;
pub mod recording;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use listener::{NotificationListener, NotificationTemplates};
pub use recording::RecordingPublisher;
