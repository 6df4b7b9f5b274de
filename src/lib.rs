//! # Meetbook
//!
//! Meeting room booking service: conflict-free reservations, lifecycle
//! changes, door check-in with booking codes and start reminders.
//!
//! ## Architecture
//!
//! - **shared**: errors, clock, pagination, shutdown
//! - **domain**: bookings, rooms, members, events and the storage/notification traits
//! - **application**: booking service, conflict detection, entry verification,
//!   reminder scheduler, event bus and notification listener
//! - **infrastructure**: SeaORM storage, in-memory storage, JWT, code generator, notifier
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::create_api_router;

pub use application::{create_event_bus, BookingService, EventBus, SharedEventBus};
