//! Booking aggregate
//!
//! Contains the Booking entity, its lifecycle tag, and repository interface.

pub mod model;
pub mod repository;

pub use model::{Booking, LifecycleTag};
pub use repository::BookingRepository;
