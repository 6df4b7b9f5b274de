//! Repository provider for the domain layer
//!
//! Bundles the per-aggregate storage traits so services can be built from
//! a single handle.

use super::booking::BookingRepository;
use super::member::MemberDirectory;
use super::room::RoomDirectory;

pub use crate::shared::errors::DomainResult;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let booking = repos.bookings().find_by_id("b-1").await?;
///     let room = repos.rooms().find_by_id(&booking.room_id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn bookings(&self) -> &dyn BookingRepository;
    fn rooms(&self) -> &dyn RoomDirectory;
    fn members(&self) -> &dyn MemberDirectory;
}
