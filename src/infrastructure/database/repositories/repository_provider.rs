//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{BookingRepository, MemberDirectory, RepositoryProvider, RoomDirectory};

use super::booking_repository::SeaOrmBookingRepository;
use super::member_repository::SeaOrmMemberDirectory;
use super::room_repository::SeaOrmRoomDirectory;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let booking = repos.bookings().find_by_id("b-1").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    bookings: SeaOrmBookingRepository,
    rooms: SeaOrmRoomDirectory,
    members: SeaOrmMemberDirectory,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            bookings: SeaOrmBookingRepository::new(db.clone()),
            rooms: SeaOrmRoomDirectory::new(db.clone()),
            members: SeaOrmMemberDirectory::new(db),
        }
    }

    pub fn room_directory(&self) -> &SeaOrmRoomDirectory {
        &self.rooms
    }

    pub fn member_directory(&self) -> &SeaOrmMemberDirectory {
        &self.members
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn rooms(&self) -> &dyn RoomDirectory {
        &self.rooms
    }

    fn members(&self) -> &dyn MemberDirectory {
        &self.members
    }
}
