//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_members;
mod m20260301_000002_create_meeting_rooms;
mod m20260301_000003_create_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_members::Migration),
            Box::new(m20260301_000002_create_meeting_rooms::Migration),
            Box::new(m20260301_000003_create_bookings::Migration),
        ]
    }
}
