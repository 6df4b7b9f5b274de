//! Create bookings table
//!
//! Indexed for the two hot queries: overlap checks per room and the
//! reminder scan by exact start time.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_members::Members;
use super::m20260301_000002_create_meeting_rooms::MeetingRooms;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Bookings::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::FinishTime).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Bookings::AttendeeCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::MemberId).string().not_null())
                    .col(ColumnDef::new(Bookings::RoomId).string().not_null())
                    .col(ColumnDef::new(Bookings::Tag).string_len(16))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_member")
                            .from(Bookings::Table, Bookings::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_room")
                            .from(Bookings::Table, Bookings::RoomId)
                            .to(MeetingRooms::Table, MeetingRooms::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_room_start")
                    .table(Bookings::Table)
                    .col(Bookings::RoomId)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_start")
                    .table(Bookings::Table)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_member")
                    .table(Bookings::Table)
                    .col(Bookings::MemberId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    Code,
    StartTime,
    FinishTime,
    AttendeeCount,
    CreatedAt,
    MemberId,
    RoomId,
    Tag,
}
