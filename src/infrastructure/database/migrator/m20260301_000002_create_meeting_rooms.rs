//! Create meeting_rooms table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeetingRooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeetingRooms::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeetingRooms::Name).string().not_null())
                    .col(
                        ColumnDef::new(MeetingRooms::Capacity)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeetingRooms::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MeetingRooms {
    Table,
    Id,
    Name,
    Capacity,
}
