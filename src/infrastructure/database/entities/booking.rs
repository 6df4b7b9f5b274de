//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub code: String,

    pub start_time: DateTimeUtc,

    /// NULL once cancelled
    #[sea_orm(nullable)]
    pub finish_time: Option<DateTimeUtc>,

    pub attendee_count: i32,
    pub created_at: DateTimeUtc,
    pub member_id: String,
    pub room_id: String,

    /// EXTENDED, FINISHED, CANCELLED or CHANGED
    #[sea_orm(nullable)]
    pub tag: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
    #[sea_orm(
        belongs_to = "super::meeting_room::Entity",
        from = "Column::RoomId",
        to = "super::meeting_room::Column::Id"
    )]
    MeetingRoom,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::meeting_room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeetingRoom.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
