//! SeaORM implementation of RoomDirectory

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::domain::{DomainError, DomainResult, MeetingRoom, RoomDirectory};
use crate::infrastructure::database::entities::meeting_room;

pub struct SeaOrmRoomDirectory {
    db: DatabaseConnection,
}

impl SeaOrmRoomDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert or replace a room's metadata.
    pub async fn upsert(&self, room: &MeetingRoom) -> DomainResult<()> {
        let capacity = i32::try_from(room.capacity)
            .map_err(|_| DomainError::Validation("capacity is too large".into()))?;
        let model = meeting_room::ActiveModel {
            id: Set(room.id.clone()),
            name: Set(room.name.clone()),
            capacity: Set(capacity),
        };
        meeting_room::Entity::insert(model)
            .on_conflict(
                OnConflict::column(meeting_room::Column::Id)
                    .update_columns([meeting_room::Column::Name, meeting_room::Column::Capacity])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}

fn model_to_domain(m: meeting_room::Model) -> MeetingRoom {
    MeetingRoom {
        id: m.id,
        name: m.name,
        capacity: u32::try_from(m.capacity).unwrap_or(0),
    }
}

#[async_trait]
impl RoomDirectory for SeaOrmRoomDirectory {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<MeetingRoom>> {
        let model = meeting_room::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }
}
