use async_trait::async_trait;

use super::model::MeetingRoom;
use crate::shared::DomainResult;

#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<MeetingRoom>>;
}
