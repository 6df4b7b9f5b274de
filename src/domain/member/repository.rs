use async_trait::async_trait;

use super::model::Member;
use crate::shared::DomainResult;

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Member>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Member>>;
}
