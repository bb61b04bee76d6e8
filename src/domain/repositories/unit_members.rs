use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

#[async_trait]
#[automock]
pub trait UnitMemberRepository {
    async fn is_confirmed_member(&self, user_id: Uuid, unit_id: Uuid) -> Result<bool>;
}
