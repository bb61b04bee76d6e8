use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::expenses::ExpenseEntity;

#[async_trait]
#[automock]
pub trait ExpenseRepository {
    async fn find_by_id(&self, expense_id: Uuid) -> Result<Option<ExpenseEntity>>;
}
