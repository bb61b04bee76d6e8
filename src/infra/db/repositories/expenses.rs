use anyhow::Result;
use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{entities::expenses::ExpenseEntity, repositories::expenses::ExpenseRepository},
    infra::db::{postgres_connection::PgPoolSquad, schema::expenses},
};

pub struct ExpensePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ExpensePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ExpenseRepository for ExpensePostgres {
    async fn find_by_id(&self, expense_id: Uuid) -> Result<Option<ExpenseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let expense = expenses::table
            .filter(expenses::id.eq(expense_id))
            .select(ExpenseEntity::as_select())
            .first::<ExpenseEntity>(&mut conn)
            .optional()?;

        Ok(expense)
    }
}
