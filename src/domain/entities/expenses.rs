use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::schema::expenses;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = expenses)]
pub struct ExpenseEntity {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub concept: String,
    pub amount: f64,
    pub status: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
