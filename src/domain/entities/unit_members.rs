use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::schema::unit_members;

#[derive(Debug, Clone, Selectable, Queryable)]
#[diesel(table_name = unit_members)]
pub struct UnitMemberEntity {
    pub user_id: Uuid,
    pub unit_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
