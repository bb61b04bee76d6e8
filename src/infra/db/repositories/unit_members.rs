use anyhow::Result;
use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        repositories::unit_members::UnitMemberRepository,
        value_objects::enums::unit_member_statuses::UnitMemberStatus,
    },
    infra::db::{postgres_connection::PgPoolSquad, schema::unit_members},
};

pub struct UnitMemberPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UnitMemberPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UnitMemberRepository for UnitMemberPostgres {
    async fn is_confirmed_member(&self, user_id: Uuid, unit_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let membership = unit_members::table
            .filter(unit_members::user_id.eq(user_id))
            .filter(unit_members::unit_id.eq(unit_id))
            .filter(unit_members::status.eq(UnitMemberStatus::Confirmed.to_string()))
            .select(unit_members::user_id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(membership.is_some())
    }
}
