use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper, insert_into, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::{InsertPaymentEntity, PaymentEntity},
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::{expense_statuses::ExpenseStatus, payment_statuses::PaymentStatus},
            payments::TransitionOutcome,
        },
    },
    infra::db::{
        postgres_connection::PgPoolSquad,
        schema::{expenses, payments},
    },
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::reference.eq(reference))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn create_pending(&self, new_payment: InsertPaymentEntity) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = insert_into(payments::table)
            .values(&new_payment)
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)?;

        Ok(payment)
    }

    async fn transition_to_paid(
        &self,
        payment_id: Uuid,
        expense_id: Uuid,
    ) -> Result<TransitionOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The status filter makes this a single conditional update: whichever
        // reconciliation attempt lands first wins, every later one matches
        // zero rows. The expense flips to paid in the same transaction.
        let outcome = conn.transaction::<TransitionOutcome, anyhow::Error, _>(|conn| {
            let now = Utc::now();

            let updated = update(payments::table)
                .filter(payments::id.eq(payment_id))
                .filter(payments::status.eq(PaymentStatus::Pending.to_string()))
                .set((
                    payments::status.eq(PaymentStatus::Paid.to_string()),
                    payments::payment_date.eq(Some(now)),
                    payments::updated_at.eq(now),
                ))
                .returning(PaymentEntity::as_returning())
                .get_result::<PaymentEntity>(conn)
                .optional()?;

            match updated {
                Some(payment) => {
                    update(expenses::table)
                        .filter(expenses::id.eq(expense_id))
                        .set((
                            expenses::status.eq(ExpenseStatus::Paid.to_string()),
                            expenses::updated_at.eq(now),
                        ))
                        .execute(conn)?;

                    Ok(TransitionOutcome::Applied(payment))
                }
                None => Ok(TransitionOutcome::AlreadySettled),
            }
        })?;

        Ok(outcome)
    }

    async fn transition_to_failed(&self, payment_id: Uuid) -> Result<TransitionOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(payments::table)
            .filter(payments::id.eq(payment_id))
            .filter(payments::status.eq(PaymentStatus::Pending.to_string()))
            .set((
                payments::status.eq(PaymentStatus::Failed.to_string()),
                payments::updated_at.eq(Utc::now()),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(match updated {
            Some(payment) => TransitionOutcome::Applied(payment),
            None => TransitionOutcome::AlreadySettled,
        })
    }
}
