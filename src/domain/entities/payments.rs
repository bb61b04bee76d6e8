use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expense_id: Uuid,
    pub amount: f64,
    pub method: String,
    pub status: String,
    /// Gateway-issued opaque token; unique, correlates webhook deliveries
    /// and status queries with this row.
    pub reference: String,
    /// The gateway's own order number, kept for audit/display only.
    pub gateway_order_id: Option<i64>,
    /// Locally-generated id for this payment attempt, distinct from both
    /// `reference` and `gateway_order_id`.
    pub commerce_order: String,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub user_id: Uuid,
    pub expense_id: Uuid,
    pub amount: f64,
    pub method: String,
    pub status: String,
    pub reference: String,
    pub gateway_order_id: Option<i64>,
    pub commerce_order: String,
}
