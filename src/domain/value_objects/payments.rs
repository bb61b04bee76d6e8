use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::payments::PaymentEntity;

/// Result of a guarded ledger transition. `AlreadySettled` is a successful
/// no-op: some other reconciliation attempt won the race.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(PaymentEntity),
    AlreadySettled,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutDto {
    pub checkout_url: String,
    pub payment_id: Uuid,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusDto {
    pub token: String,
    pub gateway_order_id: i64,
    pub commerce_order: String,
    pub gateway_status: i32,
    pub status_text: String,
    pub amount: f64,
    pub payment: Option<LocalPaymentDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalPaymentDto {
    pub payment_id: Uuid,
    pub expense_id: Uuid,
    pub status: String,
    pub payment_date: Option<DateTime<Utc>>,
}

impl From<PaymentEntity> for LocalPaymentDto {
    fn from(payment: PaymentEntity) -> Self {
        Self {
            payment_id: payment.id,
            expense_id: payment.expense_id,
            status: payment.status,
            payment_date: payment.payment_date,
        }
    }
}
