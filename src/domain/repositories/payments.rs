use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity},
    value_objects::payments::TransitionOutcome,
};

/// The payment ledger. The two `transition_*` operations are the only writes
/// to a payment after creation and must be atomic check-and-set against the
/// backing store: they succeed only while the row is still `pending`.
#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentEntity>>;

    async fn create_pending(&self, new_payment: InsertPaymentEntity) -> Result<PaymentEntity>;

    /// Marks the payment paid and the associated expense paid in the same
    /// transaction, so no `payment = paid, expense = pending` state is ever
    /// observable. A payment that is no longer pending yields
    /// `TransitionOutcome::AlreadySettled` without touching the expense.
    async fn transition_to_paid(
        &self,
        payment_id: Uuid,
        expense_id: Uuid,
    ) -> Result<TransitionOutcome>;

    async fn transition_to_failed(&self, payment_id: Uuid) -> Result<TransitionOutcome>;
}
