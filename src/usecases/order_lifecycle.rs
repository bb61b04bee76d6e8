use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::InsertPaymentEntity,
        repositories::{
            expenses::ExpenseRepository, payments::PaymentRepository,
            unit_members::UnitMemberRepository,
        },
        value_objects::{
            enums::{
                expense_statuses::ExpenseStatus, payment_methods::PaymentMethod,
                payment_statuses::PaymentStatus,
            },
            payments::CheckoutDto,
        },
    },
    gateway::flow_client::{CreateOrderRequest, FlowError},
    usecases::flow_gateway::FlowGateway,
};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("expense not found")]
    ExpenseNotFound,
    #[error("expense is already settled")]
    ExpenseAlreadySettled,
    #[error("unit membership is not confirmed")]
    UnitNotConfirmed,
    #[error("payer email is required for checkout")]
    MissingEmail,
    #[error(transparent)]
    Gateway(#[from] FlowError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OrderError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            OrderError::ExpenseNotFound => StatusCode::NOT_FOUND,
            OrderError::ExpenseAlreadySettled => StatusCode::CONFLICT,
            OrderError::UnitNotConfirmed => StatusCode::FORBIDDEN,
            OrderError::MissingEmail => StatusCode::BAD_REQUEST,
            OrderError::Gateway(_) => StatusCode::BAD_GATEWAY,
            OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type OrderResult<T> = std::result::Result<T, OrderError>;

/// Builds the commerce order id for one payment attempt. The millisecond
/// timestamp keeps retries on the same expense distinct.
pub fn build_commerce_order(expense_id: Uuid, at: DateTime<Utc>) -> String {
    format!("GC-{}-{}", expense_id.simple(), at.timestamp_millis())
}

pub struct OrderLifecycleUseCase<E, M, P, G>
where
    E: ExpenseRepository + Send + Sync + 'static,
    M: UnitMemberRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    expense_repo: Arc<E>,
    unit_member_repo: Arc<M>,
    payment_repo: Arc<P>,
    flow_client: Arc<G>,
}

impl<E, M, P, G> OrderLifecycleUseCase<E, M, P, G>
where
    E: ExpenseRepository + Send + Sync + 'static,
    M: UnitMemberRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    pub fn new(
        expense_repo: Arc<E>,
        unit_member_repo: Arc<M>,
        payment_repo: Arc<P>,
        flow_client: Arc<G>,
    ) -> Self {
        Self {
            expense_repo,
            unit_member_repo,
            payment_repo,
            flow_client,
        }
    }

    /// Creates a payment order for a pending expense on behalf of the payer.
    /// Exactly one pending payment row per successful call; no row is
    /// written on any failure path.
    pub async fn create_expense_payment(
        &self,
        expense_id: Uuid,
        payer_user_id: Uuid,
        payer_email: Option<String>,
    ) -> OrderResult<CheckoutDto> {
        info!(%expense_id, %payer_user_id, "payments: expense payment requested");

        let email = match payer_email {
            Some(value) => value,
            None => {
                warn!(%expense_id, %payer_user_id, "payments: payer has no email");
                return Err(OrderError::MissingEmail);
            }
        };

        let expense = self
            .expense_repo
            .find_by_id(expense_id)
            .await
            .map_err(|err| {
                error!(%expense_id, db_error = ?err, "payments: failed to load expense");
                OrderError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%expense_id, "payments: expense not found");
                OrderError::ExpenseNotFound
            })?;

        if ExpenseStatus::from_str(&expense.status) != ExpenseStatus::Pending {
            warn!(
                %expense_id,
                status = %expense.status,
                "payments: expense is not billable"
            );
            return Err(OrderError::ExpenseAlreadySettled);
        }

        let confirmed = self
            .unit_member_repo
            .is_confirmed_member(payer_user_id, expense.unit_id)
            .await
            .map_err(|err| {
                error!(
                    %payer_user_id,
                    unit_id = %expense.unit_id,
                    db_error = ?err,
                    "payments: failed to check unit membership"
                );
                OrderError::Internal(err)
            })?;
        if !confirmed {
            warn!(
                %payer_user_id,
                unit_id = %expense.unit_id,
                "payments: payer is not a confirmed member of the unit"
            );
            return Err(OrderError::UnitNotConfirmed);
        }

        let commerce_order = build_commerce_order(expense_id, Utc::now());

        let created = self
            .flow_client
            .create_order(CreateOrderRequest {
                commerce_order: commerce_order.clone(),
                subject: expense.concept.clone(),
                amount: expense.amount,
                email,
                optional: None,
            })
            .await
            .map_err(|err| {
                // No ledger row exists yet, so the failure leaves no partial state.
                error!(
                    %expense_id,
                    commerce_order = %commerce_order,
                    error = %err,
                    "payments: gateway order creation failed"
                );
                err
            })?;

        let payment = self
            .payment_repo
            .create_pending(InsertPaymentEntity {
                user_id: payer_user_id,
                expense_id,
                amount: expense.amount,
                method: PaymentMethod::Flow.to_string(),
                status: PaymentStatus::Pending.to_string(),
                reference: created.token.clone(),
                gateway_order_id: Some(created.flow_order),
                commerce_order,
            })
            .await
            .map_err(|err| {
                error!(
                    %expense_id,
                    token = %created.token,
                    db_error = ?err,
                    "payments: failed to record pending payment"
                );
                OrderError::Internal(err)
            })?;

        info!(
            payment_id = %payment.id,
            %expense_id,
            token = %payment.reference,
            "payments: pending payment recorded"
        );

        Ok(CheckoutDto {
            checkout_url: created.checkout_url(),
            payment_id: payment.id,
            token: created.token,
        })
    }
}
