use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::PaymentEntity,
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::{
                gateway_order_statuses::GatewayOrderStatus, payment_statuses::PaymentStatus,
            },
            payments::{LocalPaymentDto, PaymentStatusDto, TransitionOutcome},
        },
    },
    gateway::flow_client::FlowError,
    usecases::flow_gateway::FlowGateway,
};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("payment not found")]
    PaymentNotFound,
    #[error("payment belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Gateway(#[from] FlowError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReconcileError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReconcileError::PaymentNotFound => StatusCode::NOT_FOUND,
            ReconcileError::Forbidden => StatusCode::FORBIDDEN,
            ReconcileError::Gateway(_) => StatusCode::BAD_GATEWAY,
            ReconcileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

/// What a reconciliation attempt did. `AlreadySettled` covers both "was
/// terminal before we looked" and "lost the transition race": either way the
/// ledger holds exactly one applied transition and the caller gets success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Paid,
    Failed,
    StillPending,
    AlreadySettled,
    UnknownToken,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Paid => "paid",
            ReconcileOutcome::Failed => "failed",
            ReconcileOutcome::StillPending => "pending",
            ReconcileOutcome::AlreadySettled => "already_settled",
            ReconcileOutcome::UnknownToken => "unknown_token",
        }
    }
}

/// Body returned to the gateway's confirmation callback. Always delivered
/// with HTTP 200: a non-2xx would trigger an uncontrolled retry storm.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

pub struct ReconciliationUseCase<P, G>
where
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    payment_repo: Arc<P>,
    flow_client: Arc<G>,
}

impl<P, G> ReconciliationUseCase<P, G>
where
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<P>, flow_client: Arc<G>) -> Self {
        Self {
            payment_repo,
            flow_client,
        }
    }

    /// Webhook entry point. The body is only trusted as a "re-check this
    /// token" poke; the authoritative status always comes from our own
    /// signed status query. All failures are logged and folded into the
    /// ack so the gateway never sees an error response.
    pub async fn process_webhook(&self, token: &str) -> WebhookAck {
        match self.reconcile_by_token(token).await {
            Ok(outcome) => {
                info!(token, outcome = outcome.as_str(), "payments: webhook reconciled");
                WebhookAck { success: true }
            }
            Err(err) => {
                error!(token, error = %err, "payments: webhook reconciliation failed");
                WebhookAck { success: false }
            }
        }
    }

    /// Manual confirmation by the payer. Same transition logic as the
    /// webhook path, so the two can race without double-applying; gateway
    /// failures propagate to the caller here.
    pub async fn confirm_manually(
        &self,
        token: &str,
        requesting_user_id: Uuid,
    ) -> ReconcileResult<ReconcileOutcome> {
        let payment = self
            .payment_repo
            .find_by_reference(token)
            .await
            .map_err(ReconcileError::Internal)?
            .ok_or_else(|| {
                warn!(token, %requesting_user_id, "payments: manual confirm for unknown token");
                ReconcileError::PaymentNotFound
            })?;

        if payment.user_id != requesting_user_id {
            warn!(
                token,
                %requesting_user_id,
                owner_id = %payment.user_id,
                "payments: manual confirm by non-owner"
            );
            return Err(ReconcileError::Forbidden);
        }

        self.reconcile_payment(payment, token).await
    }

    /// Read-only merged view of gateway and local state. Never mutates the
    /// ledger, safe to poll.
    pub async fn get_status(&self, token: &str) -> ReconcileResult<PaymentStatusDto> {
        let gateway_status = self.flow_client.get_order_status(token).await?;
        let payment = self
            .payment_repo
            .find_by_reference(token)
            .await
            .map_err(ReconcileError::Internal)?;

        let status = GatewayOrderStatus::from_code(gateway_status.status);

        Ok(PaymentStatusDto {
            token: token.to_string(),
            gateway_order_id: gateway_status.flow_order,
            commerce_order: gateway_status.commerce_order,
            gateway_status: gateway_status.status,
            status_text: status.status_text().to_string(),
            amount: gateway_status.amount,
            payment: payment.map(LocalPaymentDto::from),
        })
    }

    async fn reconcile_by_token(&self, token: &str) -> ReconcileResult<ReconcileOutcome> {
        let payment = match self
            .payment_repo
            .find_by_reference(token)
            .await
            .map_err(ReconcileError::Internal)?
        {
            Some(payment) => payment,
            None => {
                warn!(token, "payments: reconciliation for unknown token");
                return Ok(ReconcileOutcome::UnknownToken);
            }
        };

        self.reconcile_payment(payment, token).await
    }

    async fn reconcile_payment(
        &self,
        payment: PaymentEntity,
        token: &str,
    ) -> ReconcileResult<ReconcileOutcome> {
        if PaymentStatus::from_str(&payment.status) != PaymentStatus::Pending {
            info!(
                payment_id = %payment.id,
                status = %payment.status,
                "payments: reconciliation no-op, payment already terminal"
            );
            return Ok(ReconcileOutcome::AlreadySettled);
        }

        let gateway_status = self.flow_client.get_order_status(token).await?;

        match GatewayOrderStatus::from_code(gateway_status.status) {
            GatewayOrderStatus::Paid => {
                let outcome = self
                    .payment_repo
                    .transition_to_paid(payment.id, payment.expense_id)
                    .await
                    .map_err(ReconcileError::Internal)?;

                match outcome {
                    TransitionOutcome::Applied(paid) => {
                        info!(
                            payment_id = %paid.id,
                            expense_id = %paid.expense_id,
                            "payments: payment and expense marked paid"
                        );
                        Ok(ReconcileOutcome::Paid)
                    }
                    TransitionOutcome::AlreadySettled => {
                        info!(
                            payment_id = %payment.id,
                            "payments: paid transition lost the race, no-op"
                        );
                        Ok(ReconcileOutcome::AlreadySettled)
                    }
                }
            }
            GatewayOrderStatus::Rejected | GatewayOrderStatus::Voided => {
                let outcome = self
                    .payment_repo
                    .transition_to_failed(payment.id)
                    .await
                    .map_err(ReconcileError::Internal)?;

                match outcome {
                    TransitionOutcome::Applied(failed) => {
                        info!(
                            payment_id = %failed.id,
                            gateway_status = gateway_status.status,
                            "payments: payment marked failed"
                        );
                        Ok(ReconcileOutcome::Failed)
                    }
                    TransitionOutcome::AlreadySettled => {
                        info!(
                            payment_id = %payment.id,
                            "payments: failed transition lost the race, no-op"
                        );
                        Ok(ReconcileOutcome::AlreadySettled)
                    }
                }
            }
            GatewayOrderStatus::Pending | GatewayOrderStatus::Unknown => {
                info!(
                    payment_id = %payment.id,
                    gateway_status = gateway_status.status,
                    "payments: order still pending at the gateway"
                );
                Ok(ReconcileOutcome::StillPending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::expenses::ExpenseEntity;
    use crate::domain::entities::payments::InsertPaymentEntity;
    use crate::domain::repositories::expenses::MockExpenseRepository;
    use crate::domain::repositories::payments::MockPaymentRepository;
    use crate::domain::repositories::unit_members::MockUnitMemberRepository;
    use crate::domain::value_objects::enums::expense_statuses::ExpenseStatus;
    use crate::gateway::flow_client::{FlowOrderCreated, FlowOrderStatus};
    use crate::usecases::flow_gateway::MockFlowGateway;
    use crate::usecases::order_lifecycle::OrderLifecycleUseCase;
    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pending_payment(token: &str, user_id: Uuid) -> PaymentEntity {
        let now = Utc::now();
        PaymentEntity {
            id: Uuid::new_v4(),
            user_id,
            expense_id: Uuid::new_v4(),
            amount: 15000.0,
            method: "flow".to_string(),
            status: PaymentStatus::Pending.to_string(),
            reference: token.to_string(),
            gateway_order_id: Some(777),
            commerce_order: "GC-abc-1".to_string(),
            payment_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn gateway_status(token: &str, code: i32) -> FlowOrderStatus {
        FlowOrderStatus {
            flow_order: 777,
            commerce_order: "GC-abc-1".to_string(),
            request_date: None,
            status: code,
            subject: Some("Gasto comun enero".to_string()),
            currency: Some("CLP".to_string()),
            amount: 15000.0,
            payer: Some(format!("payer-{token}@example.com")),
        }
    }

    #[tokio::test]
    async fn webhook_marks_payment_and_expense_paid() {
        let payment = pending_payment("tok-1", Uuid::new_v4());
        let payment_id = payment.id;
        let expense_id = payment.expense_id;

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        let found = payment.clone();
        payment_repo
            .expect_find_by_reference()
            .withf(|token| token == "tok-1")
            .returning(move |_| {
                let payment = found.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status()
            .withf(|token| token == "tok-1")
            .times(1)
            .returning(|token| {
                let status = gateway_status(token, 2);
                Box::pin(async move { Ok(status) })
            });
        let paid = payment.clone();
        payment_repo
            .expect_transition_to_paid()
            .withf(move |p, e| *p == payment_id && *e == expense_id)
            .times(1)
            .returning(move |_, _| {
                let mut paid = paid.clone();
                paid.status = PaymentStatus::Paid.to_string();
                paid.payment_date = Some(Utc::now());
                Box::pin(async move { Ok(TransitionOutcome::Applied(paid)) })
            });
        payment_repo.expect_transition_to_failed().never();

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let ack = usecase.process_webhook("tok-1").await;

        assert!(ack.success);
    }

    #[tokio::test]
    async fn webhook_for_terminal_payment_never_requeries_the_gateway() {
        let mut payment = pending_payment("tok-1", Uuid::new_v4());
        payment.status = PaymentStatus::Paid.to_string();

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        payment_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let payment = payment.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status().never();
        payment_repo.expect_transition_to_paid().never();
        payment_repo.expect_transition_to_failed().never();

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let ack = usecase.process_webhook("tok-1").await;

        assert!(ack.success);
    }

    #[tokio::test]
    async fn webhook_for_unknown_token_acks_without_action() {
        let mut payment_repo = MockPaymentRepository::new();
        let flow = MockFlowGateway::new();

        payment_repo
            .expect_find_by_reference()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let ack = usecase.process_webhook("tok-dangling").await;

        assert!(ack.success);
    }

    #[tokio::test]
    async fn webhook_swallows_gateway_failures_into_the_ack() {
        let payment = pending_payment("tok-1", Uuid::new_v4());

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        payment_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let payment = payment.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status().returning(|_| {
            Box::pin(async { Err(FlowError::Timeout("get order status".to_string())) })
        });
        payment_repo.expect_transition_to_paid().never();
        payment_repo.expect_transition_to_failed().never();

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let ack = usecase.process_webhook("tok-1").await;

        assert!(!ack.success);
    }

    #[tokio::test]
    async fn unmapped_gateway_code_leaves_the_payment_pending() {
        let payment = pending_payment("tok-1", Uuid::new_v4());

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        payment_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let payment = payment.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status().returning(|token| {
            let status = gateway_status(token, 99);
            Box::pin(async move { Ok(status) })
        });
        payment_repo.expect_transition_to_paid().never();
        payment_repo.expect_transition_to_failed().never();

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let ack = usecase.process_webhook("tok-1").await;

        assert!(ack.success);
    }

    #[tokio::test]
    async fn rejected_order_marks_the_payment_failed() {
        let payment = pending_payment("tok-1", Uuid::new_v4());
        let user_id = payment.user_id;
        let payment_id = payment.id;

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        let found = payment.clone();
        payment_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let payment = found.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status().returning(|token| {
            let status = gateway_status(token, 3);
            Box::pin(async move { Ok(status) })
        });
        payment_repo
            .expect_transition_to_failed()
            .withf(move |p| *p == payment_id)
            .times(1)
            .returning(move |_| {
                let mut failed = payment.clone();
                failed.status = PaymentStatus::Failed.to_string();
                Box::pin(async move { Ok(TransitionOutcome::Applied(failed)) })
            });
        payment_repo.expect_transition_to_paid().never();

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let outcome = usecase.confirm_manually("tok-1", user_id).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Failed);
    }

    #[tokio::test]
    async fn manual_confirm_by_non_owner_is_forbidden() {
        let payment = pending_payment("tok-1", Uuid::new_v4());

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        payment_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let payment = payment.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status().never();
        payment_repo.expect_transition_to_paid().never();
        payment_repo.expect_transition_to_failed().never();

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let result = usecase.confirm_manually("tok-1", Uuid::new_v4()).await;

        assert!(matches!(result, Err(ReconcileError::Forbidden)));
    }

    #[tokio::test]
    async fn manual_confirm_propagates_gateway_errors() {
        let payment = pending_payment("tok-1", Uuid::new_v4());
        let user_id = payment.user_id;

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        payment_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let payment = payment.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status().returning(|_| {
            Box::pin(async {
                Err(FlowError::Http {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            })
        });

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let result = usecase.confirm_manually("tok-1", user_id).await;

        assert!(matches!(result, Err(ReconcileError::Gateway(_))));
    }

    #[tokio::test]
    async fn get_status_merges_local_and_gateway_state_without_mutation() {
        let payment = pending_payment("tok-1", Uuid::new_v4());
        let payment_id = payment.id;

        let mut payment_repo = MockPaymentRepository::new();
        let mut flow = MockFlowGateway::new();

        payment_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let payment = payment.clone();
                Box::pin(async move { Ok(Some(payment)) })
            });
        flow.expect_get_order_status().returning(|token| {
            let status = gateway_status(token, 2);
            Box::pin(async move { Ok(status) })
        });
        payment_repo.expect_transition_to_paid().never();
        payment_repo.expect_transition_to_failed().never();

        let usecase = ReconciliationUseCase::new(Arc::new(payment_repo), Arc::new(flow));
        let view = usecase.get_status("tok-1").await.unwrap();

        assert_eq!(view.status_text, "Pagado");
        assert_eq!(view.gateway_status, 2);
        assert_eq!(view.payment.unwrap().payment_id, payment_id);
    }

    /// In-memory ledger with the same atomic check-and-set semantics as the
    /// postgres repository, for exercising flows that span both usecases.
    struct InMemoryLedger {
        payment: Mutex<Option<PaymentEntity>>,
        expense_status: Mutex<String>,
        applied_transitions: AtomicUsize,
    }

    impl InMemoryLedger {
        fn new() -> Self {
            Self {
                payment: Mutex::new(None),
                expense_status: Mutex::new(ExpenseStatus::Pending.to_string()),
                applied_transitions: AtomicUsize::new(0),
            }
        }

        fn with_payment(payment: PaymentEntity) -> Self {
            let ledger = Self::new();
            *ledger.payment.lock().unwrap() = Some(payment);
            ledger
        }

        fn payment_status(&self) -> PaymentStatus {
            let payment = self.payment.lock().unwrap();
            PaymentStatus::from_str(&payment.as_ref().unwrap().status)
        }
    }

    #[async_trait]
    impl PaymentRepository for InMemoryLedger {
        async fn find_by_reference(&self, reference: &str) -> AnyResult<Option<PaymentEntity>> {
            let payment = self.payment.lock().unwrap();
            Ok(payment
                .as_ref()
                .filter(|p| p.reference == reference)
                .cloned())
        }

        async fn create_pending(
            &self,
            new_payment: InsertPaymentEntity,
        ) -> AnyResult<PaymentEntity> {
            let now = Utc::now();
            let payment = PaymentEntity {
                id: Uuid::new_v4(),
                user_id: new_payment.user_id,
                expense_id: new_payment.expense_id,
                amount: new_payment.amount,
                method: new_payment.method,
                status: new_payment.status,
                reference: new_payment.reference,
                gateway_order_id: new_payment.gateway_order_id,
                commerce_order: new_payment.commerce_order,
                payment_date: None,
                created_at: now,
                updated_at: now,
            };
            *self.payment.lock().unwrap() = Some(payment.clone());
            Ok(payment)
        }

        async fn transition_to_paid(
            &self,
            payment_id: Uuid,
            _expense_id: Uuid,
        ) -> AnyResult<TransitionOutcome> {
            let mut payment = self.payment.lock().unwrap();
            match payment.as_mut() {
                Some(p)
                    if p.id == payment_id
                        && PaymentStatus::from_str(&p.status) == PaymentStatus::Pending =>
                {
                    p.status = PaymentStatus::Paid.to_string();
                    p.payment_date = Some(Utc::now());
                    *self.expense_status.lock().unwrap() = ExpenseStatus::Paid.to_string();
                    self.applied_transitions.fetch_add(1, Ordering::SeqCst);
                    Ok(TransitionOutcome::Applied(p.clone()))
                }
                _ => Ok(TransitionOutcome::AlreadySettled),
            }
        }

        async fn transition_to_failed(&self, payment_id: Uuid) -> AnyResult<TransitionOutcome> {
            let mut payment = self.payment.lock().unwrap();
            match payment.as_mut() {
                Some(p)
                    if p.id == payment_id
                        && PaymentStatus::from_str(&p.status) == PaymentStatus::Pending =>
                {
                    p.status = PaymentStatus::Failed.to_string();
                    self.applied_transitions.fetch_add(1, Ordering::SeqCst);
                    Ok(TransitionOutcome::Applied(p.clone()))
                }
                _ => Ok(TransitionOutcome::AlreadySettled),
            }
        }
    }

    #[tokio::test]
    async fn concurrent_webhook_and_manual_confirm_apply_exactly_one_transition() {
        for _ in 0..50 {
            let user_id = Uuid::new_v4();
            let payment = pending_payment("tok-race", user_id);
            let ledger = Arc::new(InMemoryLedger::with_payment(payment));

            let mut flow = MockFlowGateway::new();
            flow.expect_get_order_status().returning(|token| {
                let status = gateway_status(token, 2);
                Box::pin(async move { Ok(status) })
            });

            let usecase = Arc::new(ReconciliationUseCase::new(
                Arc::clone(&ledger),
                Arc::new(flow),
            ));

            let webhook = {
                let usecase = Arc::clone(&usecase);
                tokio::spawn(async move { usecase.process_webhook("tok-race").await })
            };
            let manual = {
                let usecase = Arc::clone(&usecase);
                tokio::spawn(
                    async move { usecase.confirm_manually("tok-race", user_id).await },
                )
            };

            let (ack, outcome) = tokio::join!(webhook, manual);
            let ack = ack.unwrap();
            let outcome = outcome.unwrap().unwrap();

            // Both callers report success, exactly one of them applied it.
            assert!(ack.success);
            assert!(matches!(
                outcome,
                ReconcileOutcome::Paid | ReconcileOutcome::AlreadySettled
            ));
            assert_eq!(ledger.applied_transitions.load(Ordering::SeqCst), 1);
            assert_eq!(ledger.payment_status(), PaymentStatus::Paid);
        }
    }

    #[tokio::test]
    async fn expense_payment_end_to_end_reaches_pagado() {
        let expense_id = Uuid::new_v4();
        let unit_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let ledger = Arc::new(InMemoryLedger::new());

        let mut expense_repo = MockExpenseRepository::new();
        let now = Utc::now();
        let expense = ExpenseEntity {
            id: expense_id,
            unit_id,
            concept: "Gasto comun enero".to_string(),
            amount: 15000.0,
            status: ExpenseStatus::Pending.to_string(),
            due_date: now,
            created_at: now,
            updated_at: now,
        };
        expense_repo.expect_find_by_id().returning(move |_| {
            let expense = expense.clone();
            Box::pin(async move { Ok(Some(expense)) })
        });

        let mut unit_member_repo = MockUnitMemberRepository::new();
        unit_member_repo
            .expect_is_confirmed_member()
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let mut flow = MockFlowGateway::new();
        flow.expect_create_order().returning(|_| {
            Box::pin(async {
                Ok(FlowOrderCreated {
                    url: "https://gateway.example/web/pay".to_string(),
                    token: "T1".to_string(),
                    flow_order: 68977654,
                })
            })
        });
        flow.expect_get_order_status().returning(|token| {
            let status = gateway_status(token, 2);
            Box::pin(async move { Ok(status) })
        });
        let flow = Arc::new(flow);

        let order_lifecycle = OrderLifecycleUseCase::new(
            Arc::new(expense_repo),
            Arc::new(unit_member_repo),
            Arc::clone(&ledger),
            Arc::clone(&flow),
        );
        let checkout = order_lifecycle
            .create_expense_payment(expense_id, user_id, Some("u1@example.com".to_string()))
            .await
            .unwrap();

        assert_eq!(checkout.token, "T1");
        assert_eq!(ledger.payment_status(), PaymentStatus::Pending);

        let reconciliation = ReconciliationUseCase::new(Arc::clone(&ledger), flow);
        let ack = reconciliation.process_webhook("T1").await;

        assert!(ack.success);
        assert_eq!(ledger.payment_status(), PaymentStatus::Paid);
        assert_eq!(
            *ledger.expense_status.lock().unwrap(),
            ExpenseStatus::Paid.to_string()
        );

        let view = reconciliation.get_status("T1").await.unwrap();
        assert_eq!(view.status_text, "Pagado");
        assert_eq!(view.payment.unwrap().status, "paid");
    }
}
