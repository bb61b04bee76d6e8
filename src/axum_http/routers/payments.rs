use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::config::config_model::FlowConfig;
use crate::domain::repositories::{
    expenses::ExpenseRepository, payments::PaymentRepository,
    unit_members::UnitMemberRepository,
};
use crate::gateway::flow_client::FlowClient;
use crate::infra::db::{
    postgres_connection::PgPoolSquad,
    repositories::{
        expenses::ExpensePostgres, payments::PaymentPostgres, unit_members::UnitMemberPostgres,
    },
};
use crate::usecases::{
    flow_gateway::FlowGateway,
    order_lifecycle::OrderLifecycleUseCase,
    reconciliation::ReconciliationUseCase,
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreateExpensePaymentResponse {
    pub success: bool,
    pub checkout_url: String,
    pub payment_id: Uuid,
    pub token: String,
}

/// The gateway delivers the confirmation callback form-encoded, token only.
/// Nothing else in the body is trusted.
#[derive(Debug, Deserialize)]
pub struct ConfirmationPayload {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPayload {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub success: bool,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub token: String,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, flow_config: FlowConfig) -> Router {
    let payment_repository = Arc::new(PaymentPostgres::new(Arc::clone(&db_pool)));
    let expense_repository = Arc::new(ExpensePostgres::new(Arc::clone(&db_pool)));
    let unit_member_repository = Arc::new(UnitMemberPostgres::new(Arc::clone(&db_pool)));
    let flow_client = Arc::new(FlowClient::new(flow_config));

    let order_lifecycle = OrderLifecycleUseCase::new(
        expense_repository,
        unit_member_repository,
        Arc::clone(&payment_repository),
        Arc::clone(&flow_client),
    );
    let reconciliation = ReconciliationUseCase::new(payment_repository, flow_client);

    let order_routes = Router::new()
        .route(
            "/expense/:expense_id",
            post(
                create_expense_payment::<
                    ExpensePostgres,
                    UnitMemberPostgres,
                    PaymentPostgres,
                    FlowClient,
                >,
            ),
        )
        .with_state(Arc::new(order_lifecycle));

    let reconcile_routes = Router::new()
        .route(
            "/flow/confirmation",
            post(process_webhook::<PaymentPostgres, FlowClient>),
        )
        .route(
            "/confirm",
            post(confirm_manually::<PaymentPostgres, FlowClient>),
        )
        .route("/status", get(get_status::<PaymentPostgres, FlowClient>))
        .with_state(Arc::new(reconciliation));

    order_routes.merge(reconcile_routes)
}

pub async fn create_expense_payment<E, M, P, G>(
    State(usecase): State<Arc<OrderLifecycleUseCase<E, M, P, G>>>,
    AuthUser { user_id, email, .. }: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse
where
    E: ExpenseRepository + Send + Sync + 'static,
    M: UnitMemberRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    match usecase
        .create_expense_payment(expense_id, user_id, email)
        .await
    {
        Ok(checkout) => (
            StatusCode::OK,
            Json(CreateExpensePaymentResponse {
                success: true,
                checkout_url: checkout.checkout_url,
                payment_id: checkout.payment_id,
                token: checkout.token,
            }),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

/// Public endpoint for the gateway's confirmation callback. Always answers
/// 200; retry behavior stays under the gateway's control.
pub async fn process_webhook<P, G>(
    State(usecase): State<Arc<ReconciliationUseCase<P, G>>>,
    Form(payload): Form<ConfirmationPayload>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    let ack = usecase.process_webhook(&payload.token).await;
    (StatusCode::OK, Json(ack))
}

pub async fn confirm_manually<P, G>(
    State(usecase): State<Arc<ReconciliationUseCase<P, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(payload): Json<ConfirmPayload>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    match usecase.confirm_manually(&payload.token, user_id).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ConfirmResponse {
                success: true,
                status: outcome.as_str(),
            }),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn get_status<P, G>(
    State(usecase): State<Arc<ReconciliationUseCase<P, G>>>,
    _auth: AuthUser,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    G: FlowGateway + Send + Sync + 'static,
{
    match usecase.get_status(&query.token).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
