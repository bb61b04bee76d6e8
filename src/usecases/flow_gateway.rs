use async_trait::async_trait;

use crate::gateway::flow_client::{
    CreateOrderRequest, FlowClient, FlowError, FlowOrderCreated, FlowOrderStatus,
};

/// Outbound gateway port consumed by the usecases, mockable in tests.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait FlowGateway: Send + Sync {
    async fn create_order(&self, order: CreateOrderRequest)
    -> Result<FlowOrderCreated, FlowError>;

    async fn get_order_status(&self, token: &str) -> Result<FlowOrderStatus, FlowError>;
}

#[async_trait]
impl FlowGateway for FlowClient {
    async fn create_order(
        &self,
        order: CreateOrderRequest,
    ) -> Result<FlowOrderCreated, FlowError> {
        self.create_order(order).await
    }

    async fn get_order_status(&self, token: &str) -> Result<FlowOrderStatus, FlowError> {
        self.get_order_status(token).await
    }
}
