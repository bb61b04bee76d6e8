pub mod flow_gateway;
pub mod order_lifecycle;
pub mod reconciliation;
