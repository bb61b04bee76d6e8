pub mod expense_statuses;
pub mod gateway_order_statuses;
pub mod payment_methods;
pub mod payment_statuses;
pub mod unit_member_statuses;
