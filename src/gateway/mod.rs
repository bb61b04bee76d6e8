pub mod flow_client;
pub mod signature;
