pub mod auth;
pub mod axum_http;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod infra;
pub mod usecases;
