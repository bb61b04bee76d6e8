use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::config_model::FlowConfig;
use crate::gateway::signature::{SIGNATURE_PARAM, SignatureEngine};

/// Order creation tolerates gateway latency; status queries are kept short
/// because they are retried and polled.
const CREATE_ORDER_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Status queries are read-only, so timeouts are retried with a bounded
/// exponential backoff. Order creation is never retried: a duplicate POST
/// could create a second remote order.
const STATUS_RETRY_ATTEMPTS: u32 = 3;
const STATUS_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

const CURRENCY: &str = "CLP";
// Gateway selector for "let the payer choose" at checkout.
const PAYMENT_METHOD_ALL: &str = "9";

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("gateway request timed out during {0}")]
    Timeout(String),
    #[error("gateway returned status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("gateway response could not be parsed: {0}")]
    MalformedBody(String),
    #[error("gateway transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub commerce_order: String,
    pub subject: String,
    pub amount: f64,
    pub email: String,
    pub optional: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowOrderCreated {
    pub url: String,
    pub token: String,
    #[serde(rename = "flowOrder")]
    pub flow_order: i64,
}

impl FlowOrderCreated {
    pub fn checkout_url(&self) -> String {
        format!("{}?token={}", self.url, self.token)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowOrderStatus {
    #[serde(rename = "flowOrder")]
    pub flow_order: i64,
    #[serde(rename = "commerceOrder")]
    pub commerce_order: String,
    #[serde(rename = "requestDate")]
    pub request_date: Option<String>,
    /// Opaque wire code; interpreted only by the reconciler.
    pub status: i32,
    pub subject: Option<String>,
    pub currency: Option<String>,
    pub amount: f64,
    pub payer: Option<String>,
}

/// The gateway's currency has no subdivision, so amounts go over the wire
/// as whole units.
pub fn round_clp(amount: f64) -> i64 {
    amount.round() as i64
}

pub struct FlowClient {
    http: reqwest::Client,
    signer: SignatureEngine,
    config: FlowConfig,
}

impl FlowClient {
    pub fn new(config: FlowConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            signer: SignatureEngine::new(&config.secret_key),
            config,
        }
    }

    pub async fn create_order(
        &self,
        order: CreateOrderRequest,
    ) -> Result<FlowOrderCreated, FlowError> {
        let mut params: Vec<(String, String)> = vec![
            ("apiKey".to_string(), self.config.api_key.clone()),
            ("commerceOrder".to_string(), order.commerce_order.clone()),
            ("subject".to_string(), order.subject.clone()),
            ("currency".to_string(), CURRENCY.to_string()),
            ("amount".to_string(), round_clp(order.amount).to_string()),
            ("email".to_string(), order.email.clone()),
            ("paymentMethod".to_string(), PAYMENT_METHOD_ALL.to_string()),
            (
                "urlConfirmation".to_string(),
                self.config.confirmation_url.clone(),
            ),
            ("urlReturn".to_string(), self.config.return_url.clone()),
        ];
        if let Some(optional) = &order.optional {
            params.push(("optional".to_string(), optional.to_string()));
        }

        let signature = self.signer.sign(&params);
        params.push((SIGNATURE_PARAM.to_string(), signature));

        let resp = self
            .http
            .post(format!("{}/payment/create", self.config.base_url))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&params)
            .timeout(CREATE_ORDER_TIMEOUT)
            .send()
            .await
            .map_err(|err| Self::transport_error(err, "create order"))?;
        let resp = Self::ensure_success(resp, "create order").await?;

        Self::parse_body(resp, "create order").await
    }

    /// Queries the authoritative order status. Timeouts are retried with
    /// exponential backoff since the call is read-only.
    pub async fn get_order_status(&self, token: &str) -> Result<FlowOrderStatus, FlowError> {
        let mut delay = STATUS_RETRY_BASE_DELAY;
        let mut attempt = 1;

        loop {
            match self.get_order_status_once(token).await {
                Err(FlowError::Timeout(_)) if attempt < STATUS_RETRY_ATTEMPTS => {
                    warn!(
                        attempt,
                        token, "flow: status query timed out, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn get_order_status_once(&self, token: &str) -> Result<FlowOrderStatus, FlowError> {
        let params: Vec<(String, String)> = vec![
            ("apiKey".to_string(), self.config.api_key.clone()),
            ("token".to_string(), token.to_string()),
        ];
        let signature = self.signer.sign(&params);

        let mut query = params;
        query.push((SIGNATURE_PARAM.to_string(), signature));

        let resp = self
            .http
            .get(format!("{}/payment/getStatus", self.config.base_url))
            .query(&query)
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(|err| Self::transport_error(err, "get order status"))?;
        let resp = Self::ensure_success(resp, "get order status").await?;

        Self::parse_body(resp, "get order status").await
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, FlowError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "flow api request failed"
        );

        Err(FlowError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_body<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<T, FlowError> {
        let body = resp
            .text()
            .await
            .map_err(|err| Self::transport_error(err, context))?;

        serde_json::from_str(&body).map_err(|err| {
            error!(
                response_body = %body,
                context = %context,
                error = %err,
                "flow api response body is malformed"
            );
            FlowError::MalformedBody(err.to_string())
        })
    }

    fn transport_error(err: reqwest::Error, context: &str) -> FlowError {
        if err.is_timeout() {
            FlowError::Timeout(context.to_string())
        } else {
            FlowError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_amounts_to_whole_pesos() {
        assert_eq!(round_clp(1999.6), 2000);
        assert_eq!(round_clp(1999.4), 1999);
        assert_eq!(round_clp(15000.0), 15000);
    }

    #[test]
    fn checkout_url_appends_the_token() {
        let created = FlowOrderCreated {
            url: "https://gateway.example/web/pay".to_string(),
            token: "tok-abc".to_string(),
            flow_order: 42,
        };
        assert_eq!(
            created.checkout_url(),
            "https://gateway.example/web/pay?token=tok-abc"
        );
    }

    #[test]
    fn parses_a_status_payload() {
        let body = r#"{
            "flowOrder": 68977654,
            "commerceOrder": "GC-abc-1700000000000",
            "requestDate": "2026-01-15 10:30:12",
            "status": 2,
            "subject": "Gasto comun enero",
            "currency": "CLP",
            "amount": 15000,
            "payer": "payer@example.com"
        }"#;

        let status: FlowOrderStatus = serde_json::from_str(body).unwrap();
        assert_eq!(status.flow_order, 68977654);
        assert_eq!(status.status, 2);
        assert_eq!(status.amount, 15000.0);
        assert_eq!(status.commerce_order, "GC-abc-1700000000000");
    }
}
