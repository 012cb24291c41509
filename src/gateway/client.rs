use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::{AuthScheme, GatewayConfig};
use crate::domain::transaction::{StatusSnapshot, TransactionStatus};
use crate::error::PaymentError;
use crate::gateway::wire::{
    self, CreateTransactionRequest, CreateTransactionResponse, StatusResponse,
};
use crate::services::watch::StatusSource;

const HTTP_TIMEOUT_SECS: u64 = 30;
const ERROR_BODY_PREVIEW_LEN: usize = 200;

/// HTTP client for the PIX payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        GatewayClient { client, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.auth {
            AuthScheme::ApiKeyHeader => request.header("X-API-Key", &self.config.api_key),
            AuthScheme::Basic => {
                let token = STANDARD.encode(format!("{}:", self.config.api_key));
                request.header("Authorization", format!("Basic {}", token))
            }
        }
    }

    /// Issues the single transaction-create call for an order.
    pub async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<CreateTransactionResponse, PaymentError> {
        let url = self.endpoint("/transactions");
        let response = self
            .authorize(self.client.post(&url))
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            let message = extract_error_message(status, &body);
            tracing::warn!(status, %message, "Gateway rejected transaction create");
            return Err(PaymentError::gateway(status, message));
        }

        parse_payload(status, &body)
    }

    /// Fetches the raw status payload for a transaction.
    pub async fn transaction_status(
        &self,
        transaction_id: &str,
    ) -> Result<StatusResponse, PaymentError> {
        let url = self.endpoint(&format!("/transactions/{}", transaction_id));
        let response = self.authorize(self.client.get(&url)).send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            let message = extract_error_message(status, &body);
            return Err(PaymentError::gateway(status, message));
        }

        parse_payload(status, &body)
    }

    /// Single-shot status check mapped into the domain snapshot.
    pub async fn poll_status(&self, transaction_id: &str) -> Result<StatusSnapshot, PaymentError> {
        let response = self.transaction_status(transaction_id).await?;

        Ok(StatusSnapshot {
            transaction_id: response
                .id
                .unwrap_or_else(|| transaction_id.to_string()),
            status: response
                .status
                .as_deref()
                .map(TransactionStatus::from_gateway)
                .unwrap_or(TransactionStatus::Pending),
            amount_cents: response.amount,
            paid_at: response.paid_at.as_deref().and_then(wire::parse_timestamp),
        })
    }
}

#[async_trait]
impl StatusSource for GatewayClient {
    async fn fetch_status(&self, transaction_id: &str) -> Result<StatusSnapshot, PaymentError> {
        self.poll_status(transaction_id).await
    }
}

/// Pulls a human-readable message out of an error body that may be
/// JSON, plain text or empty.
fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.chars().take(ERROR_BODY_PREVIEW_LEN).collect()
    }
}

/// Parses a success body, unwrapping the `{"success":true,"data":{...}}`
/// envelope some gateway deployments add.
fn parse_payload<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, PaymentError> {
    let value = serde_json::from_str::<serde_json::Value>(body).map_err(|err| {
        PaymentError::gateway(status, format!("unreadable gateway response: {}", err))
    })?;

    let payload = match value.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => value,
    };

    serde_json::from_value(payload).map_err(|err| {
        PaymentError::gateway(status, format!("unexpected gateway response shape: {}", err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig {
            base_url: "https://gateway.test/".to_string(),
            api_key: "sk_test_123".to_string(),
            auth: AuthScheme::ApiKeyHeader,
            pix_expiry_secs: 600,
        }
    }

    #[test]
    fn endpoint_trims_trailing_slashes() {
        let client = GatewayClient::new(config());
        assert_eq!(
            client.endpoint("/transactions"),
            "https://gateway.test/transactions"
        );
    }

    #[test]
    fn extracts_message_field_from_json_errors() {
        let message = extract_error_message(400, r#"{"message":"Invalid document"}"#);
        assert_eq!(message, "Invalid document");

        let message = extract_error_message(400, r#"{"error":"Amount too low"}"#);
        assert_eq!(message, "Amount too low");
    }

    #[test]
    fn falls_back_to_plain_text_errors() {
        assert_eq!(
            extract_error_message(500, "Internal Server Error"),
            "Internal Server Error"
        );
        assert_eq!(extract_error_message(502, "   "), "HTTP 502");
        assert_eq!(extract_error_message(503, ""), "HTTP 503");
    }

    #[test]
    fn truncates_oversized_error_bodies() {
        let huge = "x".repeat(5000);
        let message = extract_error_message(500, &huge);
        assert_eq!(message.len(), ERROR_BODY_PREVIEW_LEN);
    }

    #[test]
    fn parses_flat_payloads() {
        let parsed: StatusResponse =
            parse_payload(200, r#"{"id":"tx-1","status":"PAID"}"#).expect("flat payload");
        assert_eq!(parsed.status.as_deref(), Some("PAID"));
    }

    #[test]
    fn unwraps_data_envelopes() {
        let parsed: StatusResponse =
            parse_payload(200, r#"{"success":true,"data":{"id":"tx-1","status":"PENDING"}}"#)
                .expect("enveloped payload");
        assert_eq!(parsed.id.as_deref(), Some("tx-1"));
        assert_eq!(parsed.status.as_deref(), Some("PENDING"));
    }

    #[test]
    fn rejects_non_json_success_bodies() {
        let result = parse_payload::<StatusResponse>(200, "<html>oops</html>");
        assert!(matches!(
            result,
            Err(PaymentError::Gateway { status: 200, .. })
        ));
    }
}
