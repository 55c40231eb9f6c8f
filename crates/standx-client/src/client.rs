//! Core request plumbing: auth headers, signing, error normalization.

use crate::error::{ClientError, ClientResult};
use serde::Serialize;
use serde_json::Value;
use standx_auth::RequestSigner;
use tracing::debug;

/// Typed wrapper over the StandX REST API for one instrument.
///
/// Read-only calls carry bearer auth only. Mutating (POST) calls are
/// serialized once and signed over those exact bytes, then sent with the
/// four `x-request-*` headers. No retries at this layer; retry posture
/// belongs to the trading loop.
pub struct ExchangeClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    symbol: String,
    signer: RequestSigner,
}

impl ExchangeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        symbol: impl Into<String>,
        signer: RequestSigner,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Build(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_token: api_token.into(),
            symbol: symbol.into(),
            signer,
        })
    }

    /// Instrument this client is bound to.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Authenticated GET. `path_and_query` starts with `/`.
    pub(crate) async fn get(&self, path_and_query: &str) -> ClientResult<Value> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::handle_response(path_and_query, response).await
    }

    /// Authenticated, signed POST.
    pub(crate) async fn post<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let payload =
            serde_json::to_vec(body).map_err(|e| ClientError::Build(e.to_string()))?;
        let headers = self.signer.sign(&payload);

        debug!(path, request_id = %headers.request_id, "Signed POST");

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("x-request-sign-version", &headers.version)
            .header("x-request-id", &headers.request_id)
            .header("x-request-timestamp", &headers.timestamp)
            .header("x-request-signature", &headers.signature)
            .body(payload)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::handle_response(path, response).await
    }

    async fn handle_response(path: &str, response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();

        if Self::not_found_is_noop(status, path) {
            return Ok(serde_json::json!({"code": 0, "message": "No orders to cancel"}));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                code: i64::from(status.as_u16()),
                message: body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        match Self::embedded_error(&body) {
            Some(err) => Err(err),
            None => Ok(body),
        }
    }

    /// An already-empty order book answers cancel-all with 404; that is
    /// an idempotent no-op, not an error.
    fn not_found_is_noop(status: reqwest::StatusCode, path: &str) -> bool {
        status == reqwest::StatusCode::NOT_FOUND && path.contains("cancel_all")
    }

    /// A 2xx body can still carry a non-zero `code`; surface it as an
    /// API error.
    fn embedded_error(body: &Value) -> Option<ClientError> {
        let code = body.get("code").and_then(Value::as_i64)?;
        if code == 0 {
            return None;
        }
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        Some(ClientError::Api { code, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_cancel_all_not_found_is_success() {
        assert!(ExchangeClient::not_found_is_noop(
            StatusCode::NOT_FOUND,
            "/api/cancel_all_orders"
        ));
    }

    #[test]
    fn test_not_found_elsewhere_stays_an_error() {
        assert!(!ExchangeClient::not_found_is_noop(
            StatusCode::NOT_FOUND,
            "/api/new_order"
        ));
        assert!(!ExchangeClient::not_found_is_noop(
            StatusCode::OK,
            "/api/cancel_all_orders"
        ));
    }

    #[test]
    fn test_embedded_error_code_detection() {
        let body: Value =
            serde_json::from_str(r#"{"code": 1012, "message": "insufficient margin"}"#).unwrap();
        match ExchangeClient::embedded_error(&body) {
            Some(ClientError::Api { code, message }) => {
                assert_eq!(code, 1012);
                assert_eq!(message, "insufficient margin");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_zero_code_is_success() {
        let body: Value = serde_json::from_str(r#"{"code": 0, "result": []}"#).unwrap();
        assert!(ExchangeClient::embedded_error(&body).is_none());

        let bare: Value = serde_json::from_str(r#"[{"id": "1"}]"#).unwrap();
        assert!(ExchangeClient::embedded_error(&bare).is_none());
    }
}
