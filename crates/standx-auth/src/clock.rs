//! Startup clock synchronization.
//!
//! Signed requests carry a millisecond timestamp that the exchange
//! validates against its own clock, so the local clock must be corrected
//! by the estimated server offset. The estimate is best-effort: geo time
//! service first, then the `Date` header of any authenticated endpoint,
//! then zero (local clock). Never fails fatally; runs exactly once at
//! startup.

use crate::error::{AuthError, AuthResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Timeout for the dedicated time-service call.
const GEO_TIMEOUT: Duration = Duration::from_secs(3);

/// Estimated server-minus-local clock offset in milliseconds.
///
/// Computed once at startup and read-only thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockOffset(pub i64);

impl ClockOffset {
    /// Local wall-clock now, corrected to server time, in milliseconds.
    pub fn adjusted_now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis() + self.0
    }

    pub fn millis(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Deserialize)]
struct RegionResponse {
    #[serde(rename = "systemTime")]
    system_time: Option<i64>,
}

/// One-shot clock synchronizer.
pub struct ClockSync {
    http: reqwest::Client,
    geo_url: String,
    base_url: String,
    api_token: String,
    symbol: String,
}

impl ClockSync {
    pub fn new(
        geo_url: impl Into<String>,
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        symbol: impl Into<String>,
    ) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AuthError::TimeSync(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            geo_url: geo_url.into(),
            base_url: base_url.into(),
            api_token: api_token.into(),
            symbol: symbol.into(),
        })
    }

    /// Estimate the server clock offset.
    ///
    /// Geo time service first; on failure the `Date` response header of an
    /// authenticated read; if both fail, zero offset with a warning.
    pub async fn sync(&self) -> ClockOffset {
        match self.sync_via_geo().await {
            Ok(offset) => {
                info!(offset_ms = offset.0, "Clock synced via geo time service");
                return offset;
            }
            Err(e) => {
                warn!(error = %e, "Geo time sync failed, falling back to Date header");
            }
        }

        match self.sync_via_date_header().await {
            Ok(offset) => {
                info!(offset_ms = offset.0, "Clock synced via Date header");
                offset
            }
            Err(e) => {
                warn!(error = %e, "Clock sync failed entirely, using local clock");
                ClockOffset(0)
            }
        }
    }

    async fn sync_via_geo(&self) -> AuthResult<ClockOffset> {
        let url = format!("{}/v1/region", self.geo_url);
        let response = self
            .http
            .get(&url)
            .timeout(GEO_TIMEOUT)
            .send()
            .await
            .map_err(|e| AuthError::TimeSync(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::TimeSync(format!("HTTP {}", response.status())));
        }

        let body: RegionResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TimeSync(e.to_string()))?;

        let server_time = body
            .system_time
            .ok_or_else(|| AuthError::TimeSync("region response has no systemTime".to_string()))?;

        Ok(ClockOffset(
            server_time - chrono::Utc::now().timestamp_millis(),
        ))
    }

    async fn sync_via_date_header(&self) -> AuthResult<ClockOffset> {
        let url = format!(
            "{}/api/query_positions?symbol={}",
            self.base_url, self.symbol
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| AuthError::TimeSync(e.to_string()))?;

        let date = response
            .headers()
            .get(reqwest::header::DATE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::TimeSync("no Date response header".to_string()))?;

        let server_time = chrono::DateTime::parse_from_rfc2822(date)
            .map_err(|e| AuthError::TimeSync(format!("unparseable Date header: {e}")))?
            .timestamp_millis();

        Ok(ClockOffset(
            server_time - chrono::Utc::now().timestamp_millis(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjusted_now_applies_offset() {
        let base = chrono::Utc::now().timestamp_millis();
        let ahead = ClockOffset(5_000).adjusted_now_ms();
        // Server is 5s ahead; allow slack for test execution time.
        assert!(ahead - base >= 5_000);
        assert!(ahead - base < 6_000);
    }

    #[test]
    fn test_zero_offset_is_local_clock() {
        let offset = ClockOffset::default();
        let local = chrono::Utc::now().timestamp_millis();
        assert!((offset.adjusted_now_ms() - local).abs() < 1_000);
    }

    #[test]
    fn test_region_response_parsing() {
        let body: RegionResponse =
            serde_json::from_str(r#"{"region":"ap","systemTime":1700000000123}"#).unwrap();
        assert_eq!(body.system_time, Some(1700000000123));

        let missing: RegionResponse = serde_json::from_str(r#"{"region":"ap"}"#).unwrap();
        assert!(missing.system_time.is_none());
    }
}
