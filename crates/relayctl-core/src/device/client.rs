//! HTTP client for relay devices.
//!
//! Every interaction with a device is one GET against
//! `http://{address}/{endpoint}` with a hard deadline around the whole
//! send-and-read. Devices are tiny ESP web servers: no TLS, no keep-alive
//! guarantees, and responses that may be JSON or plain text.

use std::time::Duration;

use reqwest::Client;
use tokio::time::timeout;

use crate::error::ExchangeError;
use crate::protocol::response::{decode_status, StatusReport};

/// Deadline for operator-initiated relay commands
pub const COMMAND_TIMEOUT_MS: u64 = 8_000;
/// Deadline for status refreshes
pub const STATUS_TIMEOUT_MS: u64 = 5_000;
/// Deadline for sync fan-out probes; kept strictly shorter than the command
/// deadline so propagation never stalls the originating command
pub const SYNC_TIMEOUT_MS: u64 = 3_000;

/// Per-purpose request deadlines.
#[derive(Debug, Clone, Copy)]
pub struct RequestProfiles {
    pub command: Duration,
    pub status: Duration,
    pub sync: Duration,
}

impl Default for RequestProfiles {
    fn default() -> Self {
        Self {
            command: Duration::from_millis(COMMAND_TIMEOUT_MS),
            status: Duration::from_millis(STATUS_TIMEOUT_MS),
            sync: Duration::from_millis(SYNC_TIMEOUT_MS),
        }
    }
}

/// One bounded request/response exchange with one device.
///
/// The dispatcher only ever talks to this trait, so panels can swap the
/// transport and tests can script outcomes per address.
#[async_trait::async_trait]
pub trait DeviceExchange: Send + Sync {
    /// GET the endpoint and normalize the response body into a
    /// [`StatusReport`].
    async fn exchange(
        &self,
        address: &str,
        endpoint: &str,
        deadline: Duration,
    ) -> Result<StatusReport, ExchangeError>;

    /// GET the endpoint and check for a 2xx status only; the body is
    /// ignored. Used for sync fan-out, where the target's acknowledgement
    /// carries no state.
    async fn probe(
        &self,
        address: &str,
        endpoint: &str,
        deadline: Duration,
    ) -> Result<(), ExchangeError>;
}

/// Production [`DeviceExchange`] backed by a shared reqwest client.
pub struct HttpDeviceClient {
    http: Client,
}

impl HttpDeviceClient {
    pub fn new() -> Result<Self, ExchangeError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ExchangeError::Transport(format!("HTTP client error: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl DeviceExchange for HttpDeviceClient {
    async fn exchange(
        &self,
        address: &str,
        endpoint: &str,
        deadline: Duration,
    ) -> Result<StatusReport, ExchangeError> {
        let url = format!("http://{}/{}", address, endpoint);
        timeout(deadline, async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| ExchangeError::Transport(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(ExchangeError::Http(status.as_u16()));
            }
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = response
                .text()
                .await
                .map_err(|e| ExchangeError::Transport(e.to_string()))?;
            Ok(decode_status(content_type.as_deref(), &body))
        })
        .await
        .map_err(|_| ExchangeError::Timeout(deadline.as_millis() as u64))?
    }

    async fn probe(
        &self,
        address: &str,
        endpoint: &str,
        deadline: Duration,
    ) -> Result<(), ExchangeError> {
        let url = format!("http://{}/{}", address, endpoint);
        timeout(deadline, async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| ExchangeError::Transport(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(ExchangeError::Http(status.as_u16()));
            }
            Ok(())
        })
        .await
        .map_err(|_| ExchangeError::Timeout(deadline.as_millis() as u64))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RelayState;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn deadline() -> Duration {
        Duration::from_millis(COMMAND_TIMEOUT_MS)
    }

    #[test]
    fn test_default_profiles() {
        let profiles = RequestProfiles::default();
        assert_eq!(profiles.command, Duration::from_millis(8000));
        assert_eq!(profiles.status, Duration::from_millis(5000));
        assert_eq!(profiles.sync, Duration::from_millis(3000));
        assert!(profiles.sync < profiles.command);
    }

    #[tokio::test]
    async fn test_exchange_decodes_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "relay_state": "on",
                "peer_connected": false,
                "uptime_seconds": 90,
                "signal_strength": -55,
                "free_heap": 160000
            })))
            .mount(&server)
            .await;

        let client = HttpDeviceClient::new().unwrap();
        let report = client
            .exchange(&server.address().to_string(), "info", deadline())
            .await
            .unwrap();
        assert_eq!(report.relay_state, Some(RelayState::On));
        assert_eq!(report.peer_connected, Some(false));
        assert_eq!(report.uptime_seconds, Some(90));
        assert_eq!(report.signal_strength, Some(-55));
        assert_eq!(report.free_heap_bytes, Some(160000));
    }

    #[tokio::test]
    async fn test_exchange_decodes_text_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ON"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Relay is ON"))
            .mount(&server)
            .await;

        let client = HttpDeviceClient::new().unwrap();
        let report = client
            .exchange(&server.address().to_string(), "ON", deadline())
            .await
            .unwrap();
        assert_eq!(report.relay_state, Some(RelayState::On));
        assert_eq!(report.message, Some("Relay is ON".to_string()));
    }

    #[tokio::test]
    async fn test_exchange_maps_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/OFF"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpDeviceClient::new().unwrap();
        let err = client
            .exchange(&server.address().to_string(), "OFF", deadline())
            .await
            .unwrap_err();
        assert_eq!(err, ExchangeError::Http(503));
    }

    #[tokio::test]
    async fn test_exchange_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("ON")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = HttpDeviceClient::new().unwrap();
        let err = client
            .exchange(
                &server.address().to_string(),
                "info",
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ExchangeError::Timeout(50));
    }

    #[tokio::test]
    async fn test_exchange_reports_transport_errors() {
        // `MockServer::start()` hands out a pooled server whose listener stays
        // open after drop; an exclusively-owned server is required so the
        // address actually goes dead.
        let server = MockServer::builder().start().await;
        let address = server.address().to_string();
        drop(server);

        let client = HttpDeviceClient::new().unwrap();
        let err = client
            .exchange(&address, "info", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_probe_checks_status_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ON_SYNC"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/OFF_SYNC"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpDeviceClient::new().unwrap();
        let address = server.address().to_string();
        client
            .probe(&address, "ON_SYNC", deadline())
            .await
            .unwrap();
        let err = client
            .probe(&address, "OFF_SYNC", deadline())
            .await
            .unwrap_err();
        assert_eq!(err, ExchangeError::Http(404));
    }
}
