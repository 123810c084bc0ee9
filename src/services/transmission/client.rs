use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CheckError;

pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

#[derive(Serialize)]
struct RpcRequest {
    method: &'static str,
    tag: u32,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionStats {
    download_speed: f64,
}

/// Read `arguments.downloadSpeed` out of a `session-stats` answer.
/// Negative speeds are reported as 0.
///
/// `result` is checked before `arguments`: a daemon-side error comes back
/// with empty arguments.
pub fn parse_download_speed(body: &[u8]) -> Result<f64, CheckError> {
    let resp: RpcResponse = serde_json::from_slice(body)?;
    if resp.result != "success" {
        return Err(CheckError::RpcRejected(resp.result));
    }
    let stats: SessionStats = serde_json::from_value(resp.arguments)?;
    Ok(stats.download_speed.max(0.0))
}

/// Minimal Transmission RPC client: just enough for `session-stats`.
///
/// Transmission answers 409 with a fresh `X-Transmission-Session-Id` when
/// the id we sent is missing or stale; the client adopts it and retries
/// once.
pub struct TransmissionClient {
    client: Client,
    url: String,
    user: String,
    password: String,
    session_id: Mutex<Option<String>>,
}

impl TransmissionClient {
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url: url.into(),
            user: user.into(),
            password: password.into(),
            session_id: Mutex::new(None),
        }
    }

    async fn post(&self, session_id: Option<&str>) -> Result<reqwest::Response, CheckError> {
        let mut request = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&RpcRequest {
                method: "session-stats",
                tag: 42,
            });
        if let Some(id) = session_id {
            request = request.header(SESSION_ID_HEADER, id);
        }
        Ok(request.send().await?)
    }

    /// Current download speed of the daemon, in bytes/s.
    pub async fn download_speed(&self) -> Result<f64, CheckError> {
        let mut session_id = self.session_id.lock().await;

        let mut response = self.post(session_id.as_deref()).await?;

        if response.status() == StatusCode::CONFLICT {
            let fresh = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or(CheckError::MissingSessionId)?;
            info!(url = %self.url, "Negotiated new Transmission session");
            *session_id = Some(fresh);
            response = self.post(session_id.as_deref()).await?;
        }

        if !response.status().is_success() {
            return Err(CheckError::HttpStatus(response.status()));
        }

        let body = response.bytes().await?;
        let speed = parse_download_speed(&body)?;
        debug!(download_speed = speed, kib_per_s = speed / 1024.0, "Download speed");
        Ok(speed)
    }
}
