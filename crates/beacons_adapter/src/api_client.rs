#![forbid(unsafe_code)]

use std::time::Duration;

use async_trait::async_trait;
use beacons_os::{RegistrationApi, RegistrationApiError};

/// Blocking `ureq` client run on the blocking pool.
///
/// 2xx is success, 4xx is a rejected payload (`Ok(false)`), 5xx and transport failures are
/// errors.
#[derive(Debug, Clone)]
pub struct UreqRegistrationApi {
    base_url: String,
    timeout: Duration,
}

impl UreqRegistrationApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl RegistrationApi for UreqRegistrationApi {
    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<bool, RegistrationApiError> {
        let payload = serde_json::to_string(&body)
            .map_err(|err| RegistrationApiError::Encode(err.to_string()))?;
        let endpoint = self.endpoint(path);
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || send_json(&endpoint, &payload, timeout))
            .await
            .map_err(|err| RegistrationApiError::Transport(format!("worker join failed: {err}")))?
    }
}

fn send_json(endpoint: &str, payload: &str, timeout: Duration) -> Result<bool, RegistrationApiError> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .redirects(0)
        .build();
    match agent
        .post(endpoint)
        .set("content-type", "application/json")
        .send_string(payload)
    {
        Ok(resp) => Ok((200..=299).contains(&resp.status())),
        Err(ureq::Error::Status(code, _)) if (400..=499).contains(&code) => Ok(false),
        Err(ureq::Error::Status(code, _)) => Err(RegistrationApiError::Status(code)),
        Err(ureq::Error::Transport(err)) => Err(RegistrationApiError::Transport(err.to_string())),
    }
}

/// Used when no API url is configured. Every submission fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRegistrationApi;

#[async_trait]
impl RegistrationApi for DisabledRegistrationApi {
    async fn post(
        &self,
        _path: &str,
        _body: serde_json::Value,
    ) -> Result<bool, RegistrationApiError> {
        Err(RegistrationApiError::NotConfigured)
    }
}
