#![forbid(unsafe_code)]

use std::sync::Arc;

use async_trait::async_trait;
use beacons_kernel_contracts::SessionContext;
use beacons_storage::{FormCache, StorageError};
use tracing::{info, warn};

pub const REGISTRATION_API_PATH: &str = "registrations/register";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationApiError {
    #[error("registration api is not configured")]
    NotConfigured,
    #[error("registration api transport failure: {0}")]
    Transport(String),
    #[error("registration api returned status {0}")]
    Status(u16),
    #[error("registration payload could not be encoded: {0}")]
    Encode(String),
}

/// Remote registration service.
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    /// `Ok(true)` when the service accepted the payload.
    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<bool, RegistrationApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCompleteProps {
    pub registration_success: bool,
    pub show_cookie_banner: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationCompleteOutcome {
    pub props: ApplicationCompleteProps,
    pub clear_submission_cookie: bool,
}

/// Sends a finished submission to the registration service.
///
/// On success the cache entry is dropped and the submission cookie should be cleared. On
/// failure both are kept so the user can try again.
#[derive(Clone)]
pub struct SubmitRegistration {
    cache: Arc<dyn FormCache>,
    api: Arc<dyn RegistrationApi>,
}

impl SubmitRegistration {
    pub fn new(cache: Arc<dyn FormCache>, api: Arc<dyn RegistrationApi>) -> Self {
        Self { cache, api }
    }

    pub async fn run(
        &self,
        session: &SessionContext,
    ) -> Result<ApplicationCompleteOutcome, StorageError> {
        let record = self.cache.get(&session.submission_id).await?;
        let sent = match serde_json::to_value(&record) {
            Ok(body) => self.api.post(REGISTRATION_API_PATH, body).await,
            Err(err) => Err(RegistrationApiError::Encode(err.to_string())),
        };

        let registration_success = match sent {
            Ok(true) => true,
            Ok(false) => {
                warn!(
                    submission_id = %session.submission_id,
                    "registration api rejected submission"
                );
                false
            }
            Err(err) => {
                warn!(
                    submission_id = %session.submission_id,
                    error = %err,
                    "registration api call failed"
                );
                false
            }
        };

        if registration_success {
            self.cache.remove(&session.submission_id).await?;
            info!(submission_id = %session.submission_id, "registration submitted");
        }

        Ok(ApplicationCompleteOutcome {
            props: ApplicationCompleteProps {
                registration_success,
                show_cookie_banner: false,
            },
            clear_submission_cookie: registration_success,
        })
    }
}

impl std::fmt::Debug for SubmitRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitRegistration").finish_non_exhaustive()
    }
}
