#![forbid(unsafe_code)]

use crate::{ContractViolation, Validate};

pub const SUBMISSION_ID_MAX_LEN: usize = 128;

/// Opaque identifier tying a browser session to its cached form data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let id = Self(id.into());
        id.validate()?;
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for SubmissionId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "submission_id",
                reason: "must not be empty",
            });
        }
        if self.0.len() > SUBMISSION_ID_MAX_LEN {
            return Err(ContractViolation::InvalidValue {
                field: "submission_id",
                reason: "must be <= 128 chars",
            });
        }
        if self
            .0
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ';' || c == ',')
        {
            return Err(ContractViolation::InvalidValue {
                field: "submission_id",
                reason: "must be a single cookie-safe token",
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the session gate hands to a page once a submission cookie is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub submission_id: SubmissionId,
    pub show_cookie_banner: bool,
}

impl SessionContext {
    pub fn v1(submission_id: SubmissionId, show_cookie_banner: bool) -> Self {
        Self {
            submission_id,
            show_cookie_banner,
        }
    }
}
