#![forbid(unsafe_code)]

//! Session cookie gate. Pages behind it only run once a submission cookie is present.

use axum::http::header::{InvalidHeaderValue, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use beacons_kernel_contracts::{SessionContext, SubmissionId};

pub const SUBMISSION_COOKIE: &str = "submissionId";
pub const COOKIE_POLICY_COOKIE: &str = "acceptRejectCookie";

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `None` when the submission cookie is missing or unusable.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionContext> {
    let submission_id = SubmissionId::new(cookie_value(headers, SUBMISSION_COOKIE)?).ok()?;
    let show_cookie_banner = cookie_value(headers, COOKIE_POLICY_COOKIE).is_none();
    Some(SessionContext::v1(submission_id, show_cookie_banner))
}

pub fn check_header_contains(headers: &HeaderMap, name: &str, needle: &str) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(needle))
}

pub fn submission_cookie(id: &SubmissionId) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SUBMISSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Strict"
    ))
}

pub fn clear_submission_cookie() -> HeaderValue {
    HeaderValue::from_static("submissionId=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}
