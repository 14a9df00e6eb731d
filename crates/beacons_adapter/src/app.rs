#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use beacons_kernel_contracts::{FormRecord, Redirect, SubmissionId};
use beacons_os::pages::{self, CHECK_BEACON_DETAILS_URL, HOME_URL, START_URL};
use beacons_os::{
    PageMethod, PageOutcome, PageRequest, PageRequestHandler, RegistrationApi, SubmitRegistration,
};
use beacons_storage::FormCache;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::gate;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn FormCache>,
    pub submit: SubmitRegistration,
}

impl AppState {
    pub fn new(cache: Arc<dyn FormCache>, api: Arc<dyn RegistrationApi>) -> Self {
        Self {
            submit: SubmitRegistration::new(cache.clone(), api),
            cache,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(HOME_URL, get(home))
        .route("/healthz", get(healthz))
        .route(START_URL, get(start))
        .route(pages::CHECK_YOUR_ANSWERS_URL, get(check_your_answers))
        .route(pages::APPLICATION_COMPLETE_URL, get(application_complete));

    for page in pages::registration_pages() {
        let handler = page.handler(state.cache.clone());
        router = router.route(
            page.path,
            any(move |method: Method, headers: HeaderMap, body: Bytes| {
                let handler = handler.clone();
                async move { serve_page(handler, method, headers, body).await }
            }),
        );
    }

    router.with_state(state)
}

async fn serve_page(
    handler: PageRequestHandler,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let Some(session) = gate::session_from_headers(&headers) else {
        return redirect_response(&Redirect::temporary(HOME_URL));
    };
    let method = PageMethod::from_name(method.as_str());
    let body = if method == PageMethod::Post
        && gate::check_header_contains(&headers, CONTENT_TYPE.as_str(), FORM_URLENCODED)
    {
        body.to_vec()
    } else {
        Vec::new()
    };
    let outcome = handler
        .handle(PageRequest {
            method,
            session,
            body,
        })
        .await?;
    match outcome {
        PageOutcome::Render(props) => Ok(Json(props).into_response()),
        PageOutcome::Redirect(redirect) => redirect_response(&redirect),
    }
}

pub fn redirect_response(redirect: &Redirect) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(redirect.status_code).unwrap_or(StatusCode::SEE_OTHER);
    let mut response = status.into_response();
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_str(&redirect.destination)?);
    Ok(response)
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "startUrl": START_URL }))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Mints a submission when the browser has none, then sends it to the first page.
async fn start(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if gate::session_from_headers(&headers).is_some() {
        return redirect_response(&Redirect::see_other(CHECK_BEACON_DETAILS_URL));
    }
    let id = SubmissionId::new(Uuid::new_v4().to_string())?;
    state.cache.update(&id, FormRecord::new()).await?;
    let mut response = redirect_response(&Redirect::see_other(CHECK_BEACON_DETAILS_URL))?;
    response
        .headers_mut()
        .append(SET_COOKIE, gate::submission_cookie(&id)?);
    info!(submission_id = %id, "submission started");
    Ok(response)
}

async fn check_your_answers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(session) = gate::session_from_headers(&headers) else {
        return redirect_response(&Redirect::temporary(HOME_URL));
    };
    let props = pages::check_your_answers(state.cache.as_ref(), &session).await?;
    Ok(Json(props).into_response())
}

async fn application_complete(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(session) = gate::session_from_headers(&headers) else {
        return redirect_response(&Redirect::temporary(START_URL));
    };
    let outcome = state.submit.run(&session).await?;
    let mut response = Json(outcome.props).into_response();
    if outcome.clear_submission_cookie {
        response
            .headers_mut()
            .append(SET_COOKIE, gate::clear_submission_cookie());
    }
    Ok(response)
}
