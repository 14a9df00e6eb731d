#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

use beacons_forms::FormManager;
use beacons_kernel_contracts::{
    ContractViolation, FormPageProps, FormRecord, Redirect, SessionContext,
};
use beacons_storage::{FormCache, StorageError};
use tracing::debug;

use crate::body::{parse_form_body, BodyParseError};

pub type FormManagerFactory =
    dyn Fn(&FormRecord) -> Result<FormManager, ContractViolation> + Send + Sync;
pub type TransformCallback = dyn Fn(FormRecord) -> FormRecord + Send + Sync;
pub type SuccessfulPostCallback = dyn Fn(&FormRecord) -> PageOutcome + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMethod {
    Get,
    Post,
}

impl PageMethod {
    /// Anything other than `POST` takes the read path.
    pub fn from_name(method: &str) -> Self {
        if method == "POST" {
            PageMethod::Post
        } else {
            PageMethod::Get
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub method: PageMethod,
    pub session: SessionContext,
    pub body: Vec<u8>,
}

impl PageRequest {
    pub fn get(session: SessionContext) -> Self {
        Self {
            method: PageMethod::Get,
            session,
            body: Vec::new(),
        }
    }

    pub fn post(session: SessionContext, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: PageMethod::Post,
            session,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Render(FormPageProps),
    Redirect(Redirect),
}

impl PageOutcome {
    pub fn as_redirect(&self) -> Option<&Redirect> {
        match self {
            PageOutcome::Redirect(redirect) => Some(redirect),
            PageOutcome::Render(_) => None,
        }
    }

    pub fn as_props(&self) -> Option<&FormPageProps> {
        match self {
            PageOutcome::Render(props) => Some(props),
            PageOutcome::Redirect(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    BodyParse(#[from] BodyParseError),
    #[error(transparent)]
    ContractViolation(#[from] ContractViolation),
}

/// GET/POST lifecycle for one wizard page.
///
/// GET renders the cached record without validation. POST parses the body, applies the
/// transform, overwrites the cache entry, then validates the transformed record: a clean
/// form goes to the success callback (303 to `destination_if_valid` by default), a form with
/// errors is re-rendered with its messages. The invalid record stays cached.
#[derive(Clone)]
pub struct PageRequestHandler {
    cache: Arc<dyn FormCache>,
    destination_if_valid: String,
    factory: Arc<FormManagerFactory>,
    transform: Option<Arc<TransformCallback>>,
    cached_view: Option<Arc<TransformCallback>>,
    on_success: Option<Arc<SuccessfulPostCallback>>,
}

pub fn handle_page_request(
    cache: Arc<dyn FormCache>,
    destination_if_valid: impl Into<String>,
    factory: impl Fn(&FormRecord) -> Result<FormManager, ContractViolation> + Send + Sync + 'static,
) -> PageRequestHandler {
    PageRequestHandler {
        cache,
        destination_if_valid: destination_if_valid.into(),
        factory: Arc::new(factory),
        transform: None,
        cached_view: None,
        on_success: None,
    }
}

impl PageRequestHandler {
    pub fn with_transform(
        mut self,
        transform: impl Fn(FormRecord) -> FormRecord + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Reshapes the cached record before a GET binds it. POST never sees it.
    pub fn with_cached_view(
        mut self,
        view: impl Fn(FormRecord) -> FormRecord + Send + Sync + 'static,
    ) -> Self {
        self.cached_view = Some(Arc::new(view));
        self
    }

    pub fn on_successful_post(
        mut self,
        callback: impl Fn(&FormRecord) -> PageOutcome + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn destination_if_valid(&self) -> &str {
        &self.destination_if_valid
    }

    pub async fn handle(&self, request: PageRequest) -> Result<PageOutcome, PageRequestError> {
        match request.method {
            PageMethod::Get => self.handle_get(&request.session).await,
            PageMethod::Post => self.handle_post(&request.session, &request.body).await,
        }
    }

    async fn handle_get(&self, session: &SessionContext) -> Result<PageOutcome, PageRequestError> {
        let cached = self.cache.get(&session.submission_id).await?;
        let record = match &self.cached_view {
            Some(view) => view(cached),
            None => cached,
        };
        let form = (self.factory)(&record)?;
        debug!(
            submission_id = %session.submission_id,
            fields = record.len(),
            "page get"
        );
        Ok(PageOutcome::Render(render_props(session, &form)))
    }

    async fn handle_post(
        &self,
        session: &SessionContext,
        body: &[u8],
    ) -> Result<PageOutcome, PageRequestError> {
        let submitted = parse_form_body(body)?;
        let transformed = match &self.transform {
            Some(transform) => transform(submitted),
            None => submitted,
        };
        self.cache
            .update(&session.submission_id, transformed.clone())
            .await?;

        let form = (self.factory)(&transformed)?.as_dirty();
        let valid = form.is_valid();
        debug!(
            submission_id = %session.submission_id,
            valid,
            errors = form.error_summary().len(),
            "page post"
        );
        if !valid {
            return Ok(PageOutcome::Render(render_props(session, &form)));
        }
        Ok(match &self.on_success {
            Some(callback) => callback(&transformed),
            None => PageOutcome::Redirect(Redirect::see_other(self.destination_if_valid.clone())),
        })
    }
}

impl fmt::Debug for PageRequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRequestHandler")
            .field("destination_if_valid", &self.destination_if_valid)
            .field("has_transform", &self.transform.is_some())
            .field("has_cached_view", &self.cached_view.is_some())
            .field("has_on_success", &self.on_success.is_some())
            .finish_non_exhaustive()
    }
}

fn render_props(session: &SessionContext, form: &FormManager) -> FormPageProps {
    FormPageProps {
        form: form.serialise(),
        show_cookie_banner: session.show_cookie_banner,
        submission_id: session.submission_id.to_string(),
    }
}
