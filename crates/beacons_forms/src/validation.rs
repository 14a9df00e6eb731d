#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

use crate::control::ControlRef;

pub type ErrorPredicate = dyn Fn(&ControlRef<'_>) -> bool + Send + Sync;
pub type ConditionPredicate = dyn Fn(&[&str]) -> bool + Send + Sync;

/// A predicate paired with the message shown when it fires.
///
/// The predicate must be a pure function of the control it is handed. Cross-field rules
/// reach siblings through [`ControlRef::parent`] / [`ControlRef::sibling`].
#[derive(Clone)]
pub struct ValidationRule {
    has_error_fn: Arc<ErrorPredicate>,
    error_message: String,
}

impl ValidationRule {
    pub fn new(
        error_message: impl Into<String>,
        has_error_fn: impl Fn(&ControlRef<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            has_error_fn: Arc::new(has_error_fn),
            error_message: error_message.into(),
        }
    }

    /// Rule over the control's scalar value only. Groups read as `""`.
    pub fn on_value(
        error_message: impl Into<String>,
        has_error_fn: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(error_message, move |control| has_error_fn(control.as_str()))
    }

    pub fn has_error(&self, control: &ControlRef<'_>) -> bool {
        (self.has_error_fn)(control)
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("error_message", &self.error_message)
            .finish_non_exhaustive()
    }
}

/// Gates a field's rules on the values of named siblings.
///
/// Sibling values are always looked up through the owning group, in `depends_on` order,
/// and handed to `meeting_condition`. A missing sibling reads as `""`.
#[derive(Clone)]
pub struct ValidationCondition {
    depends_on: Vec<String>,
    meeting_condition: Arc<ConditionPredicate>,
}

impl ValidationCondition {
    pub fn new<S: Into<String>>(
        depends_on: impl IntoIterator<Item = S>,
        meeting_condition: impl Fn(&[&str]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            depends_on: depends_on.into_iter().map(Into::into).collect(),
            meeting_condition: Arc::new(meeting_condition),
        }
    }

    /// Met when at least one of the named siblings is non-empty.
    pub fn when_any_present<S: Into<String>>(depends_on: impl IntoIterator<Item = S>) -> Self {
        Self::new(depends_on, |values| values.iter().any(|v| !v.is_empty()))
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn is_met(&self, control: &ControlRef<'_>) -> bool {
        let values: Vec<&str> = self
            .depends_on
            .iter()
            .map(|name| control.sibling(name).map(|s| s.as_str()).unwrap_or(""))
            .collect();
        (self.meeting_condition)(&values)
    }
}

impl fmt::Debug for ValidationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationCondition")
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}
