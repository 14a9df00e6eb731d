#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use crate::{ContractViolation, Validate};

/// Flat, string-keyed form data as submitted by the browser and as held in the form cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FormRecord(BTreeMap<String, String>);

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Missing keys read as the empty string, same as an explicitly blank input.
    pub fn value_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for FormRecord {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldJson {
    pub value: String,
    pub error_messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorSummaryItem {
    pub href: String,
    pub text: String,
}

impl ErrorSummaryItem {
    pub fn for_field(field_id: &str, text: impl Into<String>) -> Self {
        Self {
            href: format!("#{field_id}"),
            text: text.into(),
        }
    }
}

/// The only shape handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormJson {
    pub fields: BTreeMap<String, FieldJson>,
    pub error_summary: Vec<ErrorSummaryItem>,
}

impl FormJson {
    pub fn has_errors(&self) -> bool {
        !self.error_summary.is_empty()
    }
}

impl Validate for FormJson {
    fn validate(&self) -> Result<(), ContractViolation> {
        for item in &self.error_summary {
            if !item.href.starts_with('#') || item.href.len() < 2 {
                return Err(ContractViolation::InvalidValue {
                    field: "form_json.error_summary.href",
                    reason: "must be a #fragment naming a field",
                });
            }
            if item.text.trim().is_empty() {
                return Err(ContractViolation::InvalidValue {
                    field: "form_json.error_summary.text",
                    reason: "must not be empty",
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPageProps {
    pub form: FormJson,
    pub show_cookie_banner: bool,
    pub submission_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub status_code: u16,
    pub destination: String,
}

impl Redirect {
    /// Redirect-after-post: the browser re-issues the destination as a GET.
    pub fn see_other(destination: impl Into<String>) -> Self {
        Self {
            status_code: 303,
            destination: destination.into(),
        }
    }

    pub fn temporary(destination: impl Into<String>) -> Self {
        Self {
            status_code: 307,
            destination: destination.into(),
        }
    }
}

impl Validate for Redirect {
    fn validate(&self) -> Result<(), ContractViolation> {
        if !(300..=399).contains(&self.status_code) {
            return Err(ContractViolation::InvalidValue {
                field: "redirect.status_code",
                reason: "must be a 3xx status",
            });
        }
        if !self.destination.starts_with('/') {
            return Err(ContractViolation::InvalidValue {
                field: "redirect.destination",
                reason: "must be a site-relative path",
            });
        }
        Ok(())
    }
}
