#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use beacons_forms::dates::{iso_date_string, pad_number_with_leading_zeros};
use beacons_forms::{validators, FieldSchema, FormSchema, ValidationCondition};
use beacons_kernel_contracts::{FormRecord, SessionContext, SubmissionId};
use beacons_storage::{FormCache, StorageError};

use crate::page_request::{handle_page_request, PageRequestHandler};

pub const HOME_URL: &str = "/";
pub const START_URL: &str = "/register-a-beacon/start";
pub const CHECK_BEACON_DETAILS_URL: &str = "/register-a-beacon/check-beacon-details";
pub const BEACON_INFORMATION_URL: &str = "/register-a-beacon/beacon-information";
pub const ABOUT_BEACON_OWNER_URL: &str = "/register-a-beacon/about-beacon-owner";
pub const BEACON_OWNER_ADDRESS_URL: &str = "/register-a-beacon/beacon-owner-address";
pub const CHECK_YOUR_ANSWERS_URL: &str = "/register-a-beacon/check-your-answers";
pub const APPLICATION_COMPLETE_URL: &str = "/register-a-beacon/application-complete";

pub const MIN_BEACON_DATE_YEAR: i32 = 1980;

/// One form page of the registration wizard.
#[derive(Debug, Clone)]
pub struct WizardPage {
    pub path: &'static str,
    pub next: &'static str,
    pub schema: FormSchema,
    pub transform: Option<fn(FormRecord) -> FormRecord>,
    pub cached_view: Option<fn(FormRecord) -> FormRecord>,
}

impl WizardPage {
    /// Controller for this page. The cache it sees holds only this page's fields of the
    /// submission; other pages' answers are left untouched.
    pub fn handler(&self, cache: Arc<dyn FormCache>) -> PageRequestHandler {
        let scoped: Arc<dyn FormCache> = Arc::new(PageScopedCache::new(cache, &self.schema));
        let schema = self.schema.clone();
        let handler = handle_page_request(scoped, self.next, move |record| schema.bind(record));
        let handler = match self.transform {
            Some(transform) => handler.with_transform(transform),
            None => handler,
        };
        match self.cached_view {
            Some(view) => handler.with_cached_view(view),
            None => handler,
        }
    }
}

pub fn registration_pages() -> Vec<WizardPage> {
    vec![
        WizardPage {
            path: CHECK_BEACON_DETAILS_URL,
            next: BEACON_INFORMATION_URL,
            schema: check_beacon_details_schema(),
            transform: None,
            cached_view: None,
        },
        WizardPage {
            path: BEACON_INFORMATION_URL,
            next: ABOUT_BEACON_OWNER_URL,
            schema: beacon_information_schema(),
            transform: Some(compose_beacon_dates),
            cached_view: Some(pad_beacon_date_parts),
        },
        WizardPage {
            path: ABOUT_BEACON_OWNER_URL,
            next: BEACON_OWNER_ADDRESS_URL,
            schema: about_beacon_owner_schema(),
            transform: None,
            cached_view: None,
        },
        WizardPage {
            path: BEACON_OWNER_ADDRESS_URL,
            next: CHECK_YOUR_ANSWERS_URL,
            schema: beacon_owner_address_schema(),
            transform: None,
            cached_view: None,
        },
    ]
}

pub fn check_beacon_details_schema() -> FormSchema {
    FormSchema::new()
        .field(
            "manufacturer",
            FieldSchema::new().validator(validators::required("Beacon manufacturer is a required field")),
        )
        .field(
            "model",
            FieldSchema::new().validator(validators::required("Beacon model is a required field")),
        )
        .field(
            "hexId",
            FieldSchema::new()
                .validator(validators::required("Beacon HEX ID is a required field"))
                .validator(validators::is_length(
                    "Beacon HEX ID or UIN must be 15 characters long",
                    15,
                ))
                .validator(validators::hexadecimal_string(
                    "Beacon HEX ID or UIN must use numbers 0 to 9 and letters A to F",
                )),
        )
}

pub fn beacon_information_schema() -> FormSchema {
    FormSchema::new()
        .field(
            "manufacturerSerialNumber",
            FieldSchema::new().validator(validators::required(
                "Beacon manufacturer serial number is a required field",
            )),
        )
        .field("chkCode", FieldSchema::new())
        .field(
            "batteryExpiryDate",
            FieldSchema::new()
                .validator(validators::is_valid_date("Enter a correct battery expiry date"))
                .validator(validators::min_date_year(
                    "Battery expiry date must be after 1980",
                    MIN_BEACON_DATE_YEAR,
                ))
                .condition(ValidationCondition::when_any_present([
                    "batteryExpiryDateYear",
                    "batteryExpiryDateMonth",
                ])),
        )
        .field("batteryExpiryDateMonth", FieldSchema::new())
        .field("batteryExpiryDateYear", FieldSchema::new())
        .field(
            "lastServicedDate",
            FieldSchema::new()
                .validator(validators::is_valid_date("Enter a correct last serviced date"))
                .validator(validators::is_in_the_past("Enter a last serviced date in the past"))
                .validator(validators::min_date_year(
                    "Last serviced date must be after 1980",
                    MIN_BEACON_DATE_YEAR,
                ))
                .condition(ValidationCondition::when_any_present([
                    "lastServicedDateYear",
                    "lastServicedDateMonth",
                ])),
        )
        .field("lastServicedDateMonth", FieldSchema::new())
        .field("lastServicedDateYear", FieldSchema::new())
}

pub fn about_beacon_owner_schema() -> FormSchema {
    FormSchema::new()
        .field(
            "beaconOwnerFullName",
            FieldSchema::new().validator(validators::required("Full name is a required field")),
        )
        .field(
            "beaconOwnerTelephoneNumber",
            FieldSchema::new().validator(validators::phone_number(
                "Enter a telephone number, like 01632 960 001 or 07700 900 982",
            )),
        )
        .field(
            "beaconOwnerAlternativeTelephoneNumber",
            FieldSchema::new().validator(validators::phone_number(
                "Enter an alternative telephone number, like 01632 960 001 or 07700 900 982",
            )),
        )
        .field(
            "beaconOwnerEmail",
            FieldSchema::new().validator(validators::email("Email address must be valid")),
        )
}

pub fn beacon_owner_address_schema() -> FormSchema {
    FormSchema::new()
        .field(
            "beaconOwnerAddressLine1",
            FieldSchema::new().validator(validators::required(
                "Building number and street is a required field",
            )),
        )
        .field("beaconOwnerAddressLine2", FieldSchema::new())
        .field(
            "beaconOwnerTownOrCity",
            FieldSchema::new().validator(validators::required("Town or city is a required field")),
        )
        .field("beaconOwnerCounty", FieldSchema::new())
        .field(
            "beaconOwnerPostcode",
            FieldSchema::new().validator(validators::required("Postcode is a required field")),
        )
}

/// Writes `batteryExpiryDate` and `lastServicedDate` from their year/month parts.
pub fn compose_beacon_dates(mut record: FormRecord) -> FormRecord {
    for prefix in ["batteryExpiryDate", "lastServicedDate"] {
        let year = record.value_or_empty(&format!("{prefix}Year")).to_string();
        let month = record.value_or_empty(&format!("{prefix}Month")).to_string();
        record.insert(prefix, iso_date_string(&year, &month));
    }
    record
}

/// Shows cached month and year parts zero-padded, e.g. `4` as `04`.
pub fn pad_beacon_date_parts(mut record: FormRecord) -> FormRecord {
    for prefix in ["batteryExpiryDate", "lastServicedDate"] {
        for (suffix, width) in [("Month", 2), ("Year", 4)] {
            let name = format!("{prefix}{suffix}");
            if let Some(value) = record.get(&name) {
                let padded = pad_number_with_leading_zeros(value, width);
                record.insert(&name, padded);
            }
        }
    }
    record
}

/// Answers shown on the check-your-answers page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckYourAnswersProps {
    pub registration: FormRecord,
    pub show_cookie_banner: bool,
}

pub async fn check_your_answers(
    cache: &dyn FormCache,
    session: &SessionContext,
) -> Result<CheckYourAnswersProps, StorageError> {
    Ok(CheckYourAnswersProps {
        registration: cache.get(&session.submission_id).await?,
        show_cookie_banner: session.show_cookie_banner,
    })
}

/// View of the submission record limited to one page's fields.
///
/// `get` returns only the page's fields. `update` replaces every page field in the
/// submission record, drops submitted keys the page does not own and keeps the rest.
#[derive(Clone)]
pub struct PageScopedCache {
    inner: Arc<dyn FormCache>,
    fields: BTreeSet<String>,
}

impl PageScopedCache {
    pub fn new(inner: Arc<dyn FormCache>, schema: &FormSchema) -> Self {
        Self {
            inner,
            fields: schema.field_names().into_iter().map(str::to_string).collect(),
        }
    }
}

impl std::fmt::Debug for PageScopedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageScopedCache")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FormCache for PageScopedCache {
    async fn get(&self, id: &SubmissionId) -> Result<FormRecord, StorageError> {
        let record = self.inner.get(id).await?;
        Ok(record
            .iter()
            .filter(|(name, _)| self.fields.contains(*name))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }

    async fn update(&self, id: &SubmissionId, record: FormRecord) -> Result<(), StorageError> {
        let mut merged = self.inner.get(id).await?;
        for name in &self.fields {
            merged.remove(name);
        }
        for (name, value) in record.iter() {
            if self.fields.contains(name) {
                merged.insert(name, value);
            }
        }
        self.inner.update(id, merged).await
    }

    async fn remove(&self, id: &SubmissionId) -> Result<(), StorageError> {
        let mut remaining = self.inner.get(id).await?;
        for name in &self.fields {
            remaining.remove(name);
        }
        self.inner.update(id, remaining).await
    }
}
