#![forbid(unsafe_code)]

pub mod common;
pub mod form;
pub mod submission;

pub use common::{ContractViolation, Validate};
pub use form::{ErrorSummaryItem, FieldJson, FormJson, FormPageProps, FormRecord, Redirect};
pub use submission::{SessionContext, SubmissionId};
