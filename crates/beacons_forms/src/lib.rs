#![forbid(unsafe_code)]

pub mod control;
pub mod dates;
pub mod form_manager;
pub mod schema;
pub mod validation;
pub mod validators;

pub use control::{
    Control, ControlId, ControlRef, ControlTree, ControlValue, ErrorSummaryEntry, FieldManager,
    FormGroupControl,
};
pub use form_manager::FormManager;
pub use schema::{FieldSchema, FormSchema, SchemaEntry};
pub use validation::{ValidationCondition, ValidationRule};
