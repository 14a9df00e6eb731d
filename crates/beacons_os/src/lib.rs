#![forbid(unsafe_code)]

pub mod body;
pub mod page_request;
pub mod pages;
pub mod registration;

pub use page_request::{
    handle_page_request, PageMethod, PageOutcome, PageRequest, PageRequestError,
    PageRequestHandler,
};
pub use registration::{RegistrationApi, RegistrationApiError, SubmitRegistration};
