#![forbid(unsafe_code)]

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    #[error("duplicate name '{name}' in {field}")]
    DuplicateName { field: &'static str, name: String },
    #[error("unknown reference '{name}' in {field}")]
    UnknownReference { field: &'static str, name: String },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ContractViolation>;
}
