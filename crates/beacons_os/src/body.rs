#![forbid(unsafe_code)]

use beacons_kernel_contracts::FormRecord;

pub const FORM_BODY_MAX_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BodyParseError {
    #[error("form body is not valid utf-8")]
    NotUtf8,
    #[error("form body exceeds {max} bytes")]
    TooLarge { max: usize },
}

/// Decodes an `application/x-www-form-urlencoded` body into a flat record.
///
/// A repeated key keeps its last value.
pub fn parse_form_body(body: &[u8]) -> Result<FormRecord, BodyParseError> {
    if body.len() > FORM_BODY_MAX_BYTES {
        return Err(BodyParseError::TooLarge {
            max: FORM_BODY_MAX_BYTES,
        });
    }
    std::str::from_utf8(body).map_err(|_| BodyParseError::NotUtf8)?;
    Ok(url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}
