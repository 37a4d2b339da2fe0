//! Request validation helpers shared by the HTTP handlers.
//!
//! Every failure becomes an `invalid_request` error whose `details` name the
//! offending field and a stable code.

use std::fmt::Display;
use std::str::FromStr;

use actix_web::{HttpRequest, ResponseError, error, web};
use serde_json::json;

use crate::domain::{Amount, Error};

/// Stable machine-readable validation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidId,
    InvalidValue,
    MissingField,
    NegativeAmount,
    MalformedBody,
    MalformedQuery,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::InvalidValue => "invalid_value",
            Self::MissingField => "missing_field",
            Self::NegativeAmount => "invalid_amount",
            Self::MalformedBody => "malformed_body",
            Self::MalformedQuery => "malformed_query",
        }
    }
}

/// Request field name, kept `'static` so details never allocate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

/// `invalid_request` pointing at `field`.
pub(crate) fn field_error(field: FieldName, code: ValidationCode, message: impl Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field.0,
        "code": code.as_str(),
    }))
}

/// Parse an identifier, reporting the raw value on failure.
pub(crate) fn parse_id<T: FromStr>(raw: &str, field: FieldName) -> Result<T, Error> {
    raw.trim().parse().map_err(|_| {
        Error::invalid_request(format!("{} must be a valid UUID", field.0)).with_details(json!({
            "field": field.0,
            "value": raw,
            "code": ValidationCode::InvalidId.as_str(),
        }))
    })
}

/// Parse a list of identifiers, reporting the index of the first bad one.
pub(crate) fn parse_id_list<T: FromStr>(raw: &[String], field: FieldName) -> Result<Vec<T>, Error> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            value.trim().parse().map_err(|_| {
                Error::invalid_request(format!("{} must contain valid UUIDs", field.0))
                    .with_details(json!({
                        "field": field.0,
                        "index": index,
                        "value": value,
                        "code": ValidationCode::InvalidId.as_str(),
                    }))
            })
        })
        .collect()
}

/// Parse an optional enum label through its `FromStr` implementation.
pub(crate) fn parse_label<T>(raw: Option<&str>, field: FieldName) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse()
                .map_err(|err| field_error(field, ValidationCode::InvalidValue, err))
        })
        .transpose()
}

/// Validate a money amount.
pub(crate) fn parse_amount(value: f64, field: FieldName) -> Result<Amount, Error> {
    Amount::new(value).map_err(|err| {
        field_error(
            field,
            ValidationCode::NegativeAmount,
            format!("{}: {err}", field.0),
        )
    })
}

/// Validate an optional money amount.
pub(crate) fn parse_optional_amount(
    value: Option<f64>,
    field: FieldName,
) -> Result<Option<Amount>, Error> {
    value.map(|raw| parse_amount(raw, field)).transpose()
}

fn extractor_error(
    err: impl std::fmt::Debug + Display + 'static,
    code: ValidationCode,
    message: &str,
) -> error::Error {
    let reason = err.to_string();
    let mapped = Error::invalid_request(message).with_details(json!({
        "code": code.as_str(),
        "reason": reason,
    }));
    error::InternalError::from_response(err, mapped.error_response()).into()
}

/// JSON extractor config turning body errors into structured 400 responses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        extractor_error(err, ValidationCode::MalformedBody, "request body is invalid")
    })
}

/// Query extractor config turning parameter errors into structured 400 responses.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        extractor_error(err, ValidationCode::MalformedQuery, "query parameters are invalid")
    })
}
