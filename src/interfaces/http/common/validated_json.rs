//! JSON body extractor that also runs the `validator` rules of the body type.
//!
//! Malformed JSON and failed rules both become `DomainError::Validation`,
//! so they answer through [`ApiError`] like any validation error raised by
//! the booking service.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiError;
use crate::domain::DomainError;

pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                DomainError::Validation(format!("malformed body: {}", rejection.body_text()))
            })?;

        value
            .validate()
            .map_err(|errors| DomainError::Validation(describe(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// `field: message` pairs, sorted by field name.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    if fields.is_empty() {
        return "request body failed validation".to_string();
    }
    fields.sort();
    fields.join("; ")
}
