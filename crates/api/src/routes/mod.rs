//! HTTP route handlers.

pub mod groups;
pub mod health;
pub mod schedule;

use axum::body::Bytes;
use domain::DomainError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::extractors::Caller;

/// Decodes a request payload.
///
/// Anonymous callers are rejected before the body is looked at. A missing,
/// malformed or non-object body reads as `{}`, and fields of the wrong type
/// read as absent, so every problem surfaces as the service's own
/// authorization or field error, in the service's order.
pub(crate) fn request_body<T>(caller: &Caller, body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if caller.identity().is_none() {
        return Err(DomainError::Unauthenticated.into());
    }
    Ok(decode_payload(body))
}

fn decode_payload<T>(body: &[u8]) -> T
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            tracing::debug!("Request body is not a JSON object, treating it as empty");
            return T::default();
        }
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not valid JSON, treating it as empty");
            return T::default();
        }
    };
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Request body does not match the payload, treating it as empty");
        T::default()
    })
}
