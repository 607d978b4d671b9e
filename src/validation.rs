use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// Raw JSON request body, parsed and validated only when the handler asks.
///
/// Handlers authorize before they look at the body, so a caller without
/// permission gets 403 even when the payload is malformed.
pub struct JsonBody<T> {
    bytes: Bytes,
    _target: PhantomData<T>,
}

impl<T> JsonBody<T>
where
    T: DeserializeOwned + Validate,
{
    pub fn validated(self) -> Result<T, ApiError> {
        let raw: &[u8] = if self.bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &self.bytes
        };
        let value: T = serde_json::from_slice(raw)
            .map_err(|e| ApiError::BadRequest(format!("JSON parse error - {e}")))?;
        value.validate()?;
        Ok(value)
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self {
            bytes,
            _target: PhantomData,
        })
    }
}

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("This field may not be blank.".into());
        return Err(err);
    }
    Ok(())
}

/// Strips surrounding whitespace from free-text input before it is stored.
pub fn trimmed(value: String) -> String {
    let trimmed_len = value.trim().len();
    if trimmed_len == value.len() {
        value
    } else {
        value.trim().to_string()
    }
}

/// Parses a path id; anything that is not a UUID cannot name a row.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("No {entity} matches the given query.")))
}

#[cfg(test)]
impl<T> JsonBody<T> {
    pub fn from_static(raw: &'static str) -> Self {
        Self {
            bytes: Bytes::from_static(raw.as_bytes()),
            _target: PhantomData,
        }
    }
}
