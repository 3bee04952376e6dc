//! Request body extraction for the create endpoints.
//!
//! Clients post from forms as well as from JSON tooling, so bodies are read
//! leniently: the Content-Type header is not enforced, an empty body is the
//! empty payload (every field missing, so validation reports all of them), and
//! numeric ids may arrive as strings.

use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::error::ApiError;

/// Payload
///
/// JSON body extractor whose failures are `ApiError::Validation`, i.e. a 422
/// with the same `{"error": [...]}` body as any other rejected input.
#[derive(Debug, Clone, Default)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload(T::default()));
        }

        serde_json::from_slice(&bytes).map(Payload).map_err(|e| {
            tracing::debug!("undecodable request body: {}", e);
            ApiError::Validation(vec![format!("Request body is not valid JSON: {e}")])
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// deserialize_lenient_id
///
/// Accepts `5`, `"5"` or `null`. A string that is not a number resolves to no
/// id at all, so it fails the same existence checks as a missing one.
pub fn deserialize_lenient_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    Ok(
        match Option::<NumberOrString<T>>::deserialize(deserializer)? {
            Some(NumberOrString::Number(value)) => Some(value),
            Some(NumberOrString::Text(text)) => text.trim().parse().ok(),
            None => None,
        },
    )
}
