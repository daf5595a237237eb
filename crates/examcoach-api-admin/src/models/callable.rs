//! Callable envelope: `{"data": ...}` in, `{"result": ...}` out.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ApiAdminError;

/// Extractor for the `data` member of a callable request body.
///
/// Only JSON syntax is checked here. The payload is kept as a raw value so
/// handlers can authorize the caller before decoding it with
/// [`Callable::decode`]; a mistyped payload must not mask an authorization
/// failure.
#[derive(Debug, Clone, Default)]
pub struct Callable(pub Value);

#[async_trait]
impl<S> FromRequest<S> for Callable
where
    S: Send + Sync,
{
    type Rejection = ApiAdminError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiAdminError::InvalidBody(rejection.body_text()))?;

        let data = match body {
            Value::Object(mut envelope) => envelope.remove("data").unwrap_or(Value::Null),
            other => other,
        };
        Ok(Callable(data))
    }
}

impl Callable {
    /// Decode the payload. `null` or a missing `data` yields `T::default()`.
    pub fn decode<T>(self) -> Result<T, ApiAdminError>
    where
        T: DeserializeOwned + Default,
    {
        if self.0.is_null() {
            return Ok(T::default());
        }
        serde_json::from_value(self.0)
            .map_err(|e| ApiAdminError::InvalidBody(format!("data: {e}")))
    }
}

/// Success body of a callable: `{"result": T}`.
#[derive(Debug, Clone, Serialize)]
pub struct CallableResponse<T> {
    /// Operation result.
    pub result: T,
}

impl<T> CallableResponse<T> {
    /// Wrap a result.
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

impl<T: Serialize> IntoResponse for CallableResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
