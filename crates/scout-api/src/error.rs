//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use scout_core::{Denial, Error as CoreError, Invalid};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Shown for every failure the user cannot act on.
const GENERIC_FAILURE: &str = "something went wrong, please try again";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  /// Wrap a failed store read, logging it where it happened.
  pub fn store<E>(op: &'static str, e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    error!(op, error = %e, "store read failed");
    Self::Core(CoreError::Store(Box::new(e)))
  }
}

impl From<Denial> for ApiError {
  fn from(d: Denial) -> Self { Self::Core(d.into()) }
}

impl From<Invalid> for ApiError {
  fn from(i: Invalid) -> Self { Self::Core(i.into()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) => match e {
        CoreError::Denied(Denial::SignInRequired) => StatusCode::UNAUTHORIZED,
        CoreError::Denied(_) => StatusCode::FORBIDDEN,
        CoreError::Invalid(Invalid::DuplicateName(_)) => StatusCode::CONFLICT,
        CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        CoreError::PlayerNotFound(_)
        | CoreError::CommentNotFound(_)
        | CoreError::PrincipalNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::PartialCascade { .. } | CoreError::Store(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    };

    let message = match &self {
      ApiError::Core(CoreError::Denied(d)) => d.to_string(),
      ApiError::Core(CoreError::Invalid(i)) => i.to_string(),
      ApiError::Core(CoreError::PartialCascade { .. } | CoreError::Store(_)) => {
        GENERIC_FAILURE.to_owned()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
