//! The calling principal, as forwarded by the authenticating proxy.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use scout_core::{
  identity::hydrate,
  principal::{AuthUser, Principal},
  store::DocumentStore,
};

use crate::{AppState, ApiError};

/// The hydrated principal behind a request, or `None` when anonymous.
///
/// Hydration upserts the profile on first sight, exactly like a sign-in.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Principal>);

impl Caller {
  pub fn principal(&self) -> Option<&Principal> { self.0.as_ref() }
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, ApiError> {
  let Some(value) = headers.get(name) else {
    return Ok(None);
  };
  let value = value
    .to_str()
    .map_err(|_| ApiError::BadRequest(format!("header {name} is not valid text")))?
    .trim();
  Ok((!value.is_empty()).then(|| value.to_owned()))
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: DocumentStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(id) = header_value(&parts.headers, &state.config.user_header)? else {
      return Ok(Caller(None));
    };
    let user = AuthUser {
      id:    id.into(),
      email: header_value(&parts.headers, &state.config.email_header)?,
    };
    Ok(Caller(Some(hydrate(state.store.as_ref(), &user).await)))
  }
}
