//! Handlers for `/profile`: the caller's own profile document.

use axum::{Json, extract::State};
use scout_core::{
  Denial,
  principal::{Principal, ProfileForm, Role},
  store::DocumentStore,
};
use serde::Serialize;

use crate::{AppState, caller::Caller, error::ApiError};

#[derive(Debug, Serialize)]
pub struct ProfileView {
  pub profile: Principal,
  pub role:    Role,
  /// Prefill for the profile editor.
  pub form:    ProfileForm,
}

/// `GET /profile`
pub async fn get_own<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
) -> Result<Json<ProfileView>, ApiError> {
  let profile = principal.ok_or(Denial::SignInRequired)?;
  Ok(Json(ProfileView {
    role: state.gate().role(&profile.id),
    form: ProfileForm::from_principal(&profile),
    profile,
  }))
}

/// `PUT /profile`, body: `{"first_name":"..","last_name":"..","phone":".."}`
pub async fn save<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(form): Json<ProfileForm>,
) -> Result<Json<Principal>, ApiError> {
  let saved = state
    .mutations
    .save_profile(caller.principal(), &form)
    .await?;
  Ok(Json(saved))
}
