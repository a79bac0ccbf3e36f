//! Handlers for `/admin`. Every route is gated on the admin role.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use scout_core::{
  gate::Action,
  mutations::CascadeReport,
  principal::{Principal, PrincipalId},
  store::DocumentStore,
};
use uuid::Uuid;

use crate::{AppState, caller::Caller, error::ApiError};

/// `GET /admin/users`
pub async fn list_users<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Principal>>, ApiError> {
  state.gate().check(caller.principal(), Action::ViewAdminPanel)?;
  let users = state
    .store
    .list_profiles()
    .await
    .map_err(|e| ApiError::store("list_profiles", e))?;
  Ok(Json(users))
}

/// `DELETE /admin/users/{id}`: removes the profile and every owned player.
pub async fn delete_user<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<String>,
) -> Result<Json<CascadeReport>, ApiError> {
  let report = state
    .mutations
    .delete_principal(caller.principal(), &PrincipalId::new(id))
    .await?;
  Ok(Json(report))
}

/// `DELETE /admin/players/{id}`
pub async fn delete_player<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state
    .mutations
    .delete_player(caller.principal(), id)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
