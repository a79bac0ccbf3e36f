//! Handlers for `/players/{id}/comments`.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use scout_core::{Error, comment::Comment, store::DocumentStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  caller::Caller,
  error::ApiError,
  players::{LikeState, load_player},
};

async fn load_comment<S: DocumentStore>(
  store: &S,
  player_id: Uuid,
  comment_id: Uuid,
) -> Result<Comment, ApiError> {
  store
    .get_comment(player_id, comment_id)
    .await
    .map_err(|e| ApiError::store("get_comment", e))?
    .ok_or(ApiError::Core(Error::CommentNotFound(comment_id)))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub text: String,
}

/// `POST /players/{id}/comments`, body: `{"text":"..."}`
pub async fn create<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(player_id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let player = load_player(state.store.as_ref(), player_id).await?;
  let comment = state
    .mutations
    .add_comment(caller.principal(), &player, &body.text)
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `DELETE /players/{id}/comments/{cid}`
pub async fn remove<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path((player_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
  let comment = load_comment(state.store.as_ref(), player_id, comment_id).await?;
  state
    .mutations
    .delete_comment(caller.principal(), &comment)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /players/{id}/comments/{cid}/like`
pub async fn toggle_like<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path((player_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LikeState>, ApiError> {
  let comment = load_comment(state.store.as_ref(), player_id, comment_id).await?;
  let liked = state
    .mutations
    .toggle_like(caller.principal(), &comment)
    .await?;
  Ok(Json(LikeState::after_toggle(&comment, liked)))
}
