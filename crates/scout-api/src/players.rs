//! Handlers for `/players` and `/ranking`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players` | Optional `?q=`; adds stats for a signed-in caller |
//! | `POST` | `/players` | Body: a [`PlayerForm`]; 409 on a duplicate name |
//! | `GET`  | `/players/{id}` | Player, comments and the caller's permissions |
//! | `PUT`  | `/players/{id}/note` | Owner or admin |
//! | `PUT`  | `/players/{id}/external-link` | Owner or admin |
//! | `PUT`  | `/players/{id}/links` | Admin |
//! | `POST` | `/players/{id}/like` | Toggles the caller's like |
//! | `GET`  | `/ranking` | By like count, newest first on ties |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use scout_core::{
  Error,
  comment::Comment,
  gate::{Action, PlayerPermissions},
  player::{Likeable, Player, PlayerForm},
  principal::Principal,
  store::DocumentStore,
  views::{self, DashboardStats, Ranked},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, caller::Caller, error::ApiError};

/// Load a player or answer 404.
pub(crate) async fn load_player<S: DocumentStore>(
  store: &S,
  id: Uuid,
) -> Result<Player, ApiError> {
  store
    .get_player(id)
    .await
    .map_err(|e| ApiError::store("get_player", e))?
    .ok_or(ApiError::Core(Error::PlayerNotFound(id)))
}

fn liked_by(principal: Option<&Principal>, item: &impl Likeable) -> bool {
  principal.is_some_and(|p| item.is_liked_by(&p.id))
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub q: String,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
  pub players: Vec<Player>,
  /// Present for a signed-in caller.
  pub stats:   Option<DashboardStats>,
  pub can_add: bool,
}

/// `GET /players[?q=<term>]`
pub async fn list<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Dashboard>, ApiError> {
  let all = state
    .store
    .list_players()
    .await
    .map_err(|e| ApiError::store("list_players", e))?;

  let stats = caller
    .principal()
    .map(|p| views::dashboard_stats(&all, &p.id));
  let players = views::search(&all, &params.q).into_iter().cloned().collect();
  Ok(Json(Dashboard {
    players,
    stats,
    can_add: state.gate().permits(caller.principal(), Action::AddPlayer),
  }))
}

/// `POST /players`
pub async fn create<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(form): Json<PlayerForm>,
) -> Result<impl IntoResponse, ApiError> {
  let player = state
    .mutations
    .create_player(caller.principal(), &form)
    .await?;
  Ok((StatusCode::CREATED, Json(player)))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CommentView {
  #[serde(flatten)]
  pub comment:    Comment,
  pub like_label: String,
  pub liked:      bool,
  pub can_delete: bool,
}

#[derive(Debug, Serialize)]
pub struct PlayerDetail {
  pub player:      Player,
  pub like_label:  String,
  pub liked:       bool,
  pub embed_url:   Option<String>,
  pub permissions: PlayerPermissions,
  pub comments:    Vec<CommentView>,
}

/// `GET /players/{id}`
pub async fn detail<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<PlayerDetail>, ApiError> {
  let player = load_player(state.store.as_ref(), id).await?;
  let comments = state
    .store
    .list_comments(id)
    .await
    .map_err(|e| ApiError::store("list_comments", e))?;

  let principal = caller.principal();
  let comments = comments
    .into_iter()
    .map(|comment| CommentView {
      like_label: views::like_label(comment.like_count()),
      liked: liked_by(principal, &comment),
      can_delete: state.gate().permits(principal, Action::DeleteComment(&comment)),
      comment,
    })
    .collect();

  Ok(Json(PlayerDetail {
    like_label: views::like_label(player.like_count()),
    liked: liked_by(principal, &player),
    embed_url: views::youtube_embed_url(&player.youtube_link),
    permissions: state.gate().player_permissions(principal, &player),
    comments,
    player,
  }))
}

// ─── Field edits ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NoteBody {
  pub note: String,
}

/// `PUT /players/{id}/note`
pub async fn save_note<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<NoteBody>,
) -> Result<StatusCode, ApiError> {
  let player = load_player(state.store.as_ref(), id).await?;
  state
    .mutations
    .save_note(caller.principal(), &player, &body.note)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ExternalLinkBody {
  pub link: String,
}

/// `PUT /players/{id}/external-link`
pub async fn save_external_link<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<ExternalLinkBody>,
) -> Result<StatusCode, ApiError> {
  let player = load_player(state.store.as_ref(), id).await?;
  state
    .mutations
    .save_external_link(caller.principal(), &player, &body.link)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct LinksBody {
  #[serde(default)]
  pub video:    String,
  #[serde(default)]
  pub external: String,
}

/// `PUT /players/{id}/links`
pub async fn save_links<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<LinksBody>,
) -> Result<StatusCode, ApiError> {
  state
    .mutations
    .save_links(caller.principal(), id, &body.video, &body.external)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Likes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LikeState {
  pub liked: bool,
  pub likes: usize,
}

impl LikeState {
  /// The state after a toggle, derived from the pre-toggle document.
  pub fn after_toggle(target: &impl Likeable, liked: bool) -> Self {
    let before = target.like_count();
    Self {
      liked,
      likes: if liked { before + 1 } else { before.saturating_sub(1) },
    }
  }
}

/// `POST /players/{id}/like`
pub async fn toggle_like<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<LikeState>, ApiError> {
  let player = load_player(state.store.as_ref(), id).await?;
  let liked = state
    .mutations
    .toggle_like(caller.principal(), &player)
    .await?;
  Ok(Json(LikeState::after_toggle(&player, liked)))
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

/// `GET /ranking`
pub async fn ranking<S: DocumentStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Ranked>>, ApiError> {
  let players = state
    .store
    .list_players()
    .await
    .map_err(|e| ApiError::store("list_players", e))?;
  Ok(Json(views::ranking(&players)))
}
