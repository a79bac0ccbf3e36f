//! Integration tests for `SqliteStore` against an in-memory database, and for
//! the core façade, resolver and mirrors driven through it.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use scout_core::{
  Denial, Error, Invalid,
  comment::{Comment, NewComment},
  gate::Gate,
  identity::{IdentityProvider, IdentityResolver, LocalIdentity},
  mirror::{Mirror, Subscription},
  mutations::Mutations,
  player::{LikeTarget, Likeable, NewPlayer, Player, PlayerForm, PlayerPatch},
  principal::{AuthUser, Principal, PrincipalId, ProfileForm, ProfileUpdate, Role},
  store::DocumentStore,
  views,
};
use uuid::Uuid;

use crate::SqliteStore;

const ADMIN: &str = "admin-uid";

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn auth(id: &str) -> AuthUser {
  AuthUser { id: id.into(), email: Some(format!("{id}@example.com")) }
}

fn new_player(name: &str, owner: &str) -> NewPlayer {
  NewPlayer {
    name:            name.into(),
    name_normalized: name.trim().to_lowercase(),
    position:        "CM".into(),
    birth_year:      Some(2007),
    club:            "Altınordu U19".into(),
    country:         "Türkiye".into(),
    note:            String::new(),
    owner_id:        owner.into(),
    owner_name:      String::new(),
    owner_email:     None,
  }
}

fn form(name: &str) -> PlayerForm {
  PlayerForm {
    name: name.into(),
    position: "LW".into(),
    ..PlayerForm::default()
  }
}

/// Wait for the mirror's next snapshot, failing the test if none arrives.
async fn next<T: Clone>(mirror: &mut Mirror<T>) {
  tokio::time::timeout(Duration::from_secs(5), mirror.changed())
    .await
    .expect("snapshot within timeout");
}

// ─── Fixture ─────────────────────────────────────────────────────────────────

struct Fixture {
  store:     Arc<SqliteStore>,
  mutations: Mutations<SqliteStore>,
}

impl Fixture {
  async fn new() -> Self {
    let store = Arc::new(store().await);
    let mutations = Mutations::new(Arc::clone(&store), Gate::new(ADMIN.into()));
    Self { store, mutations }
  }

  /// A signed-in principal, phone-verified if `verified`.
  async fn principal(&self, id: &str, verified: bool) -> Principal {
    let p = self.store.ensure_profile(auth(id)).await.unwrap();
    if !verified {
      return p;
    }
    self
      .store
      .save_profile(ProfileUpdate {
        id:             p.id,
        email:          p.email,
        first_name:     "Deniz".into(),
        last_name:      id.into(),
        phone:          "+905551234567".into(),
        phone_verified: true,
      })
      .await
      .unwrap()
  }
}

// ─── Failing store ───────────────────────────────────────────────────────────

/// Delegates to an in-memory store, except that deleting one chosen player
/// fails as if the connection had dropped.
struct FailingDelete {
  inner:   SqliteStore,
  fail_on: Mutex<Option<Uuid>>,
}

impl FailingDelete {
  async fn new() -> Self { Self { inner: store().await, fail_on: Mutex::new(None) } }

  fn fail_on(&self, id: Uuid) { *self.fail_on.lock().unwrap() = Some(id); }
}

impl DocumentStore for FailingDelete {
  type Error = crate::Error;

  async fn get_profile(&self, id: PrincipalId) -> crate::Result<Option<Principal>> {
    self.inner.get_profile(id).await
  }

  async fn ensure_profile(&self, user: AuthUser) -> crate::Result<Principal> {
    self.inner.ensure_profile(user).await
  }

  async fn save_profile(&self, update: ProfileUpdate) -> crate::Result<Principal> {
    self.inner.save_profile(update).await
  }

  async fn delete_profile(&self, id: PrincipalId) -> crate::Result<bool> {
    self.inner.delete_profile(id).await
  }

  async fn list_profiles(&self) -> crate::Result<Vec<Principal>> {
    self.inner.list_profiles().await
  }

  async fn subscribe_profiles(&self) -> crate::Result<Subscription<Principal>> {
    self.inner.subscribe_profiles().await
  }

  async fn insert_player(&self, input: NewPlayer) -> crate::Result<Player> {
    self.inner.insert_player(input).await
  }

  async fn get_player(&self, id: Uuid) -> crate::Result<Option<Player>> {
    self.inner.get_player(id).await
  }

  async fn list_players(&self) -> crate::Result<Vec<Player>> { self.inner.list_players().await }

  async fn player_name_exists(&self, name_normalized: String) -> crate::Result<bool> {
    self.inner.player_name_exists(name_normalized).await
  }

  async fn players_owned_by(&self, owner: PrincipalId) -> crate::Result<Vec<Player>> {
    self.inner.players_owned_by(owner).await
  }

  async fn update_player(&self, id: Uuid, patch: PlayerPatch) -> crate::Result<bool> {
    self.inner.update_player(id, patch).await
  }

  async fn delete_player(&self, id: Uuid) -> crate::Result<bool> {
    let fail = *self.fail_on.lock().unwrap() == Some(id);
    if fail {
      return Err(tokio_rusqlite::Error::ConnectionClosed.into());
    }
    self.inner.delete_player(id).await
  }

  async fn subscribe_players(&self) -> crate::Result<Subscription<Player>> {
    self.inner.subscribe_players().await
  }

  async fn insert_comment(&self, input: NewComment) -> crate::Result<Comment> {
    self.inner.insert_comment(input).await
  }

  async fn get_comment(
    &self,
    player_id: Uuid,
    comment_id: Uuid,
  ) -> crate::Result<Option<Comment>> {
    self.inner.get_comment(player_id, comment_id).await
  }

  async fn list_comments(&self, player_id: Uuid) -> crate::Result<Vec<Comment>> {
    self.inner.list_comments(player_id).await
  }

  async fn delete_comment(&self, player_id: Uuid, comment_id: Uuid) -> crate::Result<bool> {
    self.inner.delete_comment(player_id, comment_id).await
  }

  async fn subscribe_comments(&self, player_id: Uuid) -> crate::Result<Subscription<Comment>> {
    self.inner.subscribe_comments(player_id).await
  }

  async fn set_like(
    &self,
    target: LikeTarget,
    principal: PrincipalId,
    liked: bool,
  ) -> crate::Result<bool> {
    self.inner.set_like(target, principal, liked).await
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_profile_creates_minimal_record_once() {
  let s = store().await;

  let first = s.ensure_profile(auth("u1")).await.unwrap();
  assert_eq!(first.email.as_deref(), Some("u1@example.com"));
  assert!(first.first_name.is_none());
  assert!(!first.phone_verified);

  let again = s.ensure_profile(auth("u1")).await.unwrap();
  assert_eq!(again, first);
  assert_eq!(s.list_profiles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn save_profile_merges_and_keeps_created_at() {
  let s = store().await;
  let created = s.ensure_profile(auth("u1")).await.unwrap();

  let saved = s
    .save_profile(ProfileUpdate {
      id:             "u1".into(),
      email:          Some("u1@example.com".into()),
      first_name:     "Ece".into(),
      last_name:      "Kaya".into(),
      phone:          "+90555".into(),
      phone_verified: true,
    })
    .await
    .unwrap();

  assert_eq!(saved.created_at, created.created_at);
  assert!(saved.updated_at >= created.updated_at);
  assert_eq!(saved.full_name(), "Ece Kaya");
  assert_eq!(s.get_profile("u1".into()).await.unwrap(), Some(saved));
}

#[tokio::test]
async fn get_missing_profile_returns_none() {
  let s = store().await;
  assert!(s.get_profile("ghost".into()).await.unwrap().is_none());
  assert!(!s.delete_profile("ghost".into()).await.unwrap());
}

// ─── Players ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_player() {
  let s = store().await;
  let player = s.insert_player(new_player("Ali Yılmaz", "u1")).await.unwrap();

  assert!(player.liked_by.is_empty());
  assert!(player.youtube_link.is_empty());
  assert!(player.transfermarkt_link.is_empty());
  assert_eq!(s.get_player(player.id).await.unwrap(), Some(player));
}

#[tokio::test]
async fn get_missing_player_returns_none() {
  let s = store().await;
  assert!(s.get_player(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn players_are_listed_newest_first() {
  let s = store().await;
  for name in ["first", "second", "third"] {
    s.insert_player(new_player(name, "u1")).await.unwrap();
  }
  let names: Vec<_> = s
    .list_players()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(names, ["third", "second", "first"]);
}

#[tokio::test]
async fn name_exists_matches_normalized_name() {
  let s = store().await;
  s.insert_player(new_player("Ali Yılmaz", "u1")).await.unwrap();

  assert!(s.player_name_exists("ali yılmaz".into()).await.unwrap());
  assert!(!s.player_name_exists("ali".into()).await.unwrap());
}

#[tokio::test]
async fn update_player_patches_fields() {
  let s = store().await;
  let player = s.insert_player(new_player("Ali", "u1")).await.unwrap();

  assert!(
    s.update_player(player.id, PlayerPatch::Note("quick feet".into()))
      .await
      .unwrap()
  );
  assert!(
    s.update_player(player.id, PlayerPatch::Links {
      video:    "https://youtu.be/abc".into(),
      external: "https://www.transfermarkt.com/ali".into(),
    })
    .await
    .unwrap()
  );

  let updated = s.get_player(player.id).await.unwrap().unwrap();
  assert_eq!(updated.note, "quick feet");
  assert_eq!(updated.youtube_link, "https://youtu.be/abc");
  assert_eq!(updated.transfermarkt_link, "https://www.transfermarkt.com/ali");

  assert!(
    !s.update_player(Uuid::new_v4(), PlayerPatch::Note("x".into()))
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn deleting_player_orphans_comments() {
  let s = store().await;
  let player = s.insert_player(new_player("Ali", "u1")).await.unwrap();
  s.insert_comment(NewComment {
    player_id:   player.id,
    text:        "good first touch".into(),
    author_id:   "u2".into(),
    author_name: "u2@example.com".into(),
  })
  .await
  .unwrap();

  assert!(s.delete_player(player.id).await.unwrap());
  assert!(!s.delete_player(player.id).await.unwrap());
  assert_eq!(s.list_comments(player.id).await.unwrap().len(), 1);
}

// ─── Likes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_like_is_idempotent_in_both_directions() {
  let s = store().await;
  let player = s.insert_player(new_player("Ali", "u1")).await.unwrap();
  let target = player.like_target();

  for _ in 0..2 {
    assert!(s.set_like(target, "fan".into(), true).await.unwrap());
  }
  let liked = s.get_player(player.id).await.unwrap().unwrap();
  assert_eq!(liked.like_count(), 1);
  assert!(liked.is_liked_by(&"fan".into()));

  for _ in 0..2 {
    assert!(s.set_like(target, "fan".into(), false).await.unwrap());
  }
  assert_eq!(s.get_player(player.id).await.unwrap().unwrap().like_count(), 0);
}

#[tokio::test]
async fn set_like_on_missing_target_reports_absence() {
  let s = store().await;
  let target = LikeTarget::Comment {
    player_id:  Uuid::new_v4(),
    comment_id: Uuid::new_v4(),
  };
  assert!(!s.set_like(target, "fan".into(), true).await.unwrap());
}

#[tokio::test]
async fn comment_likes_are_separate_from_player_likes() {
  let s = store().await;
  let player = s.insert_player(new_player("Ali", "u1")).await.unwrap();
  let comment = s
    .insert_comment(NewComment {
      player_id:   player.id,
      text:        "strong left foot".into(),
      author_id:   "u2".into(),
      author_name: "u2@example.com".into(),
    })
    .await
    .unwrap();

  assert!(s.set_like(comment.like_target(), "fan".into(), true).await.unwrap());

  let stored = s.get_comment(player.id, comment.id).await.unwrap().unwrap();
  assert_eq!(stored.like_count(), 1);
  assert_eq!(s.get_player(player.id).await.unwrap().unwrap().like_count(), 0);
}

// ─── Mirrors ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn player_mirror_follows_writes() {
  let s = store().await;
  s.insert_player(new_player("old", "u1")).await.unwrap();

  let mut mirror = Mirror::new(s.subscribe_players().await.unwrap());
  assert_eq!(mirror.len(), 1);

  let fresh = s.insert_player(new_player("new", "u1")).await.unwrap();
  next(&mut mirror).await;
  assert_eq!(mirror.items()[0].id, fresh.id);
  assert_eq!(mirror.len(), 2);

  s.delete_player(fresh.id).await.unwrap();
  next(&mut mirror).await;
  assert_eq!(mirror.len(), 1);
}

#[tokio::test]
async fn comment_mirrors_are_scoped_to_their_player() {
  let s = store().await;
  let a = s.insert_player(new_player("A", "u1")).await.unwrap();
  let b = s.insert_player(new_player("B", "u1")).await.unwrap();

  let mut mirror_a = Mirror::new(s.subscribe_comments(a.id).await.unwrap());
  let mut mirror_b = Mirror::new(s.subscribe_comments(b.id).await.unwrap());

  s.insert_comment(NewComment {
    player_id:   a.id,
    text:        "wins every duel".into(),
    author_id:   "u2".into(),
    author_name: "u2@example.com".into(),
  })
  .await
  .unwrap();

  next(&mut mirror_a).await;
  assert_eq!(mirror_a.len(), 1);
  tokio::time::sleep(Duration::from_millis(50)).await;
  assert!(!mirror_b.sync());
  assert!(mirror_b.is_empty());
}

#[tokio::test]
async fn dropping_a_mirror_leaves_others_running() {
  let s = store().await;
  let first = Mirror::new(s.subscribe_players().await.unwrap());
  let mut second = Mirror::new(s.subscribe_players().await.unwrap());
  drop(first);

  s.insert_player(new_player("Ali", "u1")).await.unwrap();
  next(&mut second).await;
  assert_eq!(second.len(), 1);
}

#[tokio::test]
async fn profile_mirror_sees_sign_ups() {
  let s = store().await;
  let mut mirror = Mirror::new(s.subscribe_profiles().await.unwrap());
  assert!(mirror.is_empty());

  s.ensure_profile(auth("u1")).await.unwrap();
  next(&mut mirror).await;
  assert_eq!(mirror.items()[0].id, PrincipalId::new("u1"));
}

// ─── Façade ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_name_is_rejected_after_normalization() {
  let f = Fixture::new().await;
  let p = f.principal("u1", true).await;

  f.mutations.create_player(Some(&p), &form("Ali Yılmaz")).await.unwrap();
  let err = f
    .mutations
    .create_player(Some(&p), &form("ali yılmaz "))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Invalid(Invalid::DuplicateName(_))));
  assert_eq!(f.store.list_players().await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_player_denormalizes_owner() {
  let f = Fixture::new().await;
  let p = f.principal("u1", true).await;

  let player = f.mutations.create_player(Some(&p), &form("  Mert  ")).await.unwrap();
  assert_eq!(player.name, "Mert");
  assert_eq!(player.owner_id, p.id);
  assert_eq!(player.owner_name, "Deniz u1");
  assert_eq!(player.owner_email.as_deref(), Some("u1@example.com"));
}

#[tokio::test]
async fn unverified_principal_cannot_add_like_or_comment() {
  let f = Fixture::new().await;
  let owner = f.principal("owner", true).await;
  let player = f.mutations.create_player(Some(&owner), &form("Ali")).await.unwrap();
  let fresh = f.principal("fresh", false).await;

  let denied = |e: Error| matches!(e, Error::Denied(Denial::PhoneNotVerified));
  assert!(denied(f.mutations.create_player(Some(&fresh), &form("Can")).await.unwrap_err()));
  assert!(denied(f.mutations.toggle_like(Some(&fresh), &player).await.unwrap_err()));
  assert!(denied(
    f.mutations
      .add_comment(Some(&fresh), &player, "nice")
      .await
      .unwrap_err()
  ));
  assert!(matches!(
    f.mutations.toggle_like(None, &player).await.unwrap_err(),
    Error::Denied(Denial::SignInRequired)
  ));
}

#[tokio::test]
async fn toggling_a_like_twice_restores_the_set() {
  let f = Fixture::new().await;
  let p = f.principal("u1", true).await;
  let player = f.mutations.create_player(Some(&p), &form("Ali")).await.unwrap();
  let before = player.liked_by.clone();

  assert!(f.mutations.toggle_like(Some(&p), &player).await.unwrap());
  let liked = f.store.get_player(player.id).await.unwrap().unwrap();
  assert!(liked.is_liked_by(&p.id));

  assert!(!f.mutations.toggle_like(Some(&p), &liked).await.unwrap());
  let after = f.store.get_player(player.id).await.unwrap().unwrap();
  assert_eq!(after.liked_by, before);
}

#[tokio::test]
async fn comments_enforce_length_and_record_author() {
  let f = Fixture::new().await;
  let p = f.principal("u1", true).await;
  let player = f.mutations.create_player(Some(&p), &form("Ali")).await.unwrap();

  assert!(matches!(
    f.mutations.add_comment(Some(&p), &player, "hi").await.unwrap_err(),
    Error::Invalid(Invalid::CommentTooShort { min: 3 })
  ));
  let comment = f.mutations.add_comment(Some(&p), &player, " hey ").await.unwrap();
  assert_eq!(comment.text, "hey");
  assert_eq!(comment.author_name, "u1@example.com");
  assert_eq!(f.store.list_comments(player.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn comment_deletion_is_author_or_admin() {
  let f = Fixture::new().await;
  let author = f.principal("author", true).await;
  let other = f.principal("other", true).await;
  let admin = f.principal(ADMIN, false).await;
  let player = f.mutations.create_player(Some(&author), &form("Ali")).await.unwrap();

  let first = f.mutations.add_comment(Some(&author), &player, "one").await.unwrap();
  let second = f.mutations.add_comment(Some(&author), &player, "two").await.unwrap();

  assert!(matches!(
    f.mutations.delete_comment(Some(&other), &first).await.unwrap_err(),
    Error::Denied(Denial::NotPermitted)
  ));
  f.mutations.delete_comment(Some(&author), &first).await.unwrap();
  f.mutations.delete_comment(Some(&admin), &second).await.unwrap();
  assert!(f.store.list_comments(player.id).await.unwrap().is_empty());
  assert!(matches!(
    f.mutations.delete_comment(Some(&admin), &second).await.unwrap_err(),
    Error::CommentNotFound(_)
  ));
}

#[tokio::test]
async fn note_editing_is_owner_or_admin() {
  let f = Fixture::new().await;
  let owner = f.principal("owner", true).await;
  let other = f.principal("other", true).await;
  let admin = f.principal(ADMIN, false).await;
  let player = f.mutations.create_player(Some(&owner), &form("Ali")).await.unwrap();

  for intruder in [None, Some(&other)] {
    assert!(f.mutations.save_note(intruder, &player, "mine now").await.is_err());
  }
  f.mutations.save_note(Some(&owner), &player, " sharp runner ").await.unwrap();
  f.mutations
    .save_external_link(Some(&admin), &player, "https://www.transfermarkt.com/ali")
    .await
    .unwrap();

  let stored = f.store.get_player(player.id).await.unwrap().unwrap();
  assert_eq!(stored.note, "sharp runner");
  assert_eq!(stored.transfermarkt_link, "https://www.transfermarkt.com/ali");
}

#[tokio::test]
async fn video_links_are_admin_only() {
  let f = Fixture::new().await;
  let owner = f.principal("owner", true).await;
  let admin = f.principal(ADMIN, false).await;
  let player = f.mutations.create_player(Some(&owner), &form("Ali")).await.unwrap();

  assert!(matches!(
    f.mutations
      .save_links(Some(&owner), player.id, "https://youtu.be/x", "")
      .await
      .unwrap_err(),
    Error::Denied(Denial::NotPermitted)
  ));
  f.mutations
    .save_links(Some(&admin), player.id, "https://youtu.be/x", "")
    .await
    .unwrap();
  let stored = f.store.get_player(player.id).await.unwrap().unwrap();
  assert_eq!(stored.youtube_link, "https://youtu.be/x");
}

#[tokio::test]
async fn delete_player_is_admin_only() {
  let f = Fixture::new().await;
  let owner = f.principal("owner", true).await;
  let admin = f.principal(ADMIN, false).await;
  let player = f.mutations.create_player(Some(&owner), &form("Ali")).await.unwrap();

  assert!(f.mutations.delete_player(Some(&owner), player.id).await.is_err());
  f.mutations.delete_player(Some(&admin), player.id).await.unwrap();
  assert!(matches!(
    f.mutations.delete_player(Some(&admin), player.id).await.unwrap_err(),
    Error::PlayerNotFound(_)
  ));
}

#[tokio::test]
async fn deleting_a_principal_removes_exactly_their_players() {
  let f = Fixture::new().await;
  let doomed = f.principal("doomed", true).await;
  let keeper = f.principal("keeper", true).await;
  let admin = f.principal(ADMIN, false).await;

  for name in ["A", "B", "C"] {
    f.mutations.create_player(Some(&doomed), &form(name)).await.unwrap();
  }
  let kept = f.mutations.create_player(Some(&keeper), &form("D")).await.unwrap();

  let report = f
    .mutations
    .delete_principal(Some(&admin), &doomed.id)
    .await
    .unwrap();
  assert!(report.profile_deleted);
  assert_eq!(report.players_deleted, 3);

  let remaining = f.store.list_players().await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].id, kept.id);
  assert!(f.store.get_profile(doomed.id.clone()).await.unwrap().is_none());
  assert!(f.store.get_profile(keeper.id.clone()).await.unwrap().is_some());
}

#[tokio::test]
async fn failed_cascade_delete_reports_partial_failure() {
  let store = Arc::new(FailingDelete::new().await);
  let mutations = Mutations::new(Arc::clone(&store), Gate::new(ADMIN.into()));

  let owner = store.inner.ensure_profile(auth("doomed")).await.unwrap();
  let owner = store
    .inner
    .save_profile(ProfileUpdate {
      id:             owner.id,
      email:          owner.email,
      first_name:     "Deniz".into(),
      last_name:      "doomed".into(),
      phone:          "+905551234567".into(),
      phone_verified: true,
    })
    .await
    .unwrap();
  let admin = store.inner.ensure_profile(auth(ADMIN)).await.unwrap();

  let stuck = mutations.create_player(Some(&owner), &form("A")).await.unwrap();
  let gone = mutations.create_player(Some(&owner), &form("B")).await.unwrap();
  let kept = store.inner.insert_player(new_player("C", "keeper")).await.unwrap();
  store.fail_on(stuck.id);

  let err = mutations
    .delete_principal(Some(&admin), &owner.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PartialCascade { attempted: 2, failed: 1 }), "{err:?}");
  assert!(!err.is_user_facing());

  // Nothing is rolled back: the profile and the other player stay deleted.
  assert!(store.inner.get_profile(owner.id.clone()).await.unwrap().is_none());
  assert!(store.inner.get_player(gone.id).await.unwrap().is_none());
  assert!(store.inner.get_player(stuck.id).await.unwrap().is_some());
  assert!(store.inner.get_player(kept.id).await.unwrap().is_some());
}

#[tokio::test]
async fn store_failure_surfaces_as_store_error() {
  let store = Arc::new(FailingDelete::new().await);
  let mutations = Mutations::new(Arc::clone(&store), Gate::new(ADMIN.into()));
  let admin = store.inner.ensure_profile(auth(ADMIN)).await.unwrap();
  let player = store.inner.insert_player(new_player("Ali", "owner")).await.unwrap();
  store.fail_on(player.id);

  let err = mutations.delete_player(Some(&admin), player.id).await.unwrap_err();
  assert!(matches!(err, Error::Store(_)), "{err:?}");
  assert!(!err.is_user_facing());
}

#[tokio::test]
async fn only_admin_may_cascade_delete() {
  let f = Fixture::new().await;
  let member = f.principal("member", true).await;
  assert!(matches!(
    f.mutations
      .delete_principal(Some(&member), &"someone".into())
      .await
      .unwrap_err(),
    Error::Denied(Denial::NotPermitted)
  ));
}

#[tokio::test]
async fn profile_save_derives_verification_from_phone() {
  let f = Fixture::new().await;
  let p = f.principal("u1", false).await;

  let blank = ProfileForm {
    first_name: "Ece".into(),
    last_name:  "Kaya".into(),
    phone:      "   ".into(),
  };
  let saved = f.mutations.save_profile(Some(&p), &blank).await.unwrap();
  assert!(!saved.phone_verified);
  assert!(saved.phone.is_empty());

  let with_phone = ProfileForm { phone: " +905550001122 ".into(), ..blank };
  let saved = f.mutations.save_profile(Some(&p), &with_phone).await.unwrap();
  assert!(saved.phone_verified);
  assert_eq!(saved.phone, "+905550001122");

  let nameless = ProfileForm { first_name: " ".into(), ..with_phone };
  assert!(matches!(
    f.mutations.save_profile(Some(&p), &nameless).await.unwrap_err(),
    Error::Invalid(Invalid::MissingProfileName)
  ));
}

// ─── Resolver + views ────────────────────────────────────────────────────────

#[tokio::test]
async fn resolver_hydrates_from_store_and_adopts_saves() {
  let f = Fixture::new().await;
  let provider = LocalIdentity::new(auth("u1"));
  let mut resolver =
    IdentityResolver::new(Arc::clone(&f.store), Gate::new(ADMIN.into()), &provider).await;
  assert!(resolver.principal().is_none());

  provider.sign_in().await.unwrap();
  assert!(resolver.refresh().await);
  assert_eq!(resolver.role(), Some(Role::Member));
  assert!(!resolver.is_verified());
  assert!(f.store.get_profile("u1".into()).await.unwrap().is_some());

  let saved = f
    .mutations
    .save_profile(resolver.principal(), &ProfileForm {
      first_name: "Ece".into(),
      last_name:  "Kaya".into(),
      phone:      "+90555".into(),
    })
    .await
    .unwrap();
  resolver.adopt_profile(saved);
  assert!(resolver.is_verified());

  provider.sign_out().await.unwrap();
  assert!(resolver.refresh().await);
  assert!(resolver.principal().is_none());
}

#[tokio::test]
async fn open_session_survives_cascade_delete_until_next_sign_in() {
  let f = Fixture::new().await;
  let doomed = f.principal("doomed", true).await;
  let admin = f.principal(ADMIN, false).await;
  let provider = LocalIdentity::signed_in(auth("doomed"));
  let mut resolver =
    IdentityResolver::new(Arc::clone(&f.store), Gate::new(ADMIN.into()), &provider).await;
  assert!(resolver.is_verified());

  f.mutations.delete_principal(Some(&admin), &doomed.id).await.unwrap();

  // The cached principal stays verified and may still write.
  assert!(!resolver.refresh().await);
  assert!(resolver.is_verified());
  f.mutations
    .create_player(resolver.principal(), &form("After"))
    .await
    .unwrap();

  // A fresh sign-in hydrates a new minimal, unverified profile.
  provider.sign_out().await.unwrap();
  assert!(resolver.refresh().await);
  provider.sign_in().await.unwrap();
  assert!(resolver.refresh().await);
  assert!(!resolver.is_verified());
  assert!(f.store.get_profile(doomed.id).await.unwrap().is_some());
}

#[tokio::test]
async fn ranking_follows_the_mirror() {
  let f = Fixture::new().await;
  let p = f.principal("u1", true).await;
  let fans = [f.principal("fan1", true).await, f.principal("fan2", true).await];

  let older = f.mutations.create_player(Some(&p), &form("Older")).await.unwrap();
  let newer = f.mutations.create_player(Some(&p), &form("Newer")).await.unwrap();

  let mut mirror = Mirror::new(f.store.subscribe_players().await.unwrap());
  let names = |m: &Mirror<Player>| -> Vec<String> {
    views::ranking(m.items()).into_iter().map(|r| r.player.name).collect()
  };
  assert_eq!(names(&mirror), ["Newer", "Older"]);

  for fan in &fans {
    f.mutations.toggle_like(Some(fan), &older).await.unwrap();
  }
  while mirror.find(|pl| pl.id == older.id).map(|pl| pl.like_count()) != Some(2) {
    next(&mut mirror).await;
  }
  assert_eq!(names(&mirror), ["Older", "Newer"]);
  assert_eq!(
    views::dashboard_stats(mirror.items(), &p.id),
    views::DashboardStats { players: 2, likes: 2 }
  );
  assert_eq!(mirror.items()[0].id, newer.id);
}
