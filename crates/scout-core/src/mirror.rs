//! Live collection mirrors.
//!
//! A store hands out a [`Subscription`]: a channel of full, ordered snapshots
//! plus a cancel handle. A [`Mirror`] wraps one subscription and keeps the
//! latest snapshot in memory for views to read.
//!
//! Cancellation is tied to ownership. Dropping either value cancels the
//! remote subscription, so a mirror can never outlive the view that holds it.

use tokio::sync::{oneshot, watch};

// ─── Subscription ────────────────────────────────────────────────────────────

/// The receiving end of a store-side snapshot feed.
#[derive(Debug)]
pub struct Subscription<T> {
  snapshots: watch::Receiver<Vec<T>>,
  cancel:    Option<oneshot::Sender<()>>,
}

impl<T> Subscription<T> {
  /// Pair a snapshot receiver with the sender half of the feed's cancel
  /// signal. The feed must stop once that signal fires or its sender drops.
  pub fn new(
    snapshots: watch::Receiver<Vec<T>>,
    cancel: oneshot::Sender<()>,
  ) -> Self {
    Self { snapshots, cancel: Some(cancel) }
  }

  /// Stop the feed now. Equivalent to dropping the subscription.
  pub fn cancel(mut self) { self.signal_cancel(); }

  fn signal_cancel(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      // The feed may already be gone; nothing to do then.
      let _ = cancel.send(());
    }
  }
}

impl<T> Drop for Subscription<T> {
  fn drop(&mut self) { self.signal_cancel(); }
}

// ─── Mirror ──────────────────────────────────────────────────────────────────

/// An in-memory copy of a remote collection, replaced wholesale on every
/// snapshot the feed delivers.
///
/// Order is exactly the order the store declared. Views that need another
/// order (e.g. [`crate::views::ranking`]) derive it without touching the
/// mirror.
#[derive(Debug)]
pub struct Mirror<T> {
  subscription: Subscription<T>,
  items:        Vec<T>,
  revision:     u64,
  live:         bool,
}

impl<T: Clone> Mirror<T> {
  /// Adopt `subscription`, taking its current snapshot as revision 0.
  pub fn new(mut subscription: Subscription<T>) -> Self {
    let items = subscription.snapshots.borrow_and_update().clone();
    Self { subscription, items, revision: 0, live: true }
  }

  pub fn items(&self) -> &[T] { &self.items }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Number of snapshots adopted since the mirror was opened.
  pub fn revision(&self) -> u64 { self.revision }

  /// `false` once the feed has ended; the last snapshot stays readable.
  pub fn is_live(&self) -> bool { self.live }

  pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
    self.items.iter().find(|item| predicate(item))
  }

  /// Adopt the newest snapshot if one arrived. Never waits.
  ///
  /// Intermediate snapshots that arrived between two calls are skipped; only
  /// the latest is observable.
  pub fn sync(&mut self) -> bool {
    match self.subscription.snapshots.has_changed() {
      Ok(true) => {
        self.adopt();
        true
      }
      Ok(false) => false,
      Err(_) => {
        self.live = false;
        false
      }
    }
  }

  /// Wait for the next snapshot and adopt it. Returns `false` when the feed
  /// has ended.
  pub async fn changed(&mut self) -> bool {
    if self.subscription.snapshots.changed().await.is_err() {
      self.live = false;
      return false;
    }
    self.adopt();
    true
  }

  /// Tear the mirror down, cancelling its subscription.
  pub fn close(self) {}

  fn adopt(&mut self) {
    self.items = self.subscription.snapshots.borrow_and_update().clone();
    self.revision += 1;
  }
}
