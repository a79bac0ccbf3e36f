//! Busy flags for interactions that are waiting on the store.
//!
//! A [`Busy`] is shared between the view that renders a spinner and the task
//! performing the write. Entering returns an owned [`BusyGuard`] that clears
//! the flag when dropped, so a failed or panicking task never leaves the
//! interaction stuck.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

#[derive(Debug, Clone, Default)]
pub struct Busy(Arc<AtomicBool>);

impl Busy {
  pub fn new() -> Self { Self::default() }

  /// Mark the interaction busy. `None` if it already is.
  pub fn try_enter(&self) -> Option<BusyGuard> {
    self
      .0
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| BusyGuard(Arc::clone(&self.0)))
  }

  pub fn is_busy(&self) -> bool { self.0.load(Ordering::Acquire) }
}

#[derive(Debug)]
#[must_use = "the flag clears as soon as the guard is dropped"]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
  fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn guard_clears_on_drop() {
    let busy = Busy::new();
    let guard = busy.try_enter().unwrap();
    assert!(busy.is_busy());
    drop(guard);
    assert!(!busy.is_busy());
  }

  #[test]
  fn second_entry_is_refused() {
    let busy = Busy::new();
    let _guard = busy.try_enter().unwrap();
    assert!(busy.clone().try_enter().is_none());
  }

  #[tokio::test]
  async fn guard_clears_when_task_fails() {
    let busy = Busy::new();
    let guard = busy.try_enter().unwrap();
    let task = tokio::spawn(async move {
      let _guard = guard;
      Err::<(), _>("store unreachable")
    });
    assert!(task.await.unwrap().is_err());
    assert!(!busy.is_busy());
  }
}
