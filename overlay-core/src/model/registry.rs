//!
//! `overlay-core/src/model/registry.rs`
//!
//! Shared open/closed bookkeeping for every dialog in the process. The host
//! environment reads it to decide whether background content must be marked
//! inert for accessibility.
//!
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::model::dialog_id::DialogId;

/// Registry slot for one open id.
#[derive(Debug, Clone, Copy)]
struct OpenEntry
{
    /// Position in open order.
    order: u64,
    /// Mounted dialogs currently holding this id open.
    holders: u32,
}

/// Concurrent `DialogId -> open` registry.
///
/// Only open dialogs have an entry; closing removes it, so handles that are
/// torn down never leak. Each entry remembers the order it was opened in,
/// which gives the host a stacking order for [`open_ids`](Self::open_ids).
///
/// Dialogs may share a caller-chosen id, so controller updates are counted:
/// the entry stays until every holder has called
/// [`register_closed`](Self::register_closed).
#[derive(Debug)]
pub struct DialogRegistry
{
    open: DashMap<DialogId, OpenEntry, RandomState>,
    sequence: AtomicU64,
    any_open: watch::Sender<bool>,
}

impl DialogRegistry
{
    #[must_use]
    pub fn new() -> Self
    {
        Self
        {
            open: DashMap::with_capacity_and_hasher(16, RandomState::new()),
            sequence: AtomicU64::new(0),
            any_open: watch::Sender::new(false),
        }
    }

    /// Host-side upsert. `true` makes sure the entry exists (keeping its open
    /// order and holders), `false` removes it regardless of holders.
    pub fn set_open(&self, id: &DialogId, is_open: bool)
    {
        if is_open
        {
            self.open
                .entry(id.clone())
                .or_insert_with(|| self.new_entry());
        }
        else
        {
            self.open.remove(id);
        }

        debug!(dialog = %id, is_open, open_count = self.open.len(), "registry updated");
        self.publish();
    }

    /// One dialog with this id entered its open cycle.
    pub fn register_open(&self, id: &DialogId)
    {
        let holders = self
            .open
            .entry(id.clone())
            .and_modify(|entry| entry.holders += 1)
            .or_insert_with(|| self.new_entry())
            .holders;

        debug!(dialog = %id, holders, open_count = self.open.len(), "dialog registered open");
        self.publish();
    }

    /// One dialog with this id finished closing or was unmounted while open.
    pub fn register_closed(&self, id: &DialogId)
    {
        let removed = self
            .open
            .remove_if_mut(id, |_, entry| {
                entry.holders = entry.holders.saturating_sub(1);
                entry.holders == 0
            })
            .is_some();

        debug!(dialog = %id, removed, open_count = self.open.len(), "dialog registered closed");
        self.publish();
    }

    #[must_use]
    pub fn is_open(&self, id: &DialogId) -> bool
    {
        self.open.contains_key(id)
    }

    #[must_use]
    pub fn is_any_open(&self) -> bool
    {
        !self.open.is_empty()
    }

    #[must_use]
    pub fn open_count(&self) -> usize
    {
        self.open.len()
    }

    /// Open dialogs, oldest first.
    #[must_use]
    pub fn open_ids(&self) -> Vec<DialogId>
    {
        let mut entries: Vec<(u64, DialogId)> = self
            .open
            .iter()
            .map(|entry| (entry.value().order, entry.key().clone()))
            .collect();

        entries.sort_unstable_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, id)| id).collect()
    }

    /// Receiver that observes the "any dialog open" flag. Only actual flips
    /// are published.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool>
    {
        self.any_open.subscribe()
    }

    fn new_entry(&self) -> OpenEntry
    {
        OpenEntry
        {
            order: self.sequence.fetch_add(1, Ordering::Relaxed),
            holders: 1,
        }
    }

    /// Map state is read under the watch lock so racing updates cannot
    /// publish a stale flag last.
    fn publish(&self)
    {
        self.any_open.send_if_modified(|current| {
            let now_open = self.is_any_open();
            if *current == now_open
            {
                return false;
            }
            *current = now_open;
            true
        });
    }
}

impl Default for DialogRegistry
{
    fn default() -> Self
    {
        Self::new()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_set_open_is_an_upsert()
    {
        let registry = DialogRegistry::new();
        let id = DialogId::named("share");

        registry.set_open(&id, true);
        registry.set_open(&id, true);
        assert!(registry.is_open(&id));
        assert_eq!(registry.open_count(), 1);

        registry.set_open(&id, false);
        assert!(!registry.is_open(&id));
        assert!(!registry.is_any_open());

        // closing an unknown id is harmless
        registry.register_closed(&DialogId::named("never-opened"));
        assert_eq!(registry.open_count(), 0);
    }

    #[test]
    fn test_open_ids_follow_open_order()
    {
        let registry = DialogRegistry::new();
        let first = DialogId::named("zeta");
        let second = DialogId::named("alpha");
        let third = DialogId::named("mid");

        registry.register_open(&first);
        registry.register_open(&second);
        registry.register_open(&third);
        // a second holder keeps the original position
        registry.register_open(&first);

        assert_eq!(registry.open_ids(), vec![first, second.clone(), third.clone()]);

        registry.register_closed(&second);
        assert_eq!(registry.open_ids().len(), 2);
        assert!(registry.is_open(&third));
    }

    #[test]
    fn test_shared_id_stays_open_until_last_holder_closes()
    {
        let registry = DialogRegistry::new();
        let id = DialogId::named("share");

        registry.register_open(&id);
        registry.register_open(&id);
        assert_eq!(registry.open_count(), 1);

        registry.register_closed(&id);
        assert!(registry.is_open(&id));
        assert!(registry.is_any_open());

        registry.register_closed(&id);
        assert!(!registry.is_open(&id));
        assert!(!registry.is_any_open());

        // host-side close drops the entry whatever the holder count
        registry.register_open(&id);
        registry.register_open(&id);
        registry.set_open(&id, false);
        assert!(!registry.is_open(&id));
    }

    #[test]
    fn test_published_flag_matches_map_after_concurrent_updates()
    {
        use std::sync::Arc;

        let registry = Arc::new(DialogRegistry::new());
        let rx = registry.subscribe();

        for round in 0..50
        {
            let workers: Vec<_> = (0..4)
                .map(|worker| {
                    let registry = Arc::clone(&registry);
                    std::thread::spawn(move || {
                        let id = DialogId::named(format!("w{worker}"));
                        for _ in 0..100
                        {
                            registry.register_open(&id);
                            registry.register_closed(&id);
                        }
                        // odd rounds leave one dialog open
                        if round % 2 == 1 && worker == 0
                        {
                            registry.register_open(&id);
                        }
                    })
                })
                .collect();

            for worker in workers
            {
                worker.join().unwrap();
            }

            assert_eq!(*rx.borrow(), registry.is_any_open(), "round {round}");
            registry.set_open(&DialogId::named("w0"), false);
        }
    }

    #[tokio::test]
    async fn test_subscribe_sees_any_open_flips()
    {
        let registry = DialogRegistry::new();
        let mut rx = registry.subscribe();
        assert!(!*rx.borrow_and_update());

        let a = DialogId::named("a");
        let b = DialogId::named("b");

        registry.register_open(&a);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        // a second dialog does not flip the flag
        registry.register_open(&b);
        assert!(!rx.has_changed().unwrap());

        registry.register_closed(&a);
        assert!(!rx.has_changed().unwrap());

        registry.register_closed(&b);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow());
    }
}
