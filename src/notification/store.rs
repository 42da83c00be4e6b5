// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The process-wide list of pending notifications.
//!
//! A [`NotificationStore`] is a cheap handle; clones share the same list. Every
//! write swaps in a fresh [`Snapshot`], so a reader holding one never observes a
//! partially updated list. Subscribers are called synchronously, after the write
//! lock is released, with the snapshot the write produced.
//!
//! Session changes call [`NotificationStore::clear`], which bumps the
//! [`Generation`]. Writers that started under an older generation (a fetch that
//! was in flight during a logout, say) are turned away.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use log::{debug, warn};
use parking_lot::RwLock;

use super::{NotificationId, NotificationRecord};

pub(crate) type Snapshot = Arc<[NotificationRecord]>;

type Handler = Arc<dyn Fn(&Snapshot) + Send + Sync>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Generation(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SubscriptionId(u64);

struct State {
    generation: Generation,
    records: Snapshot,
}

struct Shared {
    state: RwLock<State>,
    subscribers: RwLock<Vec<(SubscriptionId, Handler)>>,
    next_subscription: AtomicU64,
}

#[derive(Clone)]
pub(crate) struct NotificationStore {
    shared: Arc<Shared>,
}

/// A record taken out of the list by an optimistic update, kept around so the
/// update can be undone if the server refuses it.
#[derive(Debug)]
pub(crate) struct Taken {
    generation: Generation,
    index: usize,
    record: NotificationRecord,
}

impl Taken {
    pub(crate) const fn record(&self) -> &NotificationRecord {
        &self.record
    }
}

impl NotificationStore {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State {
                    generation: Generation(0),
                    records: Arc::from(Vec::new()),
                }),
                subscribers: RwLock::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn generation(&self) -> Generation {
        self.shared.state.read().generation
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.shared.state.read().records)
    }

    pub(crate) fn len(&self) -> usize {
        self.shared.state.read().records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The friend requests among the pending records, in list order.
    pub(crate) fn friend_requests(&self) -> Vec<NotificationRecord> {
        self.snapshot()
            .iter()
            .filter(|record| record.is_friend_request())
            .cloned()
            .collect()
    }

    /// Replaces the whole list with what the server returned, unless the
    /// session changed since `issued_at` was read. Later duplicates of an
    /// identifier are dropped. Returns whether the write happened.
    pub(crate) fn replace(&self, issued_at: Generation, records: Vec<NotificationRecord>) -> bool {
        let mut seen = HashSet::with_capacity(records.len());
        let records: Vec<_> = records
            .into_iter()
            .filter(|record| {
                let fresh = seen.insert(record.id.clone());
                if !fresh {
                    warn!("Ignoring duplicate notification {}", record.id);
                }
                fresh
            })
            .collect();

        let snapshot = {
            let mut state = self.shared.state.write();
            if state.generation != issued_at {
                debug!(
                    "Discarding notifications requested under {:?}; store is at {:?}",
                    issued_at, state.generation
                );
                return false;
            }
            state.records = Arc::from(records);
            Arc::clone(&state.records)
        };

        self.notify(&snapshot);
        true
    }

    /// Empties the list and starts a new generation.
    pub(crate) fn clear(&self) {
        let snapshot = {
            let mut state = self.shared.state.write();
            state.generation = Generation(state.generation.0.wrapping_add(1));
            state.records = Arc::from(Vec::new());
            Arc::clone(&state.records)
        };

        self.notify(&snapshot);
    }

    /// Removes a record ahead of the server confirming it.
    pub(crate) fn take(&self, id: &NotificationId) -> Option<Taken> {
        let (taken, snapshot) = {
            let mut state = self.shared.state.write();
            let index = state.records.iter().position(|record| &record.id == id)?;
            let mut records = state.records.to_vec();
            let record = records.remove(index);
            state.records = Arc::from(records);
            (
                Taken {
                    generation: state.generation,
                    index,
                    record,
                },
                Arc::clone(&state.records),
            )
        };

        self.notify(&snapshot);
        Some(taken)
    }

    /// Puts a taken record back where it was. Nothing happens if the session
    /// changed in the meantime or a fetch already brought the record back.
    pub(crate) fn restore(&self, taken: Taken) -> bool {
        let snapshot = {
            let mut state = self.shared.state.write();
            if state.generation != taken.generation
                || state.records.iter().any(|record| record.id == taken.record.id)
            {
                return false;
            }
            let mut records = state.records.to_vec();
            records.insert(taken.index.min(records.len()), taken.record);
            state.records = Arc::from(records);
            Arc::clone(&state.records)
        };

        self.notify(&snapshot);
        true
    }

    /// Sets the read flag on a record and returns the previous value.
    pub(crate) fn set_read(&self, id: &NotificationId, read: bool) -> Option<bool> {
        let (previous, snapshot) = {
            let mut state = self.shared.state.write();
            let mut records = state.records.to_vec();
            let record = records.iter_mut().find(|record| &record.id == id)?;
            let previous = record.read;
            record.read = read;
            state.records = Arc::from(records);
            (previous, Arc::clone(&state.records))
        };

        self.notify(&snapshot);
        Some(previous)
    }

    pub(crate) fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(
            self.shared
                .next_subscription
                .fetch_add(1, Ordering::Relaxed),
        );
        self.shared.subscribers.write().push((id, Arc::new(handler)));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.shared.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(candidate, _)| *candidate != id);
        subscribers.len() != before
    }

    fn notify(&self, snapshot: &Snapshot) {
        // Handlers may subscribe or unsubscribe, so call them on a copy.
        let handlers: Vec<_> = self
            .shared
            .subscribers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(snapshot);
        }
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use crate::notification::NotificationKind;

    use super::*;

    fn record(id: &str, kind: NotificationKind) -> NotificationRecord {
        NotificationRecord::fixture(id, kind)
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn starts_empty() {
        let store = NotificationStore::new();
        assert!(store.is_empty());
        assert!(store.friend_requests().is_empty());
    }

    #[test]
    fn replace_keeps_received_order() {
        let store = NotificationStore::new();
        assert!(store.replace(
            store.generation(),
            vec![
                record("b", NotificationKind::System),
                record("a", NotificationKind::FriendRequest),
                record("c", NotificationKind::FriendRequest),
            ],
        ));

        assert_eq!(ids(&store.snapshot()), ["b", "a", "c"]);
        let friend_ids: Vec<_> = store
            .friend_requests()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(friend_ids, [NotificationId::from("a"), NotificationId::from("c")]);
    }

    #[test]
    fn replace_drops_duplicate_ids() {
        let store = NotificationStore::new();
        let mut second = record("1", NotificationKind::System);
        second.read = true;
        _ = store.replace(
            store.generation(),
            vec![record("1", NotificationKind::FriendRequest), second],
        );

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].kind, NotificationKind::FriendRequest);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let store = NotificationStore::new();
        let issued_at = store.generation();
        store.clear();

        assert!(!store.replace(issued_at, vec![record("1", NotificationKind::System)]));
        assert!(store.is_empty());
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let store = NotificationStore::new();
        _ = store.replace(store.generation(), vec![record("1", NotificationKind::System)]);
        let before = store.snapshot();

        store.clear();

        assert_eq!(ids(&before), ["1"]);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn take_and_restore_preserve_position() {
        let store = NotificationStore::new();
        _ = store.replace(
            store.generation(),
            vec![
                record("1", NotificationKind::System),
                record("2", NotificationKind::FriendRequest),
                record("3", NotificationKind::System),
            ],
        );

        let taken = store.take(&"2".into()).expect("record 2 is pending");
        assert_eq!(taken.record().id.as_str(), "2");
        assert_eq!(ids(&store.snapshot()), ["1", "3"]);

        assert!(store.restore(taken));
        assert_eq!(ids(&store.snapshot()), ["1", "2", "3"]);
    }

    #[test]
    fn restore_after_session_change_is_ignored() {
        let store = NotificationStore::new();
        _ = store.replace(store.generation(), vec![record("1", NotificationKind::System)]);
        let taken = store.take(&"1".into()).expect("record 1 is pending");

        store.clear();

        assert!(!store.restore(taken));
        assert!(store.is_empty());
    }

    #[test]
    fn take_unknown_id_is_none() {
        let store = NotificationStore::new();
        assert!(store.take(&"missing".into()).is_none());
        assert_eq!(store.set_read(&"missing".into(), true), None);
    }

    #[test]
    fn set_read_returns_previous_flag() {
        let store = NotificationStore::new();
        _ = store.replace(store.generation(), vec![record("1", NotificationKind::System)]);

        assert_eq!(store.set_read(&"1".into(), true), Some(false));
        assert!(store.snapshot()[0].read);
        assert_eq!(store.set_read(&"1".into(), false), Some(true));
    }

    #[test]
    fn subscribers_see_every_write() {
        let store = NotificationStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));

        let id = {
            let calls = Arc::clone(&calls);
            let last_len = Arc::clone(&last_len);
            store.subscribe(move |snapshot| {
                _ = calls.fetch_add(1, Ordering::SeqCst);
                last_len.store(snapshot.len(), Ordering::SeqCst);
            })
        };

        _ = store.replace(
            store.generation(),
            vec![
                record("1", NotificationKind::System),
                record("2", NotificationKind::System),
            ],
        );
        assert_eq!(last_len.load(Ordering::SeqCst), 2);

        _ = store.take(&"1".into());
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        store.clear();
        assert_eq!(last_len.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        _ = store.replace(store.generation(), vec![record("3", NotificationKind::System)]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn discarded_writes_do_not_notify() {
        let store = NotificationStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let issued_at = store.generation();
        store.clear();

        let counter = Arc::clone(&calls);
        _ = store.subscribe(move |_| {
            _ = counter.fetch_add(1, Ordering::SeqCst);
        });

        _ = store.replace(issued_at, vec![record("1", NotificationKind::System)]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
