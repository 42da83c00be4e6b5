// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use super::{store::SubscriptionId, NotificationStore};

/// The pending count shown on the bell. It follows the store through a
/// subscription and never fetches on its own.
pub(crate) struct Badge {
    store: NotificationStore,
    subscription: SubscriptionId,
    count: Arc<AtomicUsize>,
}

impl Badge {
    pub(crate) fn new(store: NotificationStore) -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let subscription = {
            let count = Arc::clone(&count);
            store.subscribe(move |snapshot| count.store(snapshot.len(), Ordering::Release))
        };
        count.store(store.len(), Ordering::Release);

        Self {
            store,
            subscription,
            count,
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// The text drawn on the bell; the badge is hidden when nothing is pending.
    pub(crate) fn label(&self) -> Option<String> {
        match self.count() {
            0 => None,
            n => Some(n.to_string()),
        }
    }
}

impl Drop for Badge {
    fn drop(&mut self) {
        _ = self.store.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use crate::notification::{NotificationKind, NotificationRecord};

    use super::*;

    #[test]
    fn follows_the_store() {
        let store = NotificationStore::new();
        let badge = Badge::new(store.clone());
        assert_eq!(badge.count(), 0);
        assert_eq!(badge.label(), None);

        _ = store.replace(
            store.generation(),
            vec![
                NotificationRecord::fixture("1", NotificationKind::FriendRequest),
                NotificationRecord::fixture("2", NotificationKind::System),
            ],
        );
        assert_eq!(badge.count(), 2);
        assert_eq!(badge.label().as_deref(), Some("2"));

        store.clear();
        assert_eq!(badge.count(), 0);
        assert_eq!(badge.label(), None);
    }

    #[test]
    fn starts_from_current_contents() {
        let store = NotificationStore::new();
        _ = store.replace(
            store.generation(),
            vec![NotificationRecord::fixture("1", NotificationKind::Like)],
        );
        assert_eq!(Badge::new(store).count(), 1);
    }

    #[test]
    fn unsubscribes_when_dropped() {
        let store = NotificationStore::new();
        let subscription = {
            let badge = Badge::new(store.clone());
            badge.subscription
        };
        assert!(!store.unsubscribe(subscription));
    }
}
