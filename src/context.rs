// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::{
    auth::{Auth, Session},
    error::Result,
    notification::{Fetcher, NotificationStore, Source},
};

/// Everything a surface needs to read or change the session and its
/// notifications. Clones share state; each `Context::new` is independent.
#[derive(Clone)]
pub(crate) struct Context {
    auth: Arc<Auth>,
    store: NotificationStore,
    fetcher: Fetcher,
}

impl Context {
    pub(crate) fn new(auth: Auth, source: Arc<dyn Source + Send + Sync>) -> Self {
        let auth = Arc::new(auth);
        let store = NotificationStore::new();
        let fetcher = Fetcher::new(Arc::clone(&auth), store.clone(), source);
        Self {
            auth,
            store,
            fetcher,
        }
    }

    pub(crate) fn auth(&self) -> &Auth {
        &self.auth
    }

    pub(crate) const fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub(crate) const fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub(crate) fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    /// Starts a new session. Whatever the store held belonged to the previous
    /// one and is dropped once the new token is stored.
    pub(crate) fn login(&self, token: &str) -> Result<Session> {
        self.fetcher.start_session(token)
    }

    /// Ends the session and empties the store. Safe to call when logged out.
    pub(crate) fn logout(&self) {
        self.fetcher.end_session();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::{
        auth::{Auth, Session},
        error,
        notification::{Action, NotificationId, NotificationRecord, Source},
        storage,
    };

    use super::Context;

    /// Serves whatever list it was last given.
    #[derive(Default)]
    pub(crate) struct Fixed {
        records: Mutex<Vec<NotificationRecord>>,
    }

    impl Fixed {
        pub(crate) fn set(&self, records: Vec<NotificationRecord>) {
            *self.records.lock() = records;
        }
    }

    #[async_trait]
    impl Source for Fixed {
        async fn list(&self, _: &Session) -> Result<Vec<NotificationRecord>, error::Fetch> {
            Ok(self.records.lock().clone())
        }

        async fn respond(
            &self,
            _: &Session,
            _: &NotificationId,
            _: Action,
        ) -> Result<(), error::Fetch> {
            Ok(())
        }
    }

    pub(crate) fn context() -> (Context, Arc<Fixed>) {
        let source = Arc::new(Fixed::default());
        let context = Context::new(
            Auth::new(Box::new(storage::Memory::new())),
            Arc::clone(&source) as _,
        );
        (context, source)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{self, Result},
        notification::{NotificationKind, NotificationRecord},
    };

    use super::testing;

    #[tokio::test]
    async fn logout_empties_store_and_is_idempotent() -> Result<()> {
        let (context, source) = testing::context();
        source.set(vec![
            NotificationRecord::fixture("1", NotificationKind::FriendRequest),
            NotificationRecord::fixture("2", NotificationKind::System),
        ]);
        _ = context.login("token-1")?;
        _ = context.fetcher().fetch().await;
        assert_eq!(context.store().len(), 2);

        context.logout();
        assert!(!context.is_logged_in());
        assert!(context.store().is_empty());

        context.logout();
        assert!(!context.is_logged_in());
        assert!(context.store().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn login_drops_previous_users_records() -> Result<()> {
        let (context, source) = testing::context();
        source.set(vec![NotificationRecord::fixture("1", NotificationKind::Like)]);
        _ = context.login("alice")?;
        _ = context.fetcher().fetch().await;

        let before = context.store().generation();
        _ = context.login("bob")?;
        assert!(context.store().is_empty());
        assert_ne!(context.store().generation(), before);
        Ok(())
    }

    #[tokio::test]
    async fn blank_login_leaves_current_session_alone() -> Result<()> {
        let (context, source) = testing::context();
        source.set(vec![NotificationRecord::fixture("1", NotificationKind::Like)]);
        _ = context.login("alice")?;
        _ = context.fetcher().fetch().await;
        let before = context.store().generation();

        assert!(matches!(
            context.login("   "),
            Err(error::Error::EmptyToken)
        ));
        assert!(context.is_logged_in());
        assert_eq!(context.store().len(), 1);
        assert_eq!(context.store().generation(), before);
        Ok(())
    }

    #[test]
    fn contexts_are_isolated() -> Result<()> {
        let (first, _) = testing::context();
        let (second, _) = testing::context();
        _ = first.login("token-1")?;
        assert!(first.is_logged_in());
        assert!(!second.is_logged_in());
        Ok(())
    }
}
