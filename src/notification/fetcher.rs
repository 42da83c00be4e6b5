// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{
    auth::{Auth, Session},
    error::{self, Result},
};

use super::{
    store::{Generation, Taken},
    Action, NotificationId, NotificationStore, Source,
};

/// How a fetch ended. Failures are reported here instead of as errors so that
/// callers rendering the store never have to deal with them.
#[derive(Debug)]
pub(crate) enum FetchOutcome {
    /// Nobody is logged in; no request was made.
    Skipped,
    /// The store now holds this many records.
    Updated(usize),
    /// The response belonged to a session that has since ended.
    Discarded,
    /// The store was left as it was, except after an authentication failure,
    /// which also ends the session.
    Failed(error::Fetch),
}

/// Moves notifications between the API and the store, gated on the session.
#[derive(Clone)]
pub(crate) struct Fetcher {
    auth: Arc<Auth>,
    store: NotificationStore,
    source: Arc<dyn Source + Send + Sync>,
    // Held while the stored token and the store generation change together.
    session_change: Arc<Mutex<()>>,
}

impl Fetcher {
    pub(crate) fn new(
        auth: Arc<Auth>,
        store: NotificationStore,
        source: Arc<dyn Source + Send + Sync>,
    ) -> Self {
        Self {
            auth,
            store,
            source,
            session_change: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) async fn fetch(&self) -> FetchOutcome {
        // The generation is read before the token: a session change in between
        // then shows up as a generation mismatch.
        let issued_at = self.store.generation();
        let Some(session) = self.auth.session() else {
            debug!("Not fetching notifications without a session");
            return FetchOutcome::Skipped;
        };

        match self.source.list(&session).await {
            Ok(records) => {
                let count = records.len();
                if self.store.replace(issued_at, records) {
                    debug!("Received {} notifications", count);
                    FetchOutcome::Updated(count)
                } else {
                    FetchOutcome::Discarded
                }
            }
            Err(err) => {
                if err.is_auth_rejected() && !self.end_session_if(issued_at) {
                    debug!("Ignoring rejection of a session that already ended: {}", err);
                    return FetchOutcome::Discarded;
                }
                warn!("Failed to fetch notifications: {}", err);
                FetchOutcome::Failed(err)
            }
        }
    }

    /// Applies `action` to the store right away, then tells the server. The
    /// store change is undone if the server does not accept it.
    pub(crate) async fn respond(&self, id: &NotificationId, action: Action) -> Result<()> {
        self.begin(id, action)?.send().await
    }

    /// The synchronous half of [`Fetcher::respond`]: the store reflects the
    /// action as soon as this returns.
    pub(crate) fn begin(&self, id: &NotificationId, action: Action) -> Result<PendingAction> {
        let issued_at = self.store.generation();
        let session = self.auth.session().ok_or(error::Error::NotLoggedIn)?;

        let undo = if action.removes() {
            let taken = self
                .store
                .take(id)
                .ok_or_else(|| error::Error::NotificationNotFound(id.clone()))?;
            debug!("Removed {} notification {} ahead of the server", taken.record().kind, id);
            Undo::Restore(taken)
        } else {
            let previous = self
                .store
                .set_read(id, true)
                .ok_or_else(|| error::Error::NotificationNotFound(id.clone()))?;
            Undo::SetRead(previous)
        };

        Ok(PendingAction {
            fetcher: self.clone(),
            session,
            id: id.clone(),
            action,
            issued_at,
            undo,
        })
    }

    /// Stores a new session token and drops whatever the previous session
    /// fetched. A blank token changes nothing.
    pub(crate) fn start_session(&self, token: &str) -> Result<Session> {
        let _guard = self.session_change.lock();
        let session = self.auth.login(token)?;
        self.store.clear();
        Ok(session)
    }

    /// Forgets the session and everything fetched under it.
    pub(crate) fn end_session(&self) {
        let _guard = self.session_change.lock();
        self.clear_session();
    }

    /// Ends the session only if it is still the one that was current at
    /// `issued_at`. Returns whether it did.
    fn end_session_if(&self, issued_at: Generation) -> bool {
        let _guard = self.session_change.lock();
        if self.store.generation() != issued_at {
            return false;
        }
        self.clear_session();
        true
    }

    fn clear_session(&self) {
        if let Err(err) = self.auth.logout() {
            warn!("Could not remove the stored session: {}", err);
        }
        self.store.clear();
    }
}

enum Undo {
    Restore(Taken),
    SetRead(bool),
}

/// An action already applied to the store and waiting on the server.
pub(crate) struct PendingAction {
    fetcher: Fetcher,
    session: Session,
    id: NotificationId,
    action: Action,
    issued_at: Generation,
    undo: Undo,
}

impl PendingAction {
    pub(crate) const fn id(&self) -> &NotificationId {
        &self.id
    }

    pub(crate) const fn action(&self) -> Action {
        self.action
    }

    pub(crate) async fn send(self) -> Result<()> {
        let Self {
            fetcher,
            session,
            id,
            action,
            issued_at,
            undo,
        } = self;

        match fetcher.source.respond(&session, &id, action).await {
            Ok(()) => {
                info!("Notification {}: {}", id, action);
                Ok(())
            }
            Err(err) => {
                warn!("Server refused to {} notification {}: {}", action, id, err);
                if err.is_auth_rejected() {
                    _ = fetcher.end_session_if(issued_at);
                } else {
                    match undo {
                        Undo::Restore(taken) => {
                            _ = fetcher.store.restore(taken);
                        }
                        Undo::SetRead(previous) if fetcher.store.generation() == issued_at => {
                            _ = fetcher.store.set_read(&id, previous);
                        }
                        Undo::SetRead(_) => {}
                    }
                }
                Err(err.into())
            }
        }
    }
}
