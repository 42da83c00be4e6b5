// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::{DateTime, TimeZone as _, Utc};
use log::{info, warn};
use parking_lot::Mutex;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;

use crate::{
    error::{self, Result},
    storage::{IsPersistent, Storage},
};

/// The storage key the session token lives under.
pub(crate) const TOKEN_KEY: &str = "token";

/// A bearer token for the HuddleUp API.
#[derive(Clone)]
pub(crate) struct Session {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns `None` for a blank token.
    pub(crate) fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        Some(Self {
            expires_at: jwt_expiry(token),
            token: SecretString::new(token.to_owned()),
        })
    }

    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    pub(crate) const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Utc::now() >= at)
    }

    fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Opaque tokens have no client-visible expiry. A JWT's `exp` claim is honored
/// when present, without verifying the signature.
fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    #[derive(Deserialize)]
    struct Claims {
        exp: Option<i64>,
    }

    let mut parts = token.split('.');
    let (Some(_), Some(payload), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let decoded = base64::decode_config(payload, base64::URL_SAFE_NO_PAD).ok()?;
    let claims: Claims = serde_json::from_slice(&decoded).ok()?;
    Utc.timestamp_opt(claims.exp?, 0).single()
}

/// Reads and clears the persisted session. Writes are limited to `login` and
/// `logout`; everything else only asks whether a usable session exists.
pub(crate) struct Auth {
    storage: Mutex<Box<dyn Storage>>,
}

impl Auth {
    pub(crate) fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage: Mutex::new(storage),
        }
    }

    /// The current session, if a token is stored and has not expired. Storage
    /// failures read as logged out.
    pub(crate) fn session(&self) -> Option<Session> {
        let token = match self.storage.lock().get_item(TOKEN_KEY) {
            Ok(token) => token?,
            Err(err) => {
                warn!("Could not read the session token: {}", err);
                return None;
            }
        };

        Session::new(&token).filter(|session| !session.is_expired())
    }

    pub(crate) fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    pub(crate) fn login(&self, token: &str) -> Result<Session> {
        let session = Session::new(token).ok_or(error::Error::EmptyToken)?;
        self.storage.lock().set_item(TOKEN_KEY, session.token())?;
        info!("Session started");
        Ok(session)
    }

    pub(crate) fn logout(&self) -> Result<()> {
        let mut storage = self.storage.lock();
        if storage.get_item(TOKEN_KEY)?.is_some() {
            storage.remove_item(TOKEN_KEY)?;
            info!("Session ended");
        }
        Ok(())
    }
}

impl IsPersistent for Auth {
    fn is_persistent(&self) -> bool {
        self.storage.lock().is_persistent()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::{error::Result, storage};

    use super::*;

    fn jwt(exp: i64) -> String {
        let payload = base64::encode_config(
            serde_json::json!({ "sub": "42", "exp": exp }).to_string(),
            base64::URL_SAFE_NO_PAD,
        );
        format!("eyJhbGciOiJIUzI1NiJ9.{payload}.c2lnbmF0dXJl")
    }

    fn auth() -> Auth {
        Auth::new(Box::new(storage::Memory::new()))
    }

    #[test]
    fn blank_tokens_are_rejected() {
        assert!(Session::new("").is_none());
        assert!(Session::new("   ").is_none());
        assert!(matches!(auth().login(" "), Err(error::Error::EmptyToken)));
    }

    #[test]
    fn opaque_tokens_never_expire() {
        let session = Session::new("opaque-token").expect("session");
        assert_eq!(session.expires_at(), None);
        assert!(!session.is_expired());
        assert_eq!(session.authorization(), "Bearer opaque-token");
    }

    #[test]
    fn jwt_expiry_is_honored() {
        let future = Session::new(&jwt((Utc::now() + Duration::hours(1)).timestamp()))
            .expect("session");
        assert!(future.expires_at().is_some());
        assert!(!future.is_expired());

        let past = Session::new(&jwt((Utc::now() - Duration::hours(1)).timestamp()))
            .expect("session");
        assert!(past.is_expired());
    }

    #[test]
    fn expired_token_reads_as_logged_out() -> Result<()> {
        let auth = auth();
        _ = auth.login(&jwt((Utc::now() - Duration::minutes(5)).timestamp()))?;
        assert!(!auth.is_logged_in());
        Ok(())
    }

    #[test]
    fn login_then_logout() -> Result<()> {
        let auth = auth();
        assert!(!auth.is_logged_in());

        _ = auth.login("token-1")?;
        assert!(auth.is_logged_in());

        auth.logout()?;
        assert!(!auth.is_logged_in());
        Ok(())
    }

    #[test]
    fn logout_is_idempotent() -> Result<()> {
        let auth = auth();
        _ = auth.login("token-1")?;

        auth.logout()?;
        auth.logout()?;
        assert!(!auth.is_logged_in());
        Ok(())
    }

    #[test]
    fn debug_output_redacts_token() {
        let session = Session::new("very-secret").expect("session");
        assert!(!format!("{session:?}").contains("very-secret"));
    }
}
