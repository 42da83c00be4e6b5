// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use reqwest::StatusCode;
use thiserror::Error;

use crate::notification::NotificationId;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("the API URL {0} cannot be used as a base for endpoint paths")]
    UrlBase(url::Url),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notification request failed: {0}")]
    Fetch(#[from] Fetch),
    #[error("token prompt error: {0}")]
    Prompt(#[from] Prompt),
    #[error("session token must not be empty")]
    EmptyToken,
    #[error("you are not logged in")]
    NotLoggedIn,
    #[error(r#"no notification with identifier "{}" is pending"#, .0.as_str().escape_default())]
    NotificationNotFound(NotificationId),
    #[error("command execution failed")]
    Command,
    #[error("operation cancelled")]
    Cancelled,
}

impl From<pinentry::Error> for Error {
    fn from(value: pinentry::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(
            clippy::wildcard_enum_match_arm,
            clippy::match_wildcard_for_single_variants
        )]
        match value {
            pinentry::Error::Cancelled | pinentry::Error::Timeout => Self::Cancelled,
            pinentry::Error::Io(e) => Self::Io(e),
            _ => Self::Prompt(Prompt::Pinentry(value)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

/// Failures of a request against the notification API. None of these reach
/// rendering code; the fetcher turns them into an outcome.
#[derive(Error, Debug)]
pub(crate) enum Fetch {
    #[error("network request failed: {0}")]
    NetworkFailure(#[from] reqwest::Error),
    #[error("server rejected the session token ({0})")]
    AuthRejected(StatusCode),
    #[error("server responded with unexpected status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("response body is not a notification list: {0}")]
    MalformedResponse(serde_json::Error),
}

impl Fetch {
    pub(crate) const fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected(_))
    }
}

#[derive(Error, Debug)]
pub(crate) enum Prompt {
    #[error("no token prompt available")]
    NoPrompt,
    #[error("Pinentry implementation error: {0}")]
    Pinentry(pinentry::Error),
}
