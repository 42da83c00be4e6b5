// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use inflector::Inflector as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, PickFirst, TimestampMilliSeconds};
use tabled::Tabled;

/// Record identifiers arrive as strings from some backends and as numbers from
/// others. Both are kept as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub(crate) struct NotificationId(String);

impl NotificationId {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NotificationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(Self(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        }))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum NotificationKind {
    #[serde(alias = "friend-request", alias = "friendRequest")]
    FriendRequest,
    #[serde(alias = "friend-accepted", alias = "friendAccepted")]
    FriendAccepted,
    Comment,
    Like,
    System,
    #[serde(other)]
    Other,
}

impl NotificationKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::FriendRequest => "friend_request",
            Self::FriendAccepted => "friend_accepted",
            Self::Comment => "comment",
            Self::Like => "like",
            Self::System => "system",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_title_case())
    }
}

/// Who caused a notification. The API sends either a bare user reference or
/// a populated user object.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RawSender")]
pub(crate) struct Sender {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSender {
    Reference(String),
    Profile {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default, alias = "username")]
        name: Option<String>,
    },
}

impl From<RawSender> for Sender {
    fn from(value: RawSender) -> Self {
        match value {
            RawSender::Reference(id) => Self { id, name: None },
            RawSender::Profile { id, name } => Self { id, name },
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or(&self.id))
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Tabled)]
pub(crate) struct NotificationRecord {
    #[serde(alias = "_id")]
    #[tabled(rename = "ID")]
    pub(crate) id: NotificationId,
    #[serde(alias = "type")]
    #[tabled(rename = "Kind")]
    pub(crate) kind: NotificationKind,
    #[serde(alias = "from")]
    #[tabled(rename = "From")]
    pub(crate) sender: Sender,
    #[serde_as(as = "PickFirst<(_, TimestampMilliSeconds<i64>)>")]
    #[serde(alias = "timestamp", alias = "createdAt")]
    #[tabled(rename = "Received", display_with = "Self::format_timestamp")]
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default, alias = "isRead")]
    #[tabled(rename = "Read", display_with = "Self::format_read")]
    pub(crate) read: bool,
}

impl NotificationRecord {
    pub(crate) fn is_friend_request(&self) -> bool {
        self.kind == NotificationKind::FriendRequest
    }

    #[cfg(test)]
    pub(crate) fn fixture(id: &str, kind: NotificationKind) -> Self {
        use chrono::TimeZone as _;

        Self {
            id: id.into(),
            kind,
            sender: Sender {
                id: format!("sender-{id}"),
                name: None,
            },
            // LINT: Constant, in-range timestamp.
            #[allow(clippy::unwrap_used)]
            created_at: Utc.timestamp_opt(1_714_564_800, 0).unwrap(),
            read: false,
        }
    }

    fn format_timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn format_read(read: &bool) -> String {
        let mark = if *read { "✓" } else { "" };
        mark.to_owned()
    }
}

/// What a user can do with a notification from the dropdown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Action {
    Accept,
    Decline,
    Dismiss,
    #[value(name = "read")]
    MarkRead,
}

impl Action {
    /// Whether the record leaves the pending list once the action is taken.
    pub(crate) const fn removes(self) -> bool {
        match self {
            Self::Accept | Self::Decline | Self::Dismiss => true,
            Self::MarkRead => false,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.to_possible_value().ok_or(fmt::Error)?;
        write!(f, "{}", value.get_name())
    }
}
