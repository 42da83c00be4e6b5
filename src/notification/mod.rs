// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

mod badge;
mod dropdown;
mod fetcher;
mod http;
mod model;
mod source;
mod store;

pub(crate) use badge::Badge;
#[cfg(test)]
pub(crate) use dropdown::DropdownState;
pub(crate) use dropdown::{Dropdown, DropdownEvent, EMPTY_MESSAGE};
pub(crate) use fetcher::{FetchOutcome, Fetcher};
pub(crate) use http::HttpSource;
#[cfg(test)]
pub(crate) use model::NotificationKind;
pub(crate) use model::{Action, NotificationId, NotificationRecord};
pub(crate) use source::Source;
pub(crate) use store::NotificationStore;
