// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use log::debug;
use tabled::{settings::Style, Table};

use super::store::Snapshot;

pub(crate) const EMPTY_MESSAGE: &str = "No new notifications";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum DropdownState {
    #[default]
    Closed,
    Open,
}

impl fmt::Display for DropdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "closed",
            Self::Open => "open",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DropdownEvent {
    /// The bell was clicked while the dropdown was closed.
    Activate,
    /// An explicit close request, including a bell click while open.
    Close,
    /// A click or focus change outside the dropdown.
    OutsideInteraction,
    /// The route changed.
    Navigate,
}

#[derive(Debug, Default)]
pub(crate) struct Dropdown {
    state: DropdownState,
}

impl Dropdown {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn state(&self) -> DropdownState {
        self.state
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state == DropdownState::Open
    }

    /// Returns whether the event changed the state.
    pub(crate) fn handle(&mut self, event: DropdownEvent) -> bool {
        let next = match (self.state, event) {
            (DropdownState::Closed, DropdownEvent::Activate) => DropdownState::Open,
            (
                DropdownState::Open,
                DropdownEvent::Close | DropdownEvent::OutsideInteraction | DropdownEvent::Navigate,
            ) => DropdownState::Closed,
            (state, _) => state,
        };

        let changed = next != self.state;
        if changed {
            debug!("Dropdown {:?} -> {:?} on {:?}", self.state, next, event);
            self.state = next;
        }
        changed
    }

    /// The open dropdown's contents; nothing while closed.
    pub(crate) fn render(&self, records: &Snapshot) -> Option<String> {
        if !self.is_open() {
            return None;
        }

        Some(if records.is_empty() {
            EMPTY_MESSAGE.to_owned()
        } else {
            Table::new(records.iter()).with(Style::rounded()).to_string()
        })
    }
}
