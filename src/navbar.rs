// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The navigation bar: route links, session buttons, and the notification
//! bell with its badge and dropdown.

use std::fmt::Write as _;

use log::info;

use crate::{
    context::Context,
    notification::{Badge, Dropdown, DropdownEvent},
    route::{Route, NAV_LINKS},
};

/// Scroll offset past which the bar switches to its compact style.
const SCROLL_THRESHOLD: f64 = 40.0;

pub(crate) struct Navbar {
    context: Context,
    route: Route,
    logged_in: bool,
    scrolled: bool,
    menu_open: bool,
    dropdown: Dropdown,
    badge: Badge,
}

impl Navbar {
    /// Starts out logged out; call [`Navbar::sync_session`] to pick up an
    /// existing session.
    pub(crate) fn new(context: Context, route: Route) -> Self {
        let badge = Badge::new(context.store().clone());
        Self {
            context,
            route,
            logged_in: false,
            scrolled: false,
            menu_open: false,
            dropdown: Dropdown::new(),
            badge,
        }
    }

    pub(crate) const fn route(&self) -> Route {
        self.route
    }

    pub(crate) const fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub(crate) const fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub(crate) const fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub(crate) const fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    pub(crate) const fn badge(&self) -> &Badge {
        &self.badge
    }

    /// Re-reads the session. Returns true on a logged-out to logged-in edge,
    /// which is when notifications should be fetched.
    pub(crate) fn sync_session(&mut self) -> bool {
        let now = self.context.is_logged_in();
        let started = now && !self.logged_in;
        if !now {
            // The bell is gone, so is anything hanging off it.
            _ = self.dropdown.handle(DropdownEvent::Close);
        }
        self.logged_in = now;
        started
    }

    /// Same return value as [`Navbar::sync_session`].
    pub(crate) fn navigate(&mut self, route: Route) -> bool {
        self.route = route;
        self.menu_open = false;
        _ = self.dropdown.handle(DropdownEvent::Navigate);
        self.sync_session()
    }

    pub(crate) fn scroll_to(&mut self, offset: f64) {
        self.scrolled = offset > SCROLL_THRESHOLD;
    }

    pub(crate) fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Returns false when there is no bell to click.
    pub(crate) fn click_bell(&mut self) -> bool {
        if !self.logged_in {
            return false;
        }

        let event = if self.dropdown.is_open() {
            DropdownEvent::Close
        } else {
            DropdownEvent::Activate
        };
        self.dropdown.handle(event)
    }

    pub(crate) fn close_dropdown(&mut self) -> bool {
        self.dropdown.handle(DropdownEvent::Close)
    }

    pub(crate) fn click_outside(&mut self) -> bool {
        self.dropdown.handle(DropdownEvent::OutsideInteraction)
    }

    pub(crate) fn logout(&mut self) {
        self.context.logout();
        self.logged_in = false;
        info!("User Logged Out");
        _ = self.navigate(Route::Login);
    }

    pub(crate) fn render(&self) -> String {
        if !self.route.shows_navbar() {
            return format!("({} page, navigation hidden)\n", self.route);
        }

        let rule = if self.scrolled { "━" } else { "─" }.repeat(72);
        let mut out = String::new();
        _ = writeln!(out, "{rule}");

        let links: Vec<_> = NAV_LINKS
            .iter()
            .map(|(route, label)| {
                if *route == self.route {
                    format!("[{label}]")
                } else {
                    (*label).to_owned()
                }
            })
            .collect();
        _ = write!(out, "HuddleUp  {}  |  ", links.join(" "));

        if self.logged_in {
            match self.badge.label() {
                Some(count) => {
                    _ = write!(out, "🔔({count})");
                }
                None => out.push('🔔'),
            }
            out.push_str("  Logout");
        } else {
            out.push_str("Login  Register");
        }
        _ = writeln!(out, "  {}", if self.menu_open { "✕" } else { "☰" });

        if self.menu_open {
            for (_, label) in NAV_LINKS {
                _ = writeln!(out, "  {label}");
            }
            let buttons = if self.logged_in {
                "Profile  Logout"
            } else {
                "Login  Register"
            };
            _ = writeln!(out, "  {buttons}");
        }

        _ = writeln!(out, "{rule}");

        if let Some(dropdown) = self.dropdown.render(&self.context.store().snapshot()) {
            _ = writeln!(out, "{dropdown}");
        }
        out
    }
}
