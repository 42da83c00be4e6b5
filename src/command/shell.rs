// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! An interactive navigation bar. Each line read from standard input is one
//! user interaction; the bar is redrawn after every interaction and whenever
//! a background request completes.

use std::{future, time::Duration};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use log::debug;
use tokio::{
    io::{self, AsyncBufReadExt as _, BufReader},
    select,
    sync::mpsc,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_stream::{
    wrappers::{LinesStream, ReceiverStream},
    StreamExt as _,
};

use crate::{
    context::Context,
    error::Result,
    navbar::Navbar,
    notification::{Action, FetchOutcome, NotificationId},
    route::Route,
};

/// Run the navigation bar interactively.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The page to start on.
    #[arg(long, default_value = "/")]
    route: Route,

    /// Refetch notifications this many seconds apart while logged in.
    #[arg(long, env = "HUDDLEUP_POLL_INTERVAL", value_parser = super::parse_seconds)]
    poll_interval: Option<Duration>,
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "", disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    input: Input,
}

#[derive(Debug, Subcommand)]
enum Input {
    /// Click the notification bell.
    Bell,
    /// Close the notification dropdown.
    Close,
    /// Click somewhere outside the dropdown.
    Outside,
    /// Navigate to another page.
    Go { route: Route },
    /// Scroll the page to a vertical offset.
    Scroll {
        #[arg(allow_negative_numbers = true)]
        offset: f64,
    },
    /// Open or close the mobile menu.
    Menu,
    /// Accept a friend request.
    Accept { id: String },
    /// Decline a friend request.
    Decline { id: String },
    /// Dismiss a notification.
    Dismiss { id: String },
    /// Mark a notification as read.
    Read { id: String },
    /// Fetch notifications again.
    Refresh,
    /// Log in with a session token.
    Login { token: String },
    /// Log out.
    Logout,
    /// Describe the navigation bar state, then draw it again.
    Show,
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug)]
enum Event {
    Fetched(FetchOutcome),
    Responded {
        id: NotificationId,
        action: Action,
        result: Result<()>,
    },
}

struct Shell {
    context: Context,
    navbar: Navbar,
    events: mpsc::Sender<Event>,
}

impl Shell {
    fn new(context: Context, route: Route, events: mpsc::Sender<Event>) -> Self {
        let navbar = Navbar::new(context.clone(), route);
        Self {
            context,
            navbar,
            events,
        }
    }

    /// Picks up a stored session, fetching for it if there is one.
    fn mount(&mut self) {
        if self.navbar.sync_session() {
            self.spawn_fetch();
        }
    }

    fn spawn_fetch(&self) {
        let fetcher = self.context.fetcher().clone();
        let events = self.events.clone();
        _ = tokio::spawn(async move {
            let outcome = fetcher.fetch().await;
            _ = events.send(Event::Fetched(outcome)).await;
        });
    }

    fn spawn_respond(&self, id: &str, action: Action) {
        let pending = match self.context.fetcher().begin(&id.into(), action) {
            Ok(pending) => pending,
            Err(err) => {
                eprintln!("Cannot {action} notification {id}: {err}");
                return;
            }
        };

        let events = self.events.clone();
        _ = tokio::spawn(async move {
            let id = pending.id().clone();
            let action = pending.action();
            let result = pending.send().await;
            _ = events
                .send(Event::Responded { id, action, result })
                .await;
        });
    }

    /// Returns false when the user asked to leave.
    fn handle_input(&mut self, input: Input) -> bool {
        debug!("Input: {:?}", input);
        match input {
            Input::Bell => {
                if !self.navbar.click_bell() && !self.navbar.is_logged_in() {
                    eprintln!("Log in to see notifications");
                }
            }
            Input::Close => {
                _ = self.navbar.close_dropdown();
            }
            Input::Outside => {
                _ = self.navbar.click_outside();
            }
            Input::Go { route } => {
                if self.navbar.navigate(route) {
                    self.spawn_fetch();
                }
            }
            Input::Scroll { offset } => self.navbar.scroll_to(offset),
            Input::Menu => self.navbar.toggle_menu(),
            Input::Accept { id } => self.spawn_respond(&id, Action::Accept),
            Input::Decline { id } => self.spawn_respond(&id, Action::Decline),
            Input::Dismiss { id } => self.spawn_respond(&id, Action::Dismiss),
            Input::Read { id } => self.spawn_respond(&id, Action::MarkRead),
            Input::Refresh => {
                if self.navbar.is_logged_in() {
                    self.spawn_fetch();
                } else {
                    eprintln!("Not logged in");
                }
            }
            Input::Login { token } => match self.context.login(&token) {
                Ok(_) => {
                    _ = self.navbar.sync_session();
                    self.spawn_fetch();
                }
                Err(err) => eprintln!("Cannot log in: {err}"),
            },
            Input::Logout => self.navbar.logout(),
            Input::Show => self.print_state(),
            Input::Quit => return false,
        }
        true
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Fetched(FetchOutcome::Failed(err)) => {
                eprintln!("Could not load notifications: {err}");
            }
            Event::Fetched(outcome) => debug!("Fetch finished: {:?}", outcome),
            Event::Responded {
                id,
                action,
                result: Ok(()),
            } => println!("Notification {id}: {action}"),
            Event::Responded {
                id,
                action,
                result: Err(err),
            } => eprintln!("Could not {action} notification {id}: {err}"),
        }

        // An authentication failure in the background ends the session.
        if self.navbar.sync_session() {
            self.spawn_fetch();
        }
    }

    fn poll(&self) {
        if self.navbar.is_logged_in() {
            debug!("Polling for notifications");
            self.spawn_fetch();
        }
    }

    fn print_state(&self) {
        let navbar = &self.navbar;
        println!(
            "page {}, {}, dropdown {}, menu {}, {} pending",
            navbar.route(),
            if navbar.is_scrolled() { "scrolled" } else { "at top" },
            navbar.dropdown().state(),
            if navbar.is_menu_open() { "open" } else { "closed" },
            navbar.badge().count(),
        );
    }

    fn redraw(&self) {
        print!("{}", self.navbar.render());
    }
}

fn parse_line(line: &str) -> Option<Input> {
    let words: Vec<_> = line.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    match Line::try_parse_from(words) {
        Ok(line) => Some(line.input),
        Err(err) => {
            _ = err.print();
            None
        }
    }
}

/// The periodic refetch timer. Without a period it never fires.
struct Poll(Option<time::Interval>);

impl Poll {
    /// The first tick comes one full period after creation.
    fn new(period: Option<Duration>) -> Self {
        Self(period.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        }))
    }

    async fn tick(&mut self) {
        match &mut self.0 {
            Some(interval) => {
                _ = interval.tick().await;
            }
            None => future::pending().await,
        }
    }
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, context: Context) -> Result<()> {
        let (tx, rx) = mpsc::channel(16);
        let mut events = ReceiverStream::new(rx);
        let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());
        let mut poll = Poll::new(self.poll_interval);

        let mut shell = Shell::new(context, self.route, tx);
        shell.mount();
        shell.redraw();
        println!("Type `help` for a list of commands.");

        loop {
            select! {
                candidate = lines.next() => {
                    let Some(line) = candidate.transpose()? else {
                        return Ok(());
                    };
                    if let Some(input) = parse_line(&line) {
                        if !shell.handle_input(input) {
                            return Ok(());
                        }
                        shell.redraw();
                    }
                }
                Some(event) = events.next() => {
                    shell.handle_event(event);
                    shell.redraw();
                }
                () = poll.tick(), if shell.navbar.is_logged_in() => shell.poll(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        context::testing,
        error::Result,
        notification::{NotificationKind, NotificationRecord},
    };

    use super::*;

    fn shell() -> (Shell, mpsc::Receiver<Event>, std::sync::Arc<testing::Fixed>) {
        let (context, source) = testing::context();
        let (tx, rx) = mpsc::channel(16);
        (Shell::new(context, Route::Home, tx), rx, source)
    }

    #[test]
    fn parses_lines() {
        assert!(matches!(parse_line("bell"), Some(Input::Bell)));
        assert!(matches!(
            parse_line("  go   /friends "),
            Some(Input::Go {
                route: Route::Friends
            })
        ));
        assert!(matches!(
            parse_line("scroll -3"),
            Some(Input::Scroll { offset }) if offset < 0.0
        ));
        assert!(matches!(parse_line("exit"), Some(Input::Quit)));
        assert!(parse_line("").is_none());
        assert!(parse_line("accept").is_none());
    }

    #[tokio::test]
    async fn login_fetches_and_actions_apply_immediately() -> Result<()> {
        let (mut shell, mut rx, source) = shell();
        source.set(vec![
            NotificationRecord::fixture("1", NotificationKind::FriendRequest),
            NotificationRecord::fixture("2", NotificationKind::Comment),
        ]);

        assert!(shell.handle_input(Input::Login {
            token: "token-1".to_owned()
        }));
        let event = rx.recv().await;
        assert!(matches!(
            event,
            Some(Event::Fetched(FetchOutcome::Updated(2)))
        ));
        if let Some(event) = event {
            shell.handle_event(event);
        }
        assert_eq!(shell.navbar.badge().count(), 2);

        assert!(shell.handle_input(Input::Accept { id: "1".to_owned() }));
        assert_eq!(shell.navbar.badge().count(), 1);
        assert!(matches!(
            rx.recv().await,
            Some(Event::Responded {
                action: Action::Accept,
                result: Ok(()),
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn mount_fetches_for_a_stored_session() -> Result<()> {
        let (mut shell, mut rx, _) = shell();
        _ = shell.context.login("token-1")?;
        shell.mount();
        assert!(shell.navbar.is_logged_in());
        assert!(matches!(rx.recv().await, Some(Event::Fetched(_))));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_schedule_and_only_while_logged_in() -> Result<()> {
        let (mut shell, mut rx, source) = shell();
        source.set(vec![NotificationRecord::fixture("1", NotificationKind::Like)]);
        let mut poll = Poll::new(Some(Duration::from_secs(30)));

        assert!(time::timeout(Duration::from_secs(29), poll.tick()).await.is_err());
        poll.tick().await;
        shell.poll();
        assert!(time::timeout(Duration::from_secs(1), rx.recv()).await.is_err());

        _ = shell.context.login("token-1")?;
        shell.mount();
        assert!(matches!(rx.recv().await, Some(Event::Fetched(_))));

        poll.tick().await;
        shell.poll();
        assert!(matches!(
            rx.recv().await,
            Some(Event::Fetched(FetchOutcome::Updated(1)))
        ));

        let mut idle = Poll::new(None);
        assert!(time::timeout(Duration::from_secs(3600), idle.tick()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn logout_and_quit() -> Result<()> {
        let (mut shell, _rx, _) = shell();
        _ = shell.context.login("token-1")?;
        shell.mount();

        assert!(shell.handle_input(Input::Logout));
        assert!(!shell.navbar.is_logged_in());
        assert_eq!(shell.navbar.route(), Route::Login);
        assert!(!shell.handle_input(Input::Quit));
        Ok(())
    }
}
