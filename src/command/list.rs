// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use core::num;

use async_trait::async_trait;
use clap::Parser;
use log::error;
use tabled::{settings::Style, Table};

use crate::{
    context::Context,
    error::{self, Result},
    notification::{FetchOutcome, NotificationRecord, NotificationStore, EMPTY_MESSAGE},
};

/// Fetch and list pending notifications.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Only list friend requests.
    #[arg(long, short)]
    friend_requests: bool,

    /// Only list notifications that have not been read.
    #[arg(long, short)]
    unread: bool,

    /// The number of notifications to list.
    #[arg(long, short)]
    count: Option<num::NonZeroUsize>,

    /// Print the notifications as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl Command {
    fn select(&self, store: &NotificationStore) -> Vec<NotificationRecord> {
        let records = if self.friend_requests {
            store.friend_requests()
        } else {
            store.snapshot().to_vec()
        };

        records
            .into_iter()
            .filter(|record| !self.unread || !record.read)
            .take(self.count.map_or(usize::MAX, num::NonZeroUsize::get))
            .collect()
    }
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, context: Context) -> Result<()> {
        match context.fetcher().fetch().await {
            FetchOutcome::Updated(_) => {}
            FetchOutcome::Skipped => return Err(error::Error::NotLoggedIn),
            FetchOutcome::Failed(_) | FetchOutcome::Discarded => {
                error!("Could not retrieve notifications");
                return Err(error::Error::Command);
            }
        }

        let records = self.select(context.store());
        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else if records.is_empty() {
            println!("{EMPTY_MESSAGE}");
        } else {
            println!("{}", Table::new(&records).with(Style::rounded()));
        }
        Ok(())
    }
}
