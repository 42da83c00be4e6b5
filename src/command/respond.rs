// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::error;

use crate::{
    context::Context,
    error::{self, Result},
    notification::{Action, FetchOutcome, NotificationId},
};

/// Act on a pending notification.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The identifier of the notification, as shown by `notifications`.
    id: String,

    /// What to do with the notification.
    #[arg(value_enum)]
    action: Action,
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

        let id = NotificationId::from(self.id.as_str());
        context.fetcher().respond(&id, self.action).await?;
        println!("Notification {id}: {}", self.action);
        Ok(())
    }
}
