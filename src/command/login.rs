// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;
use log::{error, warn};
use secrecy::{ExposeSecret as _, SecretString};

use crate::{
    context::Context,
    error::{self, Result},
    notification::FetchOutcome,
    prompt::{self, Prompt},
    storage::IsPersistent as _,
};

/// Store a session token and fetch the notifications waiting for it.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The session token issued by the HuddleUp web app. You are prompted for
    /// it when it is not given here or in the environment.
    #[arg(long, env = "HUDDLEUP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// The path to the Pinentry program to use when prompting for the token.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, context: Context) -> Result<()> {
        let token = match self.token {
            Some(token) => SecretString::new(token),
            None => {
                let prompts: Vec<Box<dyn Prompt>> = vec![
                    Box::new(self.pinentry_program.map_or_else(
                        prompt::PinentryPrompt::new,
                        prompt::PinentryPrompt::new_with_executable,
                    )),
                    Box::new(prompt::RpasswordPrompt),
                ];
                prompt::require(&prompts).await?
            }
        };

        _ = context.login(token.expose_secret())?;
        if !context.auth().is_persistent() {
            warn!("Session storage is not persistent; this login ends when the command exits");
        }

        match context.fetcher().fetch().await {
            FetchOutcome::Updated(count) => {
                println!("Logged in. {count} pending notification(s).");
            }
            FetchOutcome::Failed(err) if err.is_auth_rejected() => {
                error!("The server did not accept the token");
                return Err(error::Error::Command);
            }
            FetchOutcome::Failed(_) | FetchOutcome::Skipped | FetchOutcome::Discarded => {
                println!("Logged in.");
            }
        }
        Ok(())
    }
}
