// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::SecondsFormat;
use clap::Parser;

use crate::{context::Context, error::Result};

/// Show whether a usable session is stored. Makes no network request.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, context: Context) -> Result<()> {
        match context.auth().session() {
            Some(session) => match session.expires_at() {
                Some(at) => println!(
                    "Logged in until {}",
                    at.to_rfc3339_opts(SecondsFormat::Secs, true)
                ),
                None => println!("Logged in"),
            },
            None => println!("Logged out"),
        }
        Ok(())
    }
}
