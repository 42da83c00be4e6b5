// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{context::Context, error::Result};

/// Forget the stored session token.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, context: Context) -> Result<()> {
        context.logout();
        println!("User Logged Out");
        Ok(())
    }
}
