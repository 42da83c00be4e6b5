// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{num::NonZeroU64, time::Duration};

use async_trait::async_trait;

use crate::{context::Context, error::Result};

pub(crate) mod list;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod respond;
pub(crate) mod shell;
pub(crate) mod status;

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, context: Context) -> Result<()>;
}

/// Parses a positive number of seconds.
pub(crate) fn parse_seconds(value: &str) -> Result<Duration, std::num::ParseIntError> {
    value
        .parse::<NonZeroU64>()
        .map(|secs| Duration::from_secs(secs.get()))
}
