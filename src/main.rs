// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod auth;
mod command;
mod context;
mod error;
mod metadata;
mod navbar;
mod notification;
mod prompt;
mod route;
mod storage;

use std::{process, sync::Arc, time::Duration};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use log::{debug, error};
use url::Url;

use crate::{auth::Auth, context::Context, error::Result, notification::HttpSource};

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Logout(command::logout::Command),
    Status(command::status::Command),
    Notifications(command::list::Command),
    Respond(command::respond::Command),
    Shell(command::shell::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, context: Context) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(context).await,
            Self::Logout(cmd) => cmd.execute(context).await,
            Self::Status(cmd) => cmd.execute(context).await,
            Self::Notifications(cmd) => cmd.execute(context).await,
            Self::Respond(cmd) => cmd.execute(context).await,
            Self::Shell(cmd) => cmd.execute(context).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the HuddleUp API.
    #[arg(long, env = "HUDDLEUP_API_URL", default_value = "http://localhost:5000/api", value_parser = Url::parse)]
    api_url: Url,

    /// How many seconds to wait for the API before giving up on a request.
    #[arg(long, env = "HUDDLEUP_TIMEOUT", default_value = "10", value_parser = command::parse_seconds)]
    timeout: Duration,

    /// Keep the session token in memory only, so that it is forgotten when
    /// the command exits.
    #[arg(long)]
    no_persist_session: bool,

    #[clap(subcommand)]
    command: Command,
}

fn get_session_storage(args: &Args) -> Box<dyn storage::Storage> {
    if !args.no_persist_session {
        if let Some(file_storage) = storage::File::new("session.json") {
            return Box::new(file_storage);
        }
        debug!("No data directory is available; the session will not be persisted");
    }

    Box::new(storage::Memory::new())
}

fn build_context(args: &Args) -> Result<Context> {
    let source = HttpSource::new(args.api_url.clone(), args.timeout)?;
    Ok(Context::new(
        Auth::new(get_session_storage(args)),
        Arc::new(source),
    ))
}

async fn run(args: Args) -> Result<()> {
    let context = build_context(&args)?;
    command::Command::execute(args.command, context).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("HUDDLEUP_LOG", "warn")
        .write_style("HUDDLEUP_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
