// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{ffi::OsString, path::Path};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::task;

use crate::{
    error::{self, Result},
    metadata,
};

#[async_trait]
pub(crate) trait Prompt: Send + Sync {
    async fn prompt(&self) -> Result<Option<SecretString>>;
}

#[async_trait]
impl<T: Prompt + ?Sized> Prompt for Box<T> {
    async fn prompt(&self) -> Result<Option<SecretString>> {
        (**self).prompt().await
    }
}

#[async_trait]
impl<T: Prompt> Prompt for Vec<T> {
    async fn prompt(&self) -> Result<Option<SecretString>> {
        for candidate in self {
            if let r @ (Ok(Some(_)) | Err(_)) = candidate.prompt().await {
                return r;
            }
        }

        Ok(None)
    }
}

/// Asks every prompt in turn and fails if none of them could ask.
pub(crate) async fn require(prompt: &(dyn Prompt + '_)) -> Result<SecretString> {
    prompt
        .prompt()
        .await?
        .ok_or_else(|| error::Prompt::NoPrompt.into())
}

pub(crate) struct PinentryPrompt {
    executable: Option<OsString>,
}

impl PinentryPrompt {
    pub(crate) const fn new() -> Self {
        Self { executable: None }
    }

    pub(crate) fn new_with_executable<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: Some(executable.as_ref().as_os_str().into()),
        }
    }
}

#[async_trait]
impl Prompt for PinentryPrompt {
    async fn prompt(&self) -> Result<Option<SecretString>> {
        fn interact<'input>(
            mut input: pinentry::PassphraseInput<'input>,
            title: &'input str,
        ) -> Result<SecretString> {
            _ = input.required("You must enter a session token to log in.");
            _ = input.with_title(title);
            _ = input.with_description("Paste the token issued by the HuddleUp web app.");
            _ = input.with_prompt("Token");

            Ok(input.interact()?)
        }

        let title = format!("Log in - {}", *metadata::CLIENT_DISPLAY_NAME);

        let input = self
            .executable
            .as_ref()
            .and_then(pinentry::PassphraseInput::with_binary)
            .or_else(pinentry::PassphraseInput::with_default_binary)
            .map(|input| task::spawn_blocking(move || interact(input, &title)));

        Ok(match input {
            Some(fut) => Some(fut.await??),
            None => None,
        })
    }
}

pub(crate) struct RpasswordPrompt;

#[async_trait]
impl Prompt for RpasswordPrompt {
    async fn prompt(&self) -> Result<Option<SecretString>> {
        Ok(Some(
            task::spawn_blocking(|| {
                rpassword::prompt_password("Session token: ").map(SecretString::new)
            })
            .await??,
        ))
    }
}
