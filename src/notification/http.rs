// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client, Method, Response, StatusCode};
use url::Url;

use crate::{
    auth::Session,
    error::{self, Result},
    metadata,
};

use super::{Action, NotificationId, NotificationRecord, Source};

/// Talks to the HuddleUp REST API.
///
/// | action    | request                                 |
/// |-----------|-----------------------------------------|
/// | list      | `GET {api}/notifications`               |
/// | accept    | `POST {api}/notifications/{id}/accept`  |
/// | decline   | `POST {api}/notifications/{id}/decline` |
/// | dismiss   | `DELETE {api}/notifications/{id}`       |
/// | mark read | `PATCH {api}/notifications/{id}/read`   |
pub(crate) struct HttpSource {
    client: Client,
    api_url: Url,
}

impl HttpSource {
    pub(crate) fn new(api_url: Url, timeout: Duration) -> Result<Self> {
        if api_url.cannot_be_a_base() {
            return Err(error::Error::UrlBase(api_url));
        }

        let client = Client::builder()
            .user_agent(metadata::USER_AGENT.as_str())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, api_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            _ = path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        session: &Session,
    ) -> Result<Response, error::Fetch> {
        debug!("Sending {} {}", method, url);

        let resp = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, session.authorization())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        match resp.status() {
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Err(error::Fetch::AuthRejected(status))
            }
            status if !status.is_success() => Err(error::Fetch::UnexpectedStatus(status)),
            _ => Ok(resp),
        }
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn list(&self, session: &Session) -> Result<Vec<NotificationRecord>, error::Fetch> {
        let body = self
            .send(Method::GET, self.endpoint(&["notifications"]), session)
            .await?
            .bytes()
            .await?;

        serde_json::from_slice(&body).map_err(error::Fetch::MalformedResponse)
    }

    async fn respond(
        &self,
        session: &Session,
        id: &NotificationId,
        action: Action,
    ) -> Result<(), error::Fetch> {
        let (method, url) = match action {
            Action::Accept => (
                Method::POST,
                self.endpoint(&["notifications", id.as_str(), "accept"]),
            ),
            Action::Decline => (
                Method::POST,
                self.endpoint(&["notifications", id.as_str(), "decline"]),
            ),
            Action::Dismiss => (
                Method::DELETE,
                self.endpoint(&["notifications", id.as_str()]),
            ),
            Action::MarkRead => (
                Method::PATCH,
                self.endpoint(&["notifications", id.as_str(), "read"]),
            ),
        };

        _ = self.send(method, url, session).await?;
        Ok(())
    }
}
