// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::{auth::Session, error};

use super::{Action, NotificationId, NotificationRecord};

/// The remote source of truth for a user's notifications.
#[async_trait]
pub(crate) trait Source {
    async fn list(&self, session: &Session) -> Result<Vec<NotificationRecord>, error::Fetch>;

    async fn respond(
        &self,
        session: &Session,
        id: &NotificationId,
        action: Action,
    ) -> Result<(), error::Fetch>;
}
