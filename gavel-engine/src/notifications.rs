//! Per-recipient notification feed.

use crate::auth::Caller;
use gavel_core::{GavelResult, Notification, NotificationId};
use gavel_storage::Storage;
use std::sync::Arc;

/// Feed reads cap out here unless the caller asks for less.
const DEFAULT_FEED_LIMIT: usize = 50;

/// Read-side access to a recipient's notifications.
#[derive(Clone)]
pub struct NotificationFeed {
    storage: Arc<dyn Storage>,
}

impl NotificationFeed {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The caller's notifications, newest first, capped at 50.
    pub async fn feed(&self, caller: &Caller) -> GavelResult<Vec<Notification>> {
        self.feed_with_limit(caller, DEFAULT_FEED_LIMIT).await
    }

    /// The caller's notifications, newest first, capped at `limit`.
    pub async fn feed_with_limit(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> GavelResult<Vec<Notification>> {
        self.storage
            .notification_list_for(caller.profile_id, limit.min(DEFAULT_FEED_LIMIT))
            .await
    }

    /// Mark one notification read.
    pub async fn mark_read(&self, id: NotificationId) -> GavelResult<()> {
        self.storage.notification_mark_read(id).await
    }

    /// Mark everything in the caller's feed read.
    pub async fn mark_all_read(&self, caller: &Caller) -> GavelResult<()> {
        self.storage
            .notification_mark_all_read(caller.profile_id)
            .await
    }

    /// Unread badge count.
    pub async fn unread_count(&self, caller: &Caller) -> GavelResult<usize> {
        self.storage
            .notification_unread_count(caller.profile_id)
            .await
    }
}
