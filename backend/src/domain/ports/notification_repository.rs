//! Port for user notifications.

use async_trait::async_trait;

use crate::domain::{Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}" ; service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}" ; internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Notifications addressed to `user_id`, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Mark one notification read.
    ///
    /// Returns `false` when no notification with `id` belongs to `user_id`.
    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;
}
