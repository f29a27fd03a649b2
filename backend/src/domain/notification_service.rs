//! Notification inbox use-cases.

use std::sync::Arc;

use super::ports::NotificationRepository;
use super::{Error, Notification, NotificationId, UserId};

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// The caller's notifications, newest first.
    pub async fn list(&self, user_id: &UserId, unread_only: bool) -> Result<Vec<Notification>, Error> {
        Ok(self.notifications.list_for_user(user_id, unread_only).await?)
    }

    /// Mark one of the caller's notifications as read.
    ///
    /// Notifications addressed to someone else are reported as not found.
    pub async fn mark_read(&self, user_id: &UserId, id: &NotificationId) -> Result<(), Error> {
        if self.notifications.mark_read(user_id, id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("notification {id} not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockNotificationRepository;
    use rstest::rstest;

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn mark_read_reports_foreign_notifications_as_missing(
        #[case] owned: bool,
        #[case] expected: Option<ErrorCode>,
    ) {
        let mut repo = MockNotificationRepository::new();
        repo.expect_mark_read().returning(move |_, _| Ok(owned));
        let service = NotificationService::new(Arc::new(repo));

        let result = service
            .mark_read(&UserId::random(), &NotificationId::random())
            .await;

        assert_eq!(result.err().map(|err| err.code()), expected);
    }
}
