//! In-app notifications addressed to a single user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClinicId, NotificationId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub clinic_id: Option<ClinicId>,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
