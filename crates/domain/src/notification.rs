use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// The closed set of notification kinds the engine can emit. Exactly one
/// kind is associated with every `LedgerEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewWorkshop,
    ScheduleChange,
    PriceDrop,
    Reopened,
    Reminder24h,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewWorkshop => "new_workshop",
            Self::ScheduleChange => "schedule_change",
            Self::PriceDrop => "price_drop",
            Self::Reopened => "reopened",
            Self::Reminder24h => "reminder_24h",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum InvalidNotificationKindError {
    #[error("Notification kind: {0} is not recognized")]
    Unrecognized(String),
}

impl FromStr for NotificationKind {
    type Err = InvalidNotificationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_workshop" => Ok(Self::NewWorkshop),
            "schedule_change" => Ok(Self::ScheduleChange),
            "price_drop" => Ok(Self::PriceDrop),
            "reopened" => Ok(Self::Reopened),
            "reminder_24h" => Ok(Self::Reminder24h),
            _ => Err(InvalidNotificationKindError::Unrecognized(s.to_string())),
        }
    }
}

/// One row of the delivery ledger. Rows are created at claim time with
/// `is_sent = true`, never updated afterwards, and deleted only by the
/// retention sweep. At most one row exists per
/// (`user_id`, `workshop_slug`, `kind`); the unique constraint backing that
/// invariant is the system's only synchronization primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub user_id: ID,
    pub workshop_slug: String,
    pub organizer_id: ID,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub is_sent: bool,
    pub sent_at: i64,
    pub created_at: i64,
}

impl LedgerEntry {
    pub fn new(
        user_id: ID,
        workshop: &crate::workshop::Workshop,
        kind: NotificationKind,
        title: String,
        body: String,
        now_millis: i64,
    ) -> Self {
        Self {
            user_id,
            workshop_slug: workshop.slug.clone(),
            organizer_id: workshop.organizer_ids.first().cloned().unwrap_or_default(),
            kind,
            title,
            body,
            is_sent: true,
            sent_at: now_millis,
            created_at: now_millis,
        }
    }
}
