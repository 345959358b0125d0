use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};

/// A user following an organizer (artist). Owned and mutated by the user
/// preferences subsystem; the notification engine only ever reads these.
/// `device_token` is the push delivery address and may be empty if the user
/// never granted push permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: ID,
    pub organizer_id: ID,
    pub enabled: bool,
    pub device_token: String,
}
