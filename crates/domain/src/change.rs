use crate::workshop::Workshop;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Insert,
    Update,
    Replace,
    Delete,
}

/// A single event from the record store's ordered mutation stream. Delivery
/// is at-least-once, so consumers must be idempotent. `token` is the resume
/// position directly after this event.
#[derive(Debug, Clone)]
pub struct WorkshopChange {
    pub op: ChangeOp,
    pub before: Option<Workshop>,
    pub after: Option<Workshop>,
    pub token: String,
}
