mod change;
mod checkpoint;
mod notification;
mod shared;
mod subscription;
mod workshop;

pub use change::{ChangeOp, WorkshopChange};
pub use checkpoint::StreamCheckpoint;
pub use notification::{InvalidNotificationKindError, LedgerEntry, NotificationKind};
pub use shared::entity::{InvalidIDError, ID};
pub use subscription::Subscription;
pub use workshop::{PriceTier, SessionSlot, Workshop};
