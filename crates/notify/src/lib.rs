mod audience;
mod classifier;
mod dispatcher;
mod job_schedulers;
mod message;
mod observer;
mod reminders;
mod retention;
mod shared;

pub use audience::{resolve_audience, Recipient};
pub use classifier::classify;
pub use dispatcher::{DispatchNotificationsUseCase, DispatchSummary};
pub use job_schedulers::{millis_to_next_tick, start_reminders_job, start_retention_job};
pub use observer::run_workshop_observer;
pub use reminders::SendRemindersUseCase;
pub use retention::PurgeLedgerUseCase;
pub use shared::usecase::{execute, UseCase};
