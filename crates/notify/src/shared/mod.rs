pub mod backoff;
pub mod usecase;
