//! Background job scheduler and job implementations.

mod scheduler;
mod store_pool;

pub use scheduler::{Job, JobScheduler};
pub use store_pool::StorePoolJob;
