mod error;
mod shared;

pub use crate::error::QueueError;
pub use crate::shared::{QueueGuard, QueueStore, SharedQueue};
