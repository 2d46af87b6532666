use thiserror::Error;

use crate::coordinator::JobKind;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("coordinator busy with {current:?}")]
    Busy { current: JobKind },

    #[error("NZB not found: {0}")]
    UnknownNzb(u32),

    #[error("NZB {0} has no post-processing job")]
    NoPostInfo(u32),
}
