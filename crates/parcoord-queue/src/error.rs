use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("saving queue state failed: {0}")]
    Save(#[from] anyhow::Error),
}
