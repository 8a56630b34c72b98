use std::sync::Arc;

/// Errors surfaced by [`crate::LookaheadQueue::next`]
///
/// Cloneable so that every caller waiting on the same fetch receives it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    #[error("Upstream failed: {0:#}")]
    Upstream(Arc<anyhow::Error>),

    #[error("Fetch task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;
