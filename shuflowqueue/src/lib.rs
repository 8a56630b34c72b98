//! # shuflowqueue - Playback queue with history and lookahead
//!
//! [`LookaheadQueue`] buffers items pulled from an [`Upstream`] producer:
//! every realized item is kept, so `previous()` can step back through the
//! history and `next()` replays it before asking the producer again. A
//! background fetch keeps a few items ready ahead of the cursor, with at
//! most one producer call outstanding at any time.
//!
//! ```rust,no_run
//! use shuflowqueue::{LookaheadQueue, Upstream};
//! use std::sync::Arc;
//!
//! # async fn example<U: Upstream>(upstream: Arc<U>) -> shuflowqueue::Result<()> {
//! let queue = LookaheadQueue::new(upstream, 5);
//! while let Some(_item) = queue.next().await? {
//!     // play it
//! }
//! queue.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod queue;
pub mod upstream;

pub use error::{QueueError, Result};
pub use queue::{DEFAULT_LOOKAHEAD, LookaheadQueue};
pub use upstream::Upstream;
