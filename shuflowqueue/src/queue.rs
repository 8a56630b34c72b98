use crate::error::{QueueError, Result};
use crate::upstream::Upstream;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

/// Number of items kept ready ahead of the cursor
pub const DEFAULT_LOOKAHEAD: usize = 5;

type Fetch = Shared<BoxFuture<'static, Result<()>>>;

struct State<T> {
    items: Vec<T>,
    /// Position of the next item to return, `0..=items.len()`
    index: usize,
    /// Set by `previous()`: the next forward step skips the replayed item
    reverse: bool,
    stopped: bool,
    inflight: Option<Fetch>,
}

struct Inner<U: Upstream> {
    upstream: Arc<U>,
    size: usize,
    state: Mutex<State<U::Item>>,
}

impl<U: Upstream> Inner<U> {
    // Never held across an await
    fn lock(&self) -> MutexGuard<'_, State<U::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_low(&self, state: &State<U::Item>) -> bool {
        state.items.len() - state.index < self.size
    }

    /// Join the fetch in flight, or start one unless stopped
    fn schedule(this: &Arc<Self>, state: &mut State<U::Item>) -> Option<Fetch> {
        if state.stopped {
            return None;
        }
        if let Some(fetch) = &state.inflight {
            return Some(fetch.clone());
        }

        trace!("Requesting item {} from upstream", state.items.len());
        let handle = tokio::spawn(fetch_one(Arc::clone(this)));
        let fetch = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(QueueError::Task(e.to_string())),
            }
        }
        .boxed()
        .shared();
        state.inflight = Some(fetch.clone());
        Some(fetch)
    }
}

fn fetch_one<U: Upstream>(inner: Arc<Inner<U>>) -> BoxFuture<'static, Result<()>> {
    async move {
        let result = inner.upstream.next_item().await;

        let mut state = inner.lock();
        state.inflight = None;
        match result {
            Ok(Some(_)) if state.stopped => {
                debug!("Queue stopped, discarding fetched item");
                Ok(())
            }
            Ok(Some(item)) => {
                state.items.push(item);
                if inner.is_low(&state) {
                    Inner::schedule(&inner, &mut state);
                }
                Ok(())
            }
            Ok(None) => {
                trace!("Upstream has nothing to offer");
                Ok(())
            }
            Err(e) => {
                warn!("Upstream fetch failed: {:#}", e);
                Err(QueueError::Upstream(Arc::new(e)))
            }
        }
    }
    .boxed()
}

/// Append-only playback buffer with a movable cursor.
///
/// Cloning the queue yields another handle on the same buffer.
pub struct LookaheadQueue<U: Upstream> {
    inner: Arc<Inner<U>>,
}

impl<U: Upstream> Clone for LookaheadQueue<U> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<U: Upstream> LookaheadQueue<U> {
    /// `size` is the low-water mark; zero disables background fetching
    pub fn new(upstream: Arc<U>, size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                upstream,
                size,
                state: Mutex::new(State {
                    items: Vec::new(),
                    index: 0,
                    reverse: false,
                    stopped: false,
                    inflight: None,
                }),
            }),
        }
    }

    /// Start filling the buffer without waiting
    pub fn prime(&self) {
        let mut state = self.inner.lock();
        if self.inner.is_low(&state) {
            Inner::schedule(&self.inner, &mut state);
        }
    }

    /// Next item, from the buffer if possible, otherwise from upstream.
    ///
    /// `Ok(None)` is end of stream for now: a later call asks upstream again.
    pub async fn next(&self) -> Result<Option<U::Item>> {
        let fetch = {
            let mut state = self.inner.lock();
            if state.reverse {
                state.reverse = false;
                state.index += 1;
            }
            if state.index < state.items.len() {
                None
            } else {
                Inner::schedule(&self.inner, &mut state)
            }
        };

        if let Some(fetch) = fetch {
            fetch.await?;
        }

        let mut state = self.inner.lock();
        if state.index >= state.items.len() {
            return Ok(None);
        }
        let item = state.items[state.index].clone();
        state.index += 1;
        if self.inner.is_low(&state) {
            Inner::schedule(&self.inner, &mut state);
        }
        Ok(Some(item))
    }

    /// Step back to the last returned item, `None` at the start of history
    pub fn previous(&self) -> Option<U::Item> {
        let mut state = self.inner.lock();
        if state.index == 0 {
            return None;
        }
        state.index -= 1;
        state.reverse = true;
        Some(state.items[state.index].clone())
    }

    /// Stop fetching and wait for the fetch in flight.
    ///
    /// Buffered items stay reachable; anything fetched after this is dropped.
    pub async fn stop(&self) {
        let fetch = {
            let mut state = self.inner.lock();
            state.stopped = true;
            state.inflight.clone()
        };
        if let Some(fetch) = fetch {
            if let Err(e) = fetch.await {
                debug!("Fetch in flight failed during stop: {}", e);
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.lock().stopped
    }

    /// Number of buffered items, history included
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self) -> usize {
        self.inner.lock().index
    }

    /// Snapshot of every buffered item, oldest first
    pub fn history(&self) -> Vec<U::Item> {
        self.inner.lock().items.clone()
    }

    pub fn lookahead(&self) -> usize {
        self.inner.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        calls: AtomicUsize,
        limit: usize,
    }

    #[async_trait]
    impl Upstream for Counter {
        type Item = usize;

        async fn next_item(&self) -> anyhow::Result<Option<usize>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((n < self.limit).then_some(n))
        }
    }

    #[tokio::test]
    async fn test_previous_at_start_is_none() {
        let queue = LookaheadQueue::new(
            Arc::new(Counter {
                calls: AtomicUsize::new(0),
                limit: 10,
            }),
            0,
        );
        assert_eq!(queue.previous(), None);
        assert_eq!(queue.next().await.unwrap(), Some(0));
        assert_eq!(queue.previous(), Some(0));
        assert_eq!(queue.previous(), None);
        assert_eq!(queue.position(), 0);
    }

    #[tokio::test]
    async fn test_cursor_never_exceeds_buffer() {
        let queue = LookaheadQueue::new(
            Arc::new(Counter {
                calls: AtomicUsize::new(0),
                limit: 2,
            }),
            0,
        );
        assert_eq!(queue.next().await.unwrap(), Some(0));
        assert_eq!(queue.next().await.unwrap(), Some(1));
        assert_eq!(queue.previous(), Some(1));
        assert_eq!(queue.next().await.unwrap(), None);
        assert_eq!(queue.position(), queue.len());
        assert_eq!(queue.history(), vec![0, 1]);
    }
}
