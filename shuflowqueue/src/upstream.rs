use async_trait::async_trait;

/// Producer feeding a [`crate::LookaheadQueue`].
///
/// `Ok(None)` means nothing is available right now; the queue reports it as
/// end of stream and asks again on the next call.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    async fn next_item(&self) -> anyhow::Result<Option<Self::Item>>;
}
