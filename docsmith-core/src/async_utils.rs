//! Async utilities and patterns
//!
//! Provides timeouts and bounded fan-out over spawned tasks

use crate::error::{DocsmithError, DocsmithResult, ErrorContext};
use futures::stream::{self, BoxStream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{timeout, Duration};

/// One worker per available processing unit
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Timeout wrapper for async operations
pub async fn with_timeout<F, T>(
    future: F,
    timeout_ms: u64,
    operation_name: &str,
) -> DocsmithResult<T>
where
    F: Future<Output = T>,
{
    match timeout(Duration::from_millis(timeout_ms), future).await {
        Ok(result) => Ok(result),
        Err(_) => Err(DocsmithError::Timeout {
            operation: operation_name.to_string(),
            duration_ms: timeout_ms,
            context: ErrorContext::new("async_utils")
                .with_operation("timeout")
                .with_metadata("timeout_ms", &timeout_ms.to_string())
                .with_suggestion("Increase llm.timeout_secs")
                .with_suggestion("Verify the model service is responsive"),
        }),
    }
}

/// Run `processor` over `items` on spawned tasks, at most `max_concurrent` at a
/// time, yielding each result as soon as its task finishes.
///
/// Dropping the stream aborts tasks still in flight; items not yet started are
/// never spawned.
pub fn spawn_unordered<I, T, R, F, Fut>(
    items: I,
    max_concurrent: usize,
    processor: F,
) -> BoxStream<'static, DocsmithResult<R>>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    stream::iter(items)
        .map(move |item| {
            let processor = processor.clone();
            AbortOnDrop(tokio::spawn(async move { processor(item).await }))
        })
        .buffer_unordered(max_concurrent.max(1))
        .map(|joined| joined.map_err(join_error))
        .boxed()
}

/// Like [`spawn_unordered`], but results come out in input order
pub fn spawn_ordered<I, T, R, F, Fut>(
    items: I,
    max_concurrent: usize,
    processor: F,
) -> BoxStream<'static, DocsmithResult<R>>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    stream::iter(items)
        .map(move |item| {
            let processor = processor.clone();
            AbortOnDrop(tokio::spawn(async move { processor(item).await }))
        })
        .buffered(max_concurrent.max(1))
        .map(|joined| joined.map_err(join_error))
        .boxed()
}

/// Join handle that aborts its task when dropped before completion
struct AbortOnDrop<R>(JoinHandle<R>);

impl<R> Future for AbortOnDrop<R> {
    type Output = Result<R, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<R> Drop for AbortOnDrop<R> {
    fn drop(&mut self) {
        // No-op for a task that already finished
        self.0.abort();
    }
}

fn join_error(join_error: JoinError) -> DocsmithError {
    DocsmithError::Internal {
        message: format!("Task join error: {}", join_error),
        source: Some(Box::new(join_error)),
        context: ErrorContext::new("async_utils")
            .with_operation("spawn")
            .with_suggestion("Check for panics in concurrent tasks"),
    }
}
