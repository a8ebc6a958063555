//! Generic bounded-concurrency task executor.
//!
//! Runs independent async operations over an item list with at most K
//! simultaneously active. The executor knows nothing about files or
//! icons; the walker and per-file scanners are built on top of it.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::Semaphore;

use glyphdex_core::ScanError;

/// Boxed error type for per-item failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Callback fired once per completed item with the running total.
pub type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Bounded-concurrency runner over a list of independent operations.
///
/// Cloning is cheap and shares the I/O gate, so nested use anywhere in
/// a recursive descent stays under one global ceiling.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    limit: usize,
    gate: Arc<Semaphore>,
}

impl TaskExecutor {
    /// Create an executor with the given concurrency ceiling.
    ///
    /// A ceiling of zero cannot make progress and is rejected here, as
    /// a configuration failure rather than a runtime fault.
    pub fn new(limit: usize) -> Result<Self, ScanError> {
        if limit == 0 {
            return Err(ScanError::invalid_config(
                "concurrency ceiling must be at least 1",
            ));
        }
        Ok(Self {
            limit,
            gate: Arc::new(Semaphore::new(limit)),
        })
    }

    /// The configured concurrency ceiling.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Route one I/O operation through the shared gate.
    ///
    /// The permit is held only across this single await, never across
    /// recursion, so nested [`run`](Self::run) calls cannot deadlock
    /// while the number of outstanding I/O operations anywhere in a
    /// descent stays bounded by the ceiling.
    pub async fn throttle<F: Future>(&self, operation: F) -> F::Output {
        match self.gate.acquire().await {
            Ok(_permit) => operation.await,
            // The gate is never closed; run unthrottled if it ever is.
            Err(_) => operation.await,
        }
    }

    /// Process every item, at most `limit` concurrently.
    ///
    /// Results are aligned to input order regardless of completion
    /// order. A failing item yields `None` in its slot; the run itself
    /// never aborts. The progress callback fires once per completed
    /// item with a running total.
    pub async fn run<T, R, F>(
        &self,
        items: Vec<T>,
        process: F,
        progress: Option<ProgressFn>,
    ) -> Vec<Option<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> BoxFuture<'static, Result<R, BoxError>> + Send + Sync + 'static,
    {
        self.run_shared(items, Arc::new(process), progress, 0).await
    }

    /// Process items in sequential chunks of `batch_size`, each chunk
    /// internally concurrent. Bounds peak memory for very large inputs;
    /// the progress total continues across chunks.
    pub async fn run_batched<T, R, F>(
        &self,
        items: Vec<T>,
        batch_size: usize,
        process: F,
        progress: Option<ProgressFn>,
    ) -> Vec<Option<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> BoxFuture<'static, Result<R, BoxError>> + Send + Sync + 'static,
    {
        let batch_size = batch_size.max(1);
        let process = Arc::new(process);
        let mut results = Vec::with_capacity(items.len());
        let mut pending = items;
        let mut completed_base = 0usize;

        while !pending.is_empty() {
            let rest = pending.split_off(batch_size.min(pending.len()));
            let batch_len = pending.len();
            let batch = std::mem::replace(&mut pending, rest);
            results.extend(
                self.run_shared(batch, Arc::clone(&process), progress.clone(), completed_base)
                    .await,
            );
            completed_base += batch_len;
        }
        results
    }

    async fn run_shared<T, R, F>(
        &self,
        items: Vec<T>,
        process: Arc<F>,
        progress: Option<ProgressFn>,
        completed_base: usize,
    ) -> Vec<Option<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> BoxFuture<'static, Result<R, BoxError>> + Send + Sync + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        // The cursor is the only shared mutable state between workers:
        // each claims the next index, processes, records, reports.
        let slots: Arc<Vec<Mutex<Option<T>>>> =
            Arc::new(items.into_iter().map(|item| Mutex::new(Some(item))).collect());
        let results: Arc<Vec<Mutex<Option<R>>>> =
            Arc::new((0..total).map(|_| Mutex::new(None)).collect());
        let cursor = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(completed_base));

        let workers = self.limit.min(total);
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let slots = Arc::clone(&slots);
            let results = Arc::clone(&results);
            let cursor = Arc::clone(&cursor);
            let completed = Arc::clone(&completed);
            let process = Arc::clone(&process);
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= total {
                        break;
                    }
                    let Some(item) = slots[index].lock().ok().and_then(|mut slot| slot.take())
                    else {
                        continue;
                    };
                    match process.as_ref()(item).await {
                        Ok(output) => {
                            if let Ok(mut slot) = results[index].lock() {
                                *slot = Some(output);
                            }
                        }
                        Err(error) => {
                            tracing::debug!(index, %error, "task failed; slot left empty");
                        }
                    }
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(report) = progress.as_deref() {
                        report(done);
                    }
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        // All workers joined, so the results arc is unique again.
        Arc::try_unwrap(results)
            .map(|slots| {
                slots
                    .into_iter()
                    .map(|slot| slot.into_inner().unwrap_or(None))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Race an operation against a timer, substituting `default` on expiry.
pub async fn with_timeout<F>(operation: F, limit: Duration, default: F::Output) -> F::Output
where
    F: Future,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(output) => output,
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(value: u32) -> BoxFuture<'static, Result<u32, BoxError>> {
        Box::pin(async move { Ok(value * 2) })
    }

    #[tokio::test]
    async fn test_results_align_to_input_order() {
        let executor = TaskExecutor::new(4).unwrap();
        let results = executor
            .run(
                vec![3u32, 1, 4, 1, 5],
                |value| {
                    Box::pin(async move {
                        // Larger values finish later; order must still hold.
                        tokio::time::sleep(Duration::from_millis(u64::from(value))).await;
                        Ok(value * 10)
                    }) as BoxFuture<'static, Result<u32, BoxError>>
                },
                None,
            )
            .await;
        assert_eq!(
            results,
            vec![Some(30), Some(10), Some(40), Some(10), Some(50)]
        );
    }

    #[tokio::test]
    async fn test_failing_item_leaves_empty_slot() {
        let executor = TaskExecutor::new(2).unwrap();
        let results = executor
            .run(
                vec![1u32, 2, 3],
                |value| {
                    Box::pin(async move {
                        if value == 2 {
                            Err::<u32, BoxError>("boom".into())
                        } else {
                            Ok(value)
                        }
                    }) as BoxFuture<'static, Result<u32, BoxError>>
                },
                None,
            )
            .await;
        assert_eq!(results, vec![Some(1), None, Some(3)]);
    }

    #[tokio::test]
    async fn test_progress_counts_every_completion() {
        let executor = TaskExecutor::new(3).unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_callback = Arc::clone(&seen);
        let progress: ProgressFn = Arc::new(move |done| {
            seen_in_callback.fetch_max(done, Ordering::SeqCst);
        });
        let results = executor
            .run(vec![1u32, 2, 3, 4, 5], double, Some(progress))
            .await;
        assert_eq!(results.len(), 5);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_batched_progress_continues_across_chunks() {
        let executor = TaskExecutor::new(2).unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_callback = Arc::clone(&seen);
        let progress: ProgressFn = Arc::new(move |done| {
            seen_in_callback.fetch_max(done, Ordering::SeqCst);
        });
        let results = executor
            .run_batched((1u32..=7).collect(), 3, double, Some(progress))
            .await;
        assert_eq!(results.len(), 7);
        assert_eq!(results[6], Some(14));
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_config_error() {
        assert!(TaskExecutor::new(0).is_err());
    }

    #[tokio::test]
    async fn test_with_timeout_substitutes_default() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            42u32
        };
        let value = with_timeout(slow, Duration::from_millis(10), 7).await;
        assert_eq!(value, 7);

        let fast = async { 42u32 };
        let value = with_timeout(fast, Duration::from_millis(100), 7).await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let executor = TaskExecutor::new(2).unwrap();
        let results = executor.run(Vec::<u32>::new(), double, None).await;
        assert!(results.is_empty());
    }
}
