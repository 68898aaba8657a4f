use crate::utils::error::{MeetError, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Drives all futures concurrently on the current task and returns their
/// outputs in input order, whatever order they complete in.
///
/// The first error ends the batch: the futures still pending are dropped,
/// which cancels their in-flight requests, and the error is returned as is.
pub async fn join_ordered<I, F, T>(stage: &str, futures: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    let mut pending: FuturesUnordered<_> = futures
        .into_iter()
        .enumerate()
        .map(|(index, fut)| async move { (index, fut.await) })
        .collect();

    let total = pending.len();
    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();

    while let Some((index, outcome)) = pending.next().await {
        match outcome {
            Ok(value) => slots[index] = Some(value),
            Err(e) => {
                let cancelled = pending.len();
                drop(pending);
                tracing::warn!(
                    "{}: call {}/{} failed, cancelled {} pending: {}",
                    stage,
                    index + 1,
                    total,
                    cancelled,
                    e
                );
                return Err(e);
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| MeetError::invariant(format!("{}: missing result #{}", stage, index)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let delays = [40u64, 10, 25, 0];
        let futures = delays.iter().enumerate().map(|(i, delay)| async move {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
            Ok::<_, MeetError>(i)
        });

        let results = join_ordered("test", futures).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let futures: Vec<std::future::Ready<Result<u8>>> = vec![];
        assert!(join_ordered("test", futures).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_cancels_siblings() {
        let finished = Arc::new(AtomicBool::new(false));

        let slow = {
            let finished = finished.clone();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                finished.store(true, Ordering::SeqCst);
                Ok(1)
            }) as std::pin::Pin<Box<dyn Future<Output = Result<i32>> + Send>>
        };
        let failing = Box::pin(async { Err(MeetError::invalid_input("x", "boom")) })
            as std::pin::Pin<Box<dyn Future<Output = Result<i32>> + Send>>;

        let err = join_ordered("test", vec![slow, failing]).await.unwrap_err();
        assert!(matches!(err, MeetError::InvalidInput { .. }));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
