use std::future::Future;

use tokio::task::JoinSet;
use tracing::debug;

use crate::error::UploadError;

/// Default number of concurrent requests per batch
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Run `f` over `items` in sequential batches of at most `batch_size`
/// concurrent tasks. Results come back in input order; the first error
/// aborts the rest of its batch and every later batch.
pub async fn upload_in_batches<T, R, F, Fut>(
    items: Vec<T>,
    batch_size: usize,
    f: F,
) -> Result<Vec<R>, UploadError>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, UploadError>> + Send + 'static,
    R: Send + 'static,
{
    let batch_size = batch_size.max(1);
    let total = items.len();
    let mut results = Vec::with_capacity(total);
    let mut items = items.into_iter();
    let mut start = 0;

    loop {
        let batch: Vec<T> = items.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        debug!(
            batch = start / batch_size + 1,
            first = start + 1,
            last = start + batch.len(),
            total,
            "processing batch"
        );

        let mut slots: Vec<Option<R>> = Vec::with_capacity(batch.len());
        let mut set = JoinSet::new();
        for (offset, item) in batch.into_iter().enumerate() {
            slots.push(None);
            let task = f(item);
            set.spawn(async move { (offset, task.await) });
        }

        while let Some(joined) = set.join_next().await {
            let (offset, result) = joined.map_err(|err| UploadError::Task(err.to_string()))?;
            slots[offset] = Some(result?);
        }

        start += slots.len();
        results.extend(slots.into_iter().flatten());
    }

    Ok(results)
}
