// Batch orchestration — many texts, bounded concurrency, partial failure.
//
// One task is spawned per item. A semaphore admits at most
// `settings.concurrency` of them into the pipeline at once; the rest wait for
// a slot. Every task sends its (index, outcome) over a channel and a single
// aggregator drains it once all workers are done, so no result collection is
// shared between tasks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use super::analyze::Analyzer;
use crate::db::models::AnalysisRecord;
use crate::error::{AnalysisError, ProviderError};

/// One item of a batch that did not produce a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Position in the submitted batch
    pub index: usize,
    pub reason: String,
}

/// Everything a batch produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Stored records in submission order. Failed items are simply absent.
    pub successes: Vec<AnalysisRecord>,
    /// Sorted by index
    pub failures: Vec<BatchFailure>,
}

/// Reject a batch before any work starts.
pub fn validate_batch_size(size: usize, max: usize) -> Result<(), AnalysisError> {
    if size == 0 {
        return Err(AnalysisError::EmptyBatch);
    }
    if size > max {
        return Err(AnalysisError::BatchTooLarge { size, max });
    }
    Ok(())
}

impl Analyzer {
    /// Analyze up to `max_batch_size` texts concurrently.
    ///
    /// Fails as a whole only for an empty or oversized batch. Individual
    /// items (including blank texts) fail into `BatchOutcome::failures`
    /// without affecting the others. Returns once every item has finished.
    pub async fn run_batch(&self, texts: Vec<String>) -> Result<BatchOutcome, AnalysisError> {
        validate_batch_size(texts.len(), self.settings().max_batch_size)?;

        let total = texts.len();
        let item_timeout = self.settings().item_timeout;
        let gate = Arc::new(Semaphore::new(self.settings().concurrency.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<AnalysisRecord, AnalysisError>)>();

        let mut workers = Vec::with_capacity(total);
        for (index, text) in texts.into_iter().enumerate() {
            let analyzer = self.clone();
            let gate = Arc::clone(&gate);
            let tx = tx.clone();

            workers.push(tokio::spawn(async move {
                let outcome = if text.trim().is_empty() {
                    Err(AnalysisError::EmptyInput)
                } else {
                    match gate.acquire().await {
                        Ok(_permit) => analyzer.run_item(&text, item_timeout).await,
                        Err(_) => Err(AnalysisError::Provider(ProviderError::Cancelled)),
                    }
                };
                // The receiver outlives every worker, so this can't fail
                let _ = tx.send((index, outcome));
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<AnalysisRecord>> = vec![None; total];
        let mut failures = Vec::new();

        while let Some((index, outcome)) = rx.recv().await {
            match outcome {
                Ok(record) => slots[index] = Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Batch item failed");
                    failures.push(BatchFailure {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // A panicked worker never reports; record it against its index
        for (index, worker) in workers.into_iter().enumerate() {
            if let Err(e) = worker.await {
                warn!(index, error = %e, "Batch worker aborted");
                failures.push(BatchFailure {
                    index,
                    reason: format!("Analysis failed: worker aborted: {e}"),
                });
            }
        }

        failures.sort_by_key(|f| f.index);
        let successes: Vec<AnalysisRecord> = slots.into_iter().flatten().collect();

        info!(
            total,
            succeeded = successes.len(),
            failed = failures.len(),
            "Batch complete"
        );

        Ok(BatchOutcome {
            successes,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_batch_size() {
        assert!(matches!(
            validate_batch_size(0, 10),
            Err(AnalysisError::EmptyBatch)
        ));
        assert!(matches!(
            validate_batch_size(11, 10),
            Err(AnalysisError::BatchTooLarge { size: 11, max: 10 })
        ));
        assert!(validate_batch_size(1, 10).is_ok());
        assert!(validate_batch_size(10, 10).is_ok());
    }
}
