use crate::canonical::canonical_key;
use crate::dictionary::Word;
use crate::error::{IndexerError, Result};
use crate::merge::{Merger, PartialMap};
use crate::partition::Partition;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Group the words of one partition by anagram key.
pub fn group_partition(words: &[Word], partition: &Partition) -> PartialMap {
    let mut partial = PartialMap::new(partition.id);
    for word in partition.words(words) {
        partial.insert(canonical_key(word), Arc::clone(word));
    }
    partial
}

/// Fixed-size set of grouping workers fed from one job queue.
///
/// Workers run on the blocking pool: they block on the job queue and on publishing their
/// partial map, while the coordinator stays async.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_workers: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub workers: usize,
    pub partitions: usize,
}

type JobQueue = Arc<Mutex<mpsc::Receiver<Partition>>>;

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Dispatch `jobs` in order, group them on the workers and merge every result.
    pub async fn run(
        &self,
        words: Arc<[Word]>,
        jobs: Vec<Partition>,
        merger: &Merger,
    ) -> Result<PoolReport> {
        let partitions = jobs.len();
        if partitions == 0 {
            return Ok(PoolReport::default());
        }
        let workers = self.max_workers.min(partitions);

        let (job_tx, job_rx) = mpsc::channel::<Partition>(1);
        let (result_tx, mut result_rx) = mpsc::channel::<PartialMap>(workers);
        let queue: JobQueue = Arc::new(Mutex::new(job_rx));

        let handles: Vec<JoinHandle<usize>> = (0..workers)
            .map(|worker_id| {
                let words = Arc::clone(&words);
                let queue = Arc::clone(&queue);
                let results = result_tx.clone();
                tokio::task::spawn_blocking(move || {
                    worker_loop(worker_id, &words, &queue, &results)
                })
            })
            .collect();
        drop(result_tx);

        let dispatcher = tokio::spawn(async move {
            for job in jobs {
                if job_tx.send(job).await.is_err() {
                    break;
                }
            }
        });

        let mut received = 0usize;
        while let Some(partial) = result_rx.recv().await {
            received += 1;
            merger.merge(partial)?;
        }

        dispatcher
            .await
            .map_err(|err| IndexerError::WorkerFailed(format!("job dispatcher: {err}")))?;

        let mut processed = 0usize;
        for (worker_id, handle) in handles.into_iter().enumerate() {
            processed += handle
                .await
                .map_err(|err| IndexerError::WorkerFailed(format!("worker {worker_id}: {err}")))?;
        }

        if received != partitions || processed != partitions {
            return Err(IndexerError::IncompleteBuild {
                merged: received.min(processed),
                expected: partitions,
            });
        }

        Ok(PoolReport {
            workers,
            partitions,
        })
    }
}

fn worker_loop(
    worker_id: usize,
    words: &[Word],
    queue: &JobQueue,
    results: &mpsc::Sender<PartialMap>,
) -> usize {
    let mut processed = 0usize;
    loop {
        let job = match queue.lock() {
            Ok(mut rx) => rx.blocking_recv(),
            Err(_) => {
                log::warn!("worker {worker_id}: job queue lock poisoned");
                break;
            }
        };
        let Some(partition) = job else {
            break;
        };

        let partial = group_partition(words, &partition);
        log::debug!(
            "worker {worker_id}: partition {} (length {}) -> {} words in {} classes",
            partition.id,
            partition.length,
            partition.len(),
            partial.classes.len()
        );
        if results.blocking_send(partial).is_err() {
            log::debug!("worker {worker_id}: result channel closed");
            break;
        }
        processed += 1;
    }
    processed
}
