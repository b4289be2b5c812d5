use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use snapcmp::{Precision, RasterBitmap, ReportSink, SnapshotResult, SnapshotStore};
use tokio::sync::{Mutex, mpsc};
use tracing::{Instrument, debug, debug_span, info_span, warn};

use super::job::CompareJob;
use crate::report::SnapshotStatus;

/// Per-snapshot result of a run.
#[derive(Debug)]
pub struct JobOutcome {
    pub status: SnapshotStatus,
    pub elapsed: Duration,
}

/// Load the captured PNG and check it against the store. Blocking.
fn run_job(
    store: &mut SnapshotStore,
    job: &CompareJob,
    precision: Precision,
    record: bool,
) -> Result<SnapshotStatus> {
    let bytes =
        std::fs::read(&job.path).with_context(|| format!("Failed to read {}", job.path.display()))?;
    let candidate = RasterBitmap::from_png(&bytes, store.scale_for(&job.id))
        .with_context(|| format!("Failed to decode {}", job.path.display()))?;

    if record {
        store.write_reference(&job.id, &candidate)?;
        return Ok(SnapshotStatus::Recorded);
    }

    let result = store.assert_snapshot(&job.id, &candidate, precision)?;
    if let SnapshotResult::Compared(verdict) = &result {
        store.record(&job.id, verdict)?;
    }
    Ok(SnapshotStatus::from_result(&result))
}

/// Compare a list of jobs on `parallel` workers sharing one queue.
///
/// Each comparison runs on the blocking pool; failures are reported
/// per-snapshot rather than aborting the run.
///
/// Returns a `Receiver` immediately; results stream in as comparisons finish.
pub fn compare_all(
    jobs: Vec<CompareJob>,
    store: SnapshotStore,
    precision: Precision,
    record: bool,
    parallel: usize,
) -> mpsc::Receiver<(CompareJob, JobOutcome)> {
    let job_count = jobs.len();
    let worker_count = job_count.min(parallel.max(1));
    debug!(
        jobs = job_count,
        workers = worker_count,
        parallel,
        "starting comparison run"
    );

    let queue = Arc::new(Mutex::new(jobs));
    let (tx, rx) = mpsc::channel(parallel.max(1) * 2);

    let mut set = tokio::task::JoinSet::new();
    for idx in 0..worker_count {
        let queue = queue.clone();
        let tx = tx.clone();
        let store = store.clone();
        let span = info_span!("worker", id = idx);
        set.spawn(
            async move {
                debug!("started");
                loop {
                    let Some(job) = queue.lock().await.pop() else {
                        debug!("queue empty, exiting");
                        break;
                    };

                    let start = Instant::now();
                    let mut store = store.clone();
                    let blocking_job = job.clone();
                    let compare_span = debug_span!("compare", job = %job.id);
                    let status = tokio::task::spawn_blocking(move || {
                        let _guard = compare_span.enter();
                        run_job(&mut store, &blocking_job, precision, record)
                    })
                    .await
                    .context("Comparison task panicked")
                    .and_then(|r| r)
                    .unwrap_or_else(|e| {
                        warn!(job = %job.id, error = %format!("{e:#}"), "comparison failed");
                        SnapshotStatus::Error(format!("{e:#}"))
                    });

                    let outcome = JobOutcome {
                        status,
                        elapsed: start.elapsed(),
                    };
                    if tx.send((job, outcome)).await.is_err() {
                        warn!("channel send failed (receiver dropped), stopping");
                        break;
                    }
                }
                debug!("exiting");
            }
            .instrument(span),
        );
    }

    // Drop the original sender so the channel closes with the last worker.
    drop(tx);

    tokio::spawn(async move {
        while let Some(result) = set.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "worker task panicked");
            }
        }
        debug!("all workers done");
    });

    rx
}
