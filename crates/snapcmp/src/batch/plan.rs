use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use snapcmp::{Precision, SnapshotStore};
use tokio::sync::mpsc;
use tracing::debug;

use super::job::CompareJob;
use super::runner::{JobOutcome, compare_all};

/// Plans and executes a comparison run: discovery of captured PNGs,
/// filtering, concurrent comparison.
pub struct ComparePlan {
    jobs: Vec<CompareJob>,
}

/// Snapshot ID for a captured file: relative path, `/`-separated, no extension.
fn snapshot_id(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

impl ComparePlan {
    /// Collect every `*.png` below `captured_dir`, then apply `filter`.
    pub fn plan(captured_dir: &str, filter: Option<&str>) -> Result<Self> {
        let root = PathBuf::from(captured_dir);
        let pattern = format!("{}/**/*.png", glob::Pattern::escape(captured_dir));
        debug!(%pattern, "collecting captured snapshots");

        let mut jobs = Vec::new();
        for entry in glob::glob(&pattern).context("Invalid captured_dir pattern")? {
            let path = entry.context("Failed to read captured directory")?;
            if let Some(id) = snapshot_id(&root, &path) {
                jobs.push(CompareJob { id, path });
            }
        }
        jobs.sort_by(|a, b| a.id.cmp(&b.id));

        if jobs.is_empty() {
            println!("No captured snapshots found in {captured_dir}/");
            return Ok(Self { jobs });
        }
        println!("Found {} captured snapshot(s)", jobs.len());
        println!();

        if let Some(pattern) = filter {
            jobs.retain(|job| job.matches_filter(pattern));
            if jobs.is_empty() {
                println!("No snapshots match filter");
            }
        }

        Ok(Self { jobs })
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    /// Return the snapshot IDs for all jobs in this run.
    pub fn job_names(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.id.clone()).collect()
    }

    /// Start comparing. Consumes self.
    pub fn execute(
        self,
        store: SnapshotStore,
        precision: Precision,
        record: bool,
        parallel: usize,
    ) -> mpsc::Receiver<(CompareJob, JobOutcome)> {
        compare_all(self.jobs, store, precision, record, parallel)
    }
}
