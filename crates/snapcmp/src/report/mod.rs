pub mod html;
pub mod terminal;

use snapcmp::{ComparisonOutcome, SnapshotResult};

/// Status of a single snapshot in a `test` run.
#[derive(Debug)]
pub enum SnapshotStatus {
    Pass,
    Fail {
        outcome: ComparisonOutcome,
        message: String,
    },
    /// No reference existed, the capture was recorded as one.
    New,
    /// `--record`: the reference was overwritten.
    Recorded,
    Error(String),
}

impl SnapshotStatus {
    pub fn from_result(result: &SnapshotResult) -> Self {
        match result {
            SnapshotResult::Recorded { .. } => Self::New,
            SnapshotResult::Compared(v) if v.pass() => Self::Pass,
            SnapshotResult::Compared(v) => Self::Fail {
                outcome: v.outcome,
                message: v.message.clone().unwrap_or_default(),
            },
        }
    }
}
