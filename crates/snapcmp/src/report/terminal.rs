use std::io::Write;
use std::time::Duration;

use snapcmp::ComparisonOutcome;

use super::SnapshotStatus;

/// Clear the current terminal line (wipes progress indicator).
pub fn clear_line() {
    print!("\r\x1b[2K");
}

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Short detail shown after a failing snapshot's name.
fn fail_detail(outcome: &ComparisonOutcome, message: &str) -> String {
    match outcome {
        ComparisonOutcome::Different { differing, .. } => {
            let pct = outcome.difference_percentage().unwrap_or(0.0);
            format!("{differing} bytes, {pct:.2}%")
        }
        _ => message.to_string(),
    }
}

/// Print a single snapshot result line.
pub fn print_line(name: &str, status: &SnapshotStatus, elapsed: Duration) {
    clear_line();
    let time_suffix = format!("  \x1b[2m{}\x1b[0m", format_duration(elapsed));

    match status {
        SnapshotStatus::Pass => {
            println!("  \x1b[32mPASS\x1b[0m  {name}{time_suffix}");
        }
        SnapshotStatus::Fail { outcome, message } => {
            let detail = fail_detail(outcome, message);
            println!("  \x1b[31mFAIL\x1b[0m  {name}  ({detail}){time_suffix}");
        }
        SnapshotStatus::New => {
            println!("  \x1b[33m NEW\x1b[0m  {name}  (recorded as reference){time_suffix}");
        }
        SnapshotStatus::Recorded => {
            println!("  \x1b[36m REC\x1b[0m  {name}{time_suffix}");
        }
        SnapshotStatus::Error(msg) => {
            println!("  \x1b[31m ERR\x1b[0m  {name}  ({msg}){time_suffix}");
        }
    }
}

/// Show comparison progress indicator.
pub fn show_progress(done: usize, total: usize) {
    if done < total {
        print!("  Comparing  [{done}/{total}]");
        let _ = std::io::stdout().flush();
    }
}

/// Print an actionable summary listing snapshot names grouped by status.
/// Only prints sections with at least one entry.
pub fn print_actionable_summary(failed: &[String], new: &[String], errored: &[String]) {
    if failed.is_empty() && new.is_empty() && errored.is_empty() {
        return;
    }

    clear_line();
    println!();
    println!("Actionable snapshots:");

    for (label, names) in [("Failed", failed), ("New", new), ("Errored", errored)] {
        if !names.is_empty() {
            println!();
            println!("  {label} ({}):", names.len());
            for name in names {
                println!("    {name}");
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub new: usize,
    pub recorded: usize,
    pub errored: usize,
}

impl Tally {
    pub fn count(&mut self, status: &SnapshotStatus) {
        match status {
            SnapshotStatus::Pass => self.passed += 1,
            SnapshotStatus::Fail { .. } => self.failed += 1,
            SnapshotStatus::New => self.new += 1,
            SnapshotStatus::Recorded => self.recorded += 1,
            SnapshotStatus::Error(_) => self.errored += 1,
        }
    }

    /// Recording with `--record` is deliberate and does not fail the run.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 || self.new > 0 || self.errored > 0 {
            1
        } else {
            0
        }
    }
}

/// Print the final summary.
pub fn print_summary(tally: &Tally, elapsed: Duration) {
    clear_line();
    println!();
    print!(
        "Snapshots:  {} total, \x1b[32m{} passed\x1b[0m, \x1b[31m{} failed\x1b[0m, \x1b[33m{} new\x1b[0m",
        tally.total, tally.passed, tally.failed, tally.new
    );
    if tally.recorded > 0 {
        print!(", \x1b[36m{} recorded\x1b[0m", tally.recorded);
    }
    if tally.errored > 0 {
        print!(", \x1b[31m{} errored\x1b[0m", tally.errored);
    }
    println!();
    println!("Time:       {}", format_duration(elapsed));

    if tally.exit_code() != 0 {
        println!();
        if tally.failed > 0 {
            println!("{} snapshot(s) have visual differences.", tally.failed);
        }
        if tally.new > 0 {
            println!("{} snapshot(s) had no reference and were recorded.", tally.new);
        }
        if tally.errored > 0 {
            println!("{} snapshot(s) could not be compared.", tally.errored);
        }
        println!("Run `snapcmp review` to inspect, `snapcmp approve` to accept.");
    }
}
