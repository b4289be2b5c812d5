use anyhow::{Context, Result};
use snapcmp::SnapshotStore;

use crate::report::html;

fn open_in_browser(path: &std::path::Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    let cmd = "open";
    #[cfg(target_os = "linux")]
    let cmd = "xdg-open";
    #[cfg(target_os = "windows")]
    let cmd = "start";

    std::process::Command::new(cmd)
        .arg(path)
        .spawn()
        .context("Failed to open report in browser")?;
    Ok(())
}

/// `snapcmp review` — generate static HTML report.
pub fn review(open: bool) -> Result<()> {
    let store = SnapshotStore::default();
    let report = html::generate(&store)?;
    println!("Report written to {report}");

    if open {
        let report_path = html::report_path(&store);
        let path = std::fs::canonicalize(&report_path).unwrap_or(report_path);
        open_in_browser(&path)?;
    }

    Ok(())
}
