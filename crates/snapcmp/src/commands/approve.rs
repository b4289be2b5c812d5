use anyhow::{Context, Result};
use snapcmp::{ArtifactKind, SnapshotStore};

use crate::batch::matches_filter;

/// `snapcmp approve` — promote failure/ snapshots to reference/.
pub fn approve(filter: Option<&str>) -> Result<()> {
    let count = approve_in(&SnapshotStore::default(), filter)?;
    if count > 0 {
        println!();
        println!("{count} snapshot(s) approved.");
    }
    Ok(())
}

fn approve_in(store: &SnapshotStore, filter: Option<&str>) -> Result<usize> {
    let ids = store.list_ids(ArtifactKind::Failure);
    if ids.is_empty() {
        println!("Nothing to approve — failure/ is empty.");
        return Ok(0);
    }

    let filtered: Vec<&String> = ids
        .iter()
        .filter(|id| filter.is_none_or(|pat| matches_filter(id, pat)))
        .collect();

    if filtered.is_empty() {
        println!("No snapshots matched the given filter.");
        return Ok(0);
    }

    for id in &filtered {
        let png = store
            .read_failure_bytes(id)
            .with_context(|| format!("Could not read failure/{id}.png"))?;
        store.write_reference_bytes(id, &png)?;
        println!("  Approved  \x1b[31mFAIL\x1b[0m  {id}");
    }

    Ok(filtered.len())
}
