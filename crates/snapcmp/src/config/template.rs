use std::path::Path;

use anyhow::{Context, Result};

use super::{CONFIG_DIR, CONFIG_FILE};

/// Hand-crafted config template with commented-out keys, so that users can
/// see the available knobs without uncommenting section headers.
const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Comparison — all fields optional.
# ─────────────────────────────────────────────────────────
[diff]
# precision = 1.0                   # fraction of bytes that must match (1.0 = exact, 0.99 = 1% slack)

# ─────────────────────────────────────────────────────────
# Snapshot files — all fields optional.
# ─────────────────────────────────────────────────────────
[snapshot]
# scale = 1.0                       # used when a file name has no @2x / @3x suffix
# parallel = 4                      # concurrent comparisons
# captured_dir = "captured"         # where the test harness writes new screenshots
"#;

pub fn render() -> String {
    CONFIG_TEMPLATE.to_string()
}

pub fn config_file_exists() -> bool {
    Path::new(CONFIG_DIR).join(CONFIG_FILE).exists()
}

pub fn write_gitignore(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_DIR).join(".gitignore");
    if !force && path.exists() {
        return Ok(());
    }
    std::fs::write(&path, "failure/\ndifference/\nreport.html\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the hand-crafted config template (with commented-out sections).
pub fn write_template() -> Result<()> {
    let dir = Path::new(CONFIG_DIR);
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {CONFIG_DIR}"))?;
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, render())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
