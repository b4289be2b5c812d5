use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use snapcmp::store::scale_from_id;
use snapcmp::{Bitmap, ComparisonOutcome, Dimensions, RasterBitmap, Verdict, verify};
use tracing::info;

use crate::config::ResolvedRunConfig;

#[derive(Serialize)]
struct CompareReport<'a> {
    pass: bool,
    #[serde(flatten)]
    outcome: ComparisonOutcome,
    message: Option<&'a str>,
    reference: Dimensions,
    candidate: Dimensions,
    artifacts: Vec<String>,
}

fn load(path: &Path, default_scale: f32) -> Result<RasterBitmap> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    RasterBitmap::from_png(&bytes, scale_from_id(&stem, default_scale))
        .with_context(|| format!("Failed to decode {}", path.display()))
}

/// Write each artifact as `<dir>/<name>.png`, returning the written paths.
fn write_artifacts(dir: &Path, verdict: &Verdict) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut written = Vec::new();
    for artifact in &verdict.artifacts {
        let path = dir.join(format!("{}.png", artifact.kind));
        let png = artifact
            .image
            .encode()
            .with_context(|| format!("Failed to encode {} image", artifact.kind))?;
        std::fs::write(&path, png).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// `snapcmp compare` — compare two PNG files.
/// Returns exit code: 0 = same, 1 = different or invalid.
pub fn compare(
    config: ResolvedRunConfig,
    reference: &Path,
    candidate: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<i32> {
    let reference_img = load(reference, config.scale)?;
    let candidate_img = load(candidate, config.scale)?;

    let verdict = verify(&reference_img, &candidate_img, config.precision);
    info!(outcome = ?verdict.outcome, precision = %config.precision, "compared");

    let written = match output {
        Some(dir) if !verdict.pass() => write_artifacts(dir, &verdict)?,
        _ => Vec::new(),
    };

    if json {
        let report = CompareReport {
            pass: verdict.pass(),
            outcome: verdict.outcome,
            message: verdict.message.as_deref(),
            reference: reference_img.dimensions(),
            candidate: candidate_img.dimensions(),
            artifacts: written.iter().map(|p| p.display().to_string()).collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        match &verdict.message {
            None => println!("  \x1b[32mPASS\x1b[0m  Snapshots match."),
            Some(msg) => println!("  \x1b[31mFAIL\x1b[0m  {msg}"),
        }
        for path in &written {
            println!("        wrote {}", path.display());
        }
    }

    Ok(if verdict.pass() { 0 } else { 1 })
}
