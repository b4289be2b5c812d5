use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::bitmap::{Bitmap, DEFAULT_SCALE, RasterBitmap};
use crate::codec::CodecError;
use crate::precision::Precision;
use crate::verdict::{ArtifactKind, ReportSink, Verdict, verify};

pub const BASE_DIR: &str = ".snapcmp";
pub const REFERENCE_DIR: &str = "reference";
pub const FAILURE_DIR: &str = "failure";
pub const DIFFERENCE_DIR: &str = "difference";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read snapshot {}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

/// Outcome of checking a captured snapshot against the store.
#[derive(Debug, Clone)]
pub enum SnapshotResult {
    /// No reference existed; the candidate was saved as the new reference.
    Recorded { message: String },
    Compared(Verdict),
}

impl SnapshotResult {
    /// Recording counts as a failure so a fresh reference gets reviewed.
    pub fn pass(&self) -> bool {
        match self {
            Self::Recorded { .. } => false,
            Self::Compared(v) => v.pass(),
        }
    }
}

/// Scale encoded in an `@Nx` suffix of a snapshot id or file stem
/// (`button@2x` → 2.0), else `default`.
pub fn scale_from_id(id: &str, default: f32) -> f32 {
    id.rsplit_once('@')
        .and_then(|(_, suffix)| suffix.strip_suffix('x'))
        .and_then(|n| n.parse::<f32>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(default)
}

/// Reference snapshots plus failure/difference artifacts on disk.
///
/// Layout: `<root>/{reference,failure,difference}/<id>.png`, where the id is
/// a relative path without the extension.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    default_scale: f32,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(BASE_DIR)
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    std::fs::write(path, bytes).map_err(io_err(path))
}

fn write_bitmap(path: &Path, bitmap: &dyn Bitmap) -> Result<(), StoreError> {
    let png = bitmap.encode().map_err(|source| StoreError::Codec {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &png)
}

/// Recursively walk a directory, collecting all `.png` files as IDs
/// (relative path without the `.png` extension).
fn collect_png_ids(base: &Path, dir: &Path, ids: &mut BTreeSet<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_png_ids(base, &path, ids);
        } else if path.extension().is_some_and(|e| e == "png")
            && let Ok(rel) = path.strip_prefix(base)
        {
            let id = rel.with_extension("");
            ids.insert(id.to_string_lossy().replace('\\', "/"));
        }
    }
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            default_scale: DEFAULT_SCALE,
        }
    }

    /// Scale for snapshots whose id carries no `@Nx` suffix.
    pub fn with_default_scale(mut self, scale: f32) -> Self {
        self.default_scale = scale;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(match kind {
            ArtifactKind::Reference => REFERENCE_DIR,
            ArtifactKind::Failure => FAILURE_DIR,
            ArtifactKind::Difference => DIFFERENCE_DIR,
        })
    }

    pub fn path(&self, kind: ArtifactKind, id: &str) -> PathBuf {
        self.dir(kind).join(format!("{id}.png"))
    }

    pub fn scale_for(&self, id: &str) -> f32 {
        scale_from_id(id, self.default_scale)
    }

    pub fn has_reference(&self, id: &str) -> bool {
        self.path(ArtifactKind::Reference, id).exists()
    }

    pub fn read_reference(&self, id: &str) -> Result<Option<RasterBitmap>, StoreError> {
        let path = self.path(ArtifactKind::Reference, id);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&path)(e)),
        };
        RasterBitmap::from_png(&bytes, self.scale_for(id))
            .map(Some)
            .map_err(|source| StoreError::Codec { path, source })
    }

    /// Save `bitmap` as the reference for `id` and drop stale artifacts.
    pub fn write_reference(&self, id: &str, bitmap: &dyn Bitmap) -> Result<(), StoreError> {
        write_bitmap(&self.path(ArtifactKind::Reference, id), bitmap)?;
        self.clean_output(id);
        Ok(())
    }

    /// Save already-encoded PNG bytes as the reference, unchanged.
    pub fn write_reference_bytes(&self, id: &str, png: &[u8]) -> Result<(), StoreError> {
        write_file(&self.path(ArtifactKind::Reference, id), png)?;
        self.clean_output(id);
        Ok(())
    }

    pub fn read_failure_bytes(&self, id: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path(ArtifactKind::Failure, id)).ok()
    }

    pub fn has_difference(&self, id: &str) -> bool {
        self.path(ArtifactKind::Difference, id).exists()
    }

    /// Write the failure and difference artifacts of a verdict. The
    /// reference artifact is already on disk.
    pub fn write_artifacts(&self, id: &str, verdict: &Verdict) -> Result<(), StoreError> {
        for artifact in &verdict.artifacts {
            if artifact.kind == ArtifactKind::Reference {
                continue;
            }
            write_bitmap(&self.path(artifact.kind, id), &artifact.image)?;
        }
        Ok(())
    }

    pub fn clean_output(&self, id: &str) {
        let _ = std::fs::remove_file(self.path(ArtifactKind::Failure, id));
        let _ = std::fs::remove_file(self.path(ArtifactKind::Difference, id));
    }

    /// Remove all files from `failure/` and `difference/`.
    pub fn clear_output_dirs(&self) {
        for kind in [ArtifactKind::Failure, ArtifactKind::Difference] {
            let dir = self.dir(kind);
            if dir.exists() {
                let _ = std::fs::remove_dir_all(&dir);
                let _ = std::fs::create_dir_all(&dir);
            }
        }
    }

    pub fn list_ids(&self, kind: ArtifactKind) -> BTreeSet<String> {
        let dir = self.dir(kind);
        let mut ids = BTreeSet::new();
        collect_png_ids(&dir, &dir, &mut ids);
        ids
    }

    /// Compare `candidate` with the stored reference for `id`. When there is
    /// no reference yet, record `candidate` as one.
    pub fn assert_snapshot(
        &self,
        id: &str,
        candidate: &dyn Bitmap,
        precision: Precision,
    ) -> Result<SnapshotResult, StoreError> {
        let Some(reference) = self.read_reference(id)? else {
            self.write_reference(id, candidate)?;
            info!(id, "recorded new reference");
            return Ok(SnapshotResult::Recorded {
                message: format!(
                    "No reference was found on disk. Automatically recorded snapshot: {id}"
                ),
            });
        };

        let verdict = verify(&reference, candidate, precision);
        debug!(id, outcome = ?verdict.outcome, "compared");
        Ok(SnapshotResult::Compared(verdict))
    }
}

/// Passing verdicts clear old artifacts, failing ones write new ones.
impl ReportSink for SnapshotStore {
    type Error = StoreError;

    fn record(&mut self, name: &str, verdict: &Verdict) -> Result<(), StoreError> {
        if verdict.pass() {
            self.clean_output(name);
            Ok(())
        } else {
            self.write_artifacts(name, verdict)
        }
    }
}
