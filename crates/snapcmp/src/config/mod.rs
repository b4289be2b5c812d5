pub mod resolve;
pub mod template;

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use snapcmp::{DEFAULT_SCALE, Precision};

pub use self::resolve::{CliOverrides, ResolvedRunConfig};
pub use self::template::{config_file_exists, write_gitignore, write_template};

pub(crate) const CONFIG_DIR: &str = snapcmp::store::BASE_DIR;
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Fraction of bytes that must match (0.0-1.0). 1.0 demands an exact match.
    #[serde(default)]
    pub precision: Precision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Scale for snapshot files without an `@Nx` suffix.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Concurrent comparisons.
    #[serde(default = "default_parallel")]
    pub parallel: usize,
    /// Directory the test harness writes newly captured PNGs to.
    #[serde(default = "default_captured_dir")]
    pub captured_dir: String,
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

fn default_parallel() -> usize {
    4
}

fn default_captured_dir() -> String {
    "captured".to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            parallel: default_parallel(),
            captured_dir: default_captured_dir(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        let scale = self.snapshot.scale;
        if !(scale.is_finite() && scale > 0.0) {
            bail!("snapshot.scale must be a positive number, got {scale}");
        }
        if self.snapshot.parallel == 0 {
            bail!("snapshot.parallel must be at least 1");
        }
        if self.snapshot.captured_dir.trim().is_empty() {
            bail!(
                "snapshot.captured_dir is empty. Point it at the directory your \
                 test harness writes screenshots to, e.g.:\n\n  \
                 [snapshot]\n  \
                 captured_dir = \"captured\""
            );
        }
        Ok(())
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub fn load() -> Result<Config> {
    load_from(&Path::new(CONFIG_DIR).join(CONFIG_FILE))
}

/// Like [`load`], but falls back to defaults when no config file exists.
pub fn load_or_default() -> Result<Config> {
    if config_file_exists() {
        load()
    } else {
        tracing::debug!("no config file, using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(content: &str) -> Result<Config> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, content).unwrap();
        load_from(&path)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config.diff.precision, Precision::EXACT);
        assert_eq!(config.snapshot.scale, 1.0);
        assert_eq!(config.snapshot.parallel, 4);
        assert_eq!(config.snapshot.captured_dir, "captured");
    }

    #[test]
    fn reads_all_sections() {
        let config = load_str(
            "[diff]\nprecision = 0.98\n\n[snapshot]\nscale = 2.0\nparallel = 8\ncaptured_dir = \"out\"\n",
        )
        .unwrap();
        assert_eq!(config.diff.precision.value(), 0.98);
        assert_eq!(config.snapshot.scale, 2.0);
        assert_eq!(config.snapshot.parallel, 8);
        assert_eq!(config.snapshot.captured_dir, "out");
    }

    #[test]
    fn out_of_range_precision_is_rejected() {
        let err = load_str("[diff]\nprecision = 1.5\n").unwrap_err();
        assert!(format!("{err:#}").contains("between 0.0 and 1.0"), "{err:#}");
    }

    #[test]
    fn zero_parallel_is_rejected() {
        assert!(load_str("[snapshot]\nparallel = 0\n").is_err());
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        assert!(load_str("[snapshot]\nscale = 0.0\n").is_err());
    }

    #[test]
    fn template_parses_as_defaults() {
        let content = template::render();
        let config: Config = toml::from_str(&content).unwrap();
        config.validate().unwrap();
        assert_eq!(config.diff.precision, Precision::EXACT);
    }
}
