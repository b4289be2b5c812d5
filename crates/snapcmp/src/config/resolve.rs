use anyhow::{Context, Result};
use snapcmp::Precision;

use super::Config;

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub precision: Option<Precision>,
    pub parallel: Option<usize>,
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedRunConfig {
    pub precision: Precision,
    pub scale: f32,
    pub parallel: usize,
    pub captured_dir: String,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        let file_config = super::load().context("Run `snapcmp init` first")?;
        Self::merge(cli, std::env::var("SNAPCMP_PRECISION").ok(), file_config)
    }

    /// Same as [`ResolvedRunConfig::new`], but a missing config file is not an error.
    pub fn new_or_default(cli: CliOverrides) -> Result<Self> {
        let file_config = super::load_or_default()?;
        Self::merge(cli, std::env::var("SNAPCMP_PRECISION").ok(), file_config)
    }

    fn merge(cli: CliOverrides, env_precision: Option<String>, file: Config) -> Result<Self> {
        let env_precision: Option<Precision> = env_precision
            .map(|v| v.parse::<Precision>().map_err(|e| anyhow::anyhow!(e)))
            .transpose()
            .context("SNAPCMP_PRECISION must be a number between 0.0 and 1.0")?;

        let precision = cli
            .precision
            .or(env_precision)
            .unwrap_or(file.diff.precision);

        let parallel = cli.parallel.unwrap_or(file.snapshot.parallel).max(1);

        Ok(Self {
            precision,
            scale: file.snapshot.scale,
            parallel,
            captured_dir: file.snapshot.captured_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with_precision(p: f64) -> Config {
        let mut config = Config::default();
        config.diff.precision = Precision::new(p).unwrap();
        config
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let cli = CliOverrides {
            precision: Some(Precision::new(0.5).unwrap()),
            parallel: None,
        };
        let resolved =
            ResolvedRunConfig::merge(cli, Some("0.7".into()), file_with_precision(0.9)).unwrap();
        assert_eq!(resolved.precision.value(), 0.5);

        let resolved = ResolvedRunConfig::merge(
            CliOverrides::default(),
            Some("0.7".into()),
            file_with_precision(0.9),
        )
        .unwrap();
        assert_eq!(resolved.precision.value(), 0.7);

        let resolved =
            ResolvedRunConfig::merge(CliOverrides::default(), None, file_with_precision(0.9))
                .unwrap();
        assert_eq!(resolved.precision.value(), 0.9);
    }

    #[test]
    fn invalid_env_precision_is_an_error() {
        let err = ResolvedRunConfig::merge(
            CliOverrides::default(),
            Some("1.2".into()),
            Config::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("SNAPCMP_PRECISION"), "{err:#}");
    }

    #[test]
    fn cli_parallel_overrides_file() {
        let cli = CliOverrides {
            precision: None,
            parallel: Some(16),
        };
        let resolved = ResolvedRunConfig::merge(cli, None, Config::default()).unwrap();
        assert_eq!(resolved.parallel, 16);
    }
}
