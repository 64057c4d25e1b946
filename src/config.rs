use std::ops::RangeInclusive;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Rows shown by the data preview.
pub const PREVIEW_ROWS: usize = 15;
/// Allowed values of the bar chart's top-N slider.
pub const TOP_N_RANGE: RangeInclusive<usize> = 3..=20;
/// Initial top-N value.
pub const DEFAULT_TOP_N: usize = 10;
/// Largest number of slices in the treatment-gap pie.
pub const PIE_SLICES: usize = 8;

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Directory scanned (non-recursively) for `*.csv` input files.
    pub data_dir: PathBuf,
}

impl DashboardConfig {
    /// Use the first positional argument as the data directory, falling back
    /// to the directory holding the executable.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let data_dir = match args.nth(1) {
            Some(dir) => PathBuf::from(dir),
            None => executable_dir()?,
        };
        Ok(Self { data_dir })
    }
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating the running executable")?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .context("executable has no parent directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_argument_overrides_data_dir() {
        let args = ["mindscope", "/srv/surveys"].map(String::from).into_iter();
        let config = DashboardConfig::from_args(args).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/surveys"));
    }

    #[test]
    fn defaults_to_executable_directory() {
        let args = ["mindscope"].map(String::from).into_iter();
        let config = DashboardConfig::from_args(args).unwrap();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(Some(config.data_dir.as_path()), exe.parent());
    }
}
