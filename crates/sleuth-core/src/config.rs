//! RunnerConfig - プロセス全体の実行設定
//!
//! - `max_task_duration`: Run の締め切り（既定 15 分）
//! - `base_dir`: file 配送の出力先ルート（既定はカレントディレクトリ）

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::errors::ConfigError;

pub const MAX_DURATION_VAR: &str = "SLEUTH_MAX_TASK_DURATION_SECS";
pub const BASEDIR_VAR: &str = "SLEUTH_BASEDIR";

const DEFAULT_MAX_TASK_DURATION: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub max_task_duration: Duration,
    pub base_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_task_duration: DEFAULT_MAX_TASK_DURATION,
            base_dir: PathBuf::from("."),
        }
    }
}

impl RunnerConfig {
    /// Defaults overridden by `SLEUTH_MAX_TASK_DURATION_SECS` / `SLEUTH_BASEDIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`RunnerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_DURATION_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDuration {
                    var: MAX_DURATION_VAR.to_string(),
                    value: raw.clone(),
                })?;
            config.max_task_duration = Duration::from_secs(secs);
        }

        if let Some(dir) = lookup(BASEDIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.base_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_max_task_duration(mut self, duration: Duration) -> Self {
        self.max_task_duration = duration;
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }
}
