//! Audit configuration
//!
//! Supports multiple profiles (default, ci) with different settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Budgets for the performance checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceBudgets {
    /// Simulated work per processed item, in microseconds
    pub simulated_work_micros: u64,
    /// Largest allowed resident memory growth during the memory check
    pub max_memory_increase_mb: f64,
    /// Largest allowed resident memory at the end of the memory check
    pub max_total_memory_mb: f64,
}

impl PerformanceBudgets {
    pub fn unit_of_work(&self) -> Duration {
        Duration::from_micros(self.simulated_work_micros)
    }
}

impl Default for PerformanceBudgets {
    fn default() -> Self {
        Self {
            simulated_work_micros: 1000,
            max_memory_increase_mb: 100.0,
            max_total_memory_mb: 500.0,
        }
    }
}

/// Audit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// The active profile (default, ci, etc.)
    pub profile: String,
    /// Directory holding the schema and validation trees
    pub root: PathBuf,
    /// Schema tree, relative to `root`
    pub schemas_dir: PathBuf,
    /// Validation tree, relative to `root`
    pub validation_dir: PathBuf,
    /// Where reports are written
    pub report_dir: PathBuf,
    /// Per-check bound; 0 disables it
    pub check_timeout_secs: u64,
    /// Log filter used when RUST_LOG is unset
    pub log_filter: String,
    pub performance: PerformanceBudgets,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            root: PathBuf::from(".emergence"),
            schemas_dir: PathBuf::from("schemas"),
            validation_dir: PathBuf::from("validation"),
            report_dir: PathBuf::from(".emergence"),
            check_timeout_secs: 30,
            log_filter: "info".to_string(),
            performance: PerformanceBudgets::default(),
        }
    }
}

impl AuditConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Sources are layered in the following order:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{profile}.toml (profile-specific overrides)
    /// 3. Environment variables with prefix AUDIT_ (e.g., AUDIT_CHECK_TIMEOUT_SECS=5)
    ///
    /// Config files are searched for in:
    /// 1. Next to the executable (target/debug/config or target/release/config)
    /// 2. In the current directory (./config)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let config_dir = Self::find_config_dir().unwrap_or_else(|| PathBuf::from("config"));

        let config = Config::builder()
            .add_source(File::from(config_dir.join("default").as_path()).required(false))
            .add_source(File::from(config_dir.join(profile).as_path()).required(false))
            // Use __ as separator for nested fields (e.g., AUDIT_PERFORMANCE__MAX_TOTAL_MEMORY_MB)
            .add_source(
                Environment::with_prefix("AUDIT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("profile", profile)?
            .build()?;

        config.try_deserialize()
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Loads configuration using the AUDIT_PROFILE environment variable,
    /// defaulting to "default"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("AUDIT_PROFILE").unwrap_or_else(|_| "default".to_string());
        Self::load(&profile)
    }

    /// Points every document path at a different root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn schemas_path(&self) -> PathBuf {
        self.root.join(&self.schemas_dir)
    }

    pub fn validation_path(&self) -> PathBuf {
        self.root.join(&self.validation_dir)
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Per-check bound, or `None` when disabled
    pub fn check_timeout(&self) -> Option<Duration> {
        (self.check_timeout_secs > 0).then(|| Duration::from_secs(self.check_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = AuditConfig::default();
        assert_eq!(config.schemas_path(), PathBuf::from(".emergence/schemas"));
        assert_eq!(config.validation_path(), PathBuf::from(".emergence/validation"));
        assert_eq!(config.check_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let config = AuditConfig {
            check_timeout_secs: 0,
            ..AuditConfig::default()
        };
        assert_eq!(config.check_timeout(), None);
    }

    #[test]
    fn test_with_root_moves_document_paths() {
        let config = AuditConfig::default().with_root("/tmp/fixture");
        assert_eq!(config.schemas_path(), PathBuf::from("/tmp/fixture/schemas"));
        assert_eq!(config.report_dir(), Path::new(".emergence"));
    }

    #[test]
    fn test_unknown_profile_falls_back_to_defaults() {
        let config = AuditConfig::load("no-such-profile").unwrap();
        assert_eq!(config.profile, "no-such-profile");
        assert_eq!(config.performance.unit_of_work(), Duration::from_millis(1));
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        let config: AuditConfig = Config::builder()
            .add_source(config::File::from_str(
                "check_timeout_secs = 5\n[performance]\nmax_total_memory_mb = 1024.0",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.check_timeout_secs, 5);
        assert_eq!(config.performance.max_total_memory_mb, 1024.0);
        assert_eq!(config.performance.simulated_work_micros, 1000);
        assert_eq!(config.log_filter, "info");
    }
}
