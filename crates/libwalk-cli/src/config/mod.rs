//! Configuration management.

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use libwalk_audit::{probe_init_system, DEFAULT_LOOKUP_TIMEOUT};
use libwalk_core::InitSystemKind;

use crate::output::OutputFormat;

/// How the init system is decided.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InitSystemSetting {
    /// Probe the host
    #[default]
    Auto,
    /// Assume systemd
    Systemd,
    /// Assume some other init system
    Other,
    /// Assume no init system
    None,
}

impl InitSystemSetting {
    /// Decide the init system, probing only in `Auto` mode.
    pub fn resolve(self, run_dir: &Path, proc_root: &Path) -> InitSystemKind {
        match self {
            Self::Auto => probe_init_system(run_dir, proc_root),
            Self::Systemd => InitSystemKind::SystemdClass,
            Self::Other => InitSystemKind::Other,
            Self::None => InitSystemKind::None,
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Look up the service unit of each stale process.
    #[serde(default = "default_true")]
    pub resolve_units: bool,

    /// Init system detection.
    #[serde(default)]
    pub init_system: InitSystemSetting,

    /// Upper bound for one unit lookup, in seconds.
    #[serde(default = "default_lookup_timeout")]
    pub unit_lookup_timeout_secs: u64,

    /// procfs mount point (default: /proc).
    pub proc_root: Option<PathBuf>,

    /// List every stale library per process.
    #[serde(default)]
    pub detailed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: None,
            resolve_units: default_true(),
            init_system: InitSystemSetting::default(),
            unit_lookup_timeout_secs: default_lookup_timeout(),
            proc_root: None,
            detailed: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_lookup_timeout() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT.as_secs()
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "libwalk", "libwalk")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path is optional; when it is
    /// missing, defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.resolve_units);
        assert_eq!(config.init_system, InitSystemSetting::Auto);
        assert_eq!(
            config.unit_lookup_timeout_secs,
            DEFAULT_LOOKUP_TIMEOUT.as_secs()
        );
        assert!(config.proc_root.is_none());
        assert!(!config.detailed);
    }

    #[test]
    fn test_empty_file_matches_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "output_format = \"json\"\n\
             resolve_units = false\n\
             init_system = \"none\"\n\
             unit_lookup_timeout_secs = 2\n\
             proc_root = \"/host/proc\"\n\
             detailed = true\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert!(!config.resolve_units);
        assert_eq!(config.init_system, InitSystemSetting::None);
        assert_eq!(config.unit_lookup_timeout_secs, 2);
        assert_eq!(config.proc_root, Some(PathBuf::from("/host/proc")));
        assert!(config.detailed);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "init_system = \"upstart\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"));
    }

    #[test]
    fn test_forced_init_settings() {
        let nowhere = Path::new("/nonexistent");
        assert_eq!(
            InitSystemSetting::Systemd.resolve(nowhere, nowhere),
            InitSystemKind::SystemdClass
        );
        assert_eq!(
            InitSystemSetting::None.resolve(nowhere, nowhere),
            InitSystemKind::None
        );
        assert_eq!(
            InitSystemSetting::Auto.resolve(nowhere, nowhere),
            InitSystemKind::None
        );
    }
}
