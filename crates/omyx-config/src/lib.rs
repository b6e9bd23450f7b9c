//! Engine configuration.
//!
//! Loaded from `omyx.toml` (or the file named by `OMYX_CONFIG`). Every field
//! has a default, so a missing file or a partial file is fine. Scoring
//! thresholds are not configurable; see `omyx_engine::policy`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use omyx_common::{OmyxError, Result};

pub const CONFIG_ENV_VAR: &str = "OMYX_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "omyx.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub output: OutputSection,
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSection {
    /// Worker threads for one run; 0 uses one per available core.
    #[serde(default)]
    pub worker_threads: usize,
    /// Reference knowledge file (YAML or JSON). Built-in tables when unset.
    #[serde(default)]
    pub knowledge_path: Option<PathBuf>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            knowledge_path: None,
        }
    }
}

// ── Analysis ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    #[serde(default = "default_cancer_type")]
    pub default_cancer_type: String,
    /// Deadline around one run, imposed by the caller.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

fn default_cancer_type()  -> String      { "breast".to_string() }
fn default_timeout_secs() -> Option<u64> { Some(300) }

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            default_cancer_type: default_cancer_type(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnalysisSection {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "bool_true")]
    pub pretty: bool,
    /// Report destination; stdout when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub summary_only: bool,
}

fn bool_true() -> bool { true }

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            pretty: bool_true(),
            path: None,
            summary_only: false,
        }
    }
}

impl EngineConfig {
    /// Load from the file named by `OMYX_CONFIG`, else `omyx.toml`.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_or_default(path)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    /// Parse a config file, choosing the format from its extension
    /// (`.yaml`/`.yml`, `.json`, anything else TOML).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config = match ext.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            Some("json") => {
                let config: Self = serde_json::from_str(&content)?;
                config.validate()?;
                config
            }
            _ => Self::from_toml_str(&content)?,
        };
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.timeout_secs == Some(0) {
            return Err(OmyxError::Config("analysis.timeout_secs must be positive".into()));
        }
        if self.analysis.default_cancer_type.trim().is_empty() {
            return Err(OmyxError::Config("analysis.default_cancer_type is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.engine.worker_threads, 0);
        assert_eq!(config.analysis.default_cancer_type, "breast");
        assert_eq!(config.analysis.timeout(), Some(Duration::from_secs(300)));
        assert!(config.output.pretty);
        assert!(!config.output.summary_only);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [engine]
            worker_threads = 4

            [output]
            summary_only = true
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.worker_threads, 4);
        assert_eq!(config.analysis, AnalysisSection::default());
        assert!(config.output.pretty);
        assert!(config.output.summary_only);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_yaml() {
        let config = EngineConfig::from_yaml_str(
            "analysis:\n  default_cancer_type: lung\n  timeout_secs: 30\nengine:\n  knowledge_path: kb.yaml\n",
        )
        .unwrap();
        assert_eq!(config.analysis.default_cancer_type, "lung");
        assert_eq!(config.analysis.timeout_secs, Some(30));
        assert_eq!(config.engine.knowledge_path, Some(PathBuf::from("kb.yaml")));
    }

    #[test]
    fn test_validation() {
        let err = EngineConfig::from_toml_str("[analysis]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, OmyxError::Config(_)));

        let err = EngineConfig::from_toml_str("[analysis]\ndefault_cancer_type = \"  \"\n").unwrap_err();
        assert!(matches!(err, OmyxError::Config(_)));

        let err = EngineConfig::from_toml_str("[engine]\nworker_threads = \"many\"\n").unwrap_err();
        assert!(matches!(err, OmyxError::Toml(_)));
    }

    #[test]
    fn test_from_path_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("omyx.toml");
        std::fs::write(&toml_path, "[output]\npretty = false\n").unwrap();
        let json_path = dir.path().join("omyx.json");
        std::fs::write(&json_path, r#"{"engine": {"worker_threads": 2}}"#).unwrap();

        assert!(!EngineConfig::from_path(&toml_path).unwrap().output.pretty);
        assert_eq!(EngineConfig::from_path(&json_path).unwrap().engine.worker_threads, 2);

        let missing = EngineConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing, EngineConfig::default());
    }

    // The only test in this crate that touches the environment.
    #[test]
    fn test_load_uses_env_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "analysis:\n  default_cancer_type: gastric\n").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &path);
        let config = EngineConfig::load();
        std::env::set_var(CONFIG_ENV_VAR, dir.path().join("absent.toml"));
        let fallback = EngineConfig::load();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.unwrap().analysis.default_cancer_type, "gastric");
        assert_eq!(fallback.unwrap(), EngineConfig::default());
    }
}
