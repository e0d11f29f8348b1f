//! Configuration for runlog paths and queue settings.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (RUNLOG_HOME)
//! 2. Config file (.runlog/config.yaml)
//! 3. Defaults (~/.runlog)
//!
//! Config file discovery:
//! - Searches current directory and parents for .runlog/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub queue: Option<QueueConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to config file)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    pub capacity: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to runlog home (run state)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Queue settings
    pub queue: QueueSettings,
}

#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Bound of the pending-artifact channel
    pub capacity: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl ResolvedConfig {
    /// Directory holding per-run state ($RUNLOG_HOME/runs)
    pub fn runs_dir(&self) -> PathBuf {
        self.home.join("runs")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".runlog").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".runlog");

    // Check for config file
    let config_file = find_config_file();

    let (home, queue) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Resolve home path
        let home = if let Ok(env_home) = std::env::var("RUNLOG_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            // home is relative to the .runlog/ directory
            let runlog_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(runlog_dir, home_path)
        } else {
            default_home.clone()
        };

        let queue = QueueSettings {
            capacity: config
                .queue
                .as_ref()
                .and_then(|q| q.capacity)
                .unwrap_or_else(|| QueueSettings::default().capacity),
        };

        (home, queue)
    } else {
        // No config file - use env vars or defaults
        let home = std::env::var("RUNLOG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        (home, QueueSettings::default())
    };

    Ok(ResolvedConfig {
        home,
        config_file,
        queue,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the runlog home directory (run state).
pub fn runlog_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the runs directory ($RUNLOG_HOME/runs)
pub fn runs_dir() -> Result<PathBuf> {
    Ok(config()?.runs_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let runlog_dir = temp.path().join(".runlog");
        std::fs::create_dir_all(&runlog_dir).unwrap();

        let config_path = runlog_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./
queue:
  capacity: 16
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./".to_string()));
        assert_eq!(config.queue.unwrap().capacity, Some(16));
    }

    #[test]
    fn test_runs_dir_layout() {
        let config = ResolvedConfig {
            home: PathBuf::from("/test/.runlog"),
            config_file: None,
            queue: QueueSettings::default(),
        };

        assert_eq!(config.runs_dir(), PathBuf::from("/test/.runlog/runs"));
    }

    #[test]
    fn test_default_queue_capacity() {
        assert_eq!(QueueSettings::default().capacity, 64);
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
