//! Configuration handling for shotline
//!
//! Configuration is stored in `.shotline/config.toml` (project) and
//! `~/.config/shotline/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::password::Bcrypt;
use crate::domain::Site;

/// Name of the workspace directory
pub const WORKSPACE_DIR: &str = ".shotline";

/// Environment variable overriding the database path
pub const DB_ENV: &str = "SHOTLINE_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Where the database lives and how long writers wait for a lock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Relative paths are resolved against the workspace root
    pub path: PathBuf,

    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Path::new(WORKSPACE_DIR).join("shotline.db"),
            busy_timeout_ms: 5000,
        }
    }
}

/// Task vocabulary written into the site row by `init`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SiteSeed {
    pub tasks: Vec<String>,
    pub default_shot_tasks: Vec<String>,
    pub default_asset_tasks: Vec<String>,
    pub leads: Vec<String>,
}

impl SiteSeed {
    pub fn to_site(&self) -> Site {
        Site {
            tasks: self.tasks.clone(),
            default_shot_tasks: self.default_shot_tasks.clone(),
            default_asset_tasks: self.default_asset_tasks.clone(),
            leads: self.leads.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    /// bcrypt work factor, 4 to 31
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    pub database: DatabaseConfig,
    pub site: SiteSeed,
    pub auth: AuthConfig,
}

impl ProjectConfig {
    /// Checks values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        Ok(())
    }
}

/// Log verbosity for the binary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    pub log: LogConfig,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (project, project_root) = Self::load_project()?;

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific workspace
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "shotline", "shotline").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Finds and loads project configuration
    fn load_project() -> Result<(ProjectConfig, Option<PathBuf>)> {
        match Self::find_project_root() {
            Some(root) => {
                let config = Self::load_project_config(&root)?;
                Ok((config, Some(root)))
            }
            None => Ok((ProjectConfig::default(), None)),
        }
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(WORKSPACE_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;
        config.validate()?;
        Ok(config)
    }

    /// Finds the workspace root by looking for `.shotline/` from the current directory up
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the workspace root by looking for `.shotline/` from `start` up
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns true if we're in a workspace
    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Returns the workspace root, or an error if not in a workspace
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a shotline workspace. Run 'shotline init' first."))
    }

    /// Resolves the database path: `SHOTLINE_DB`, then `[database] path`
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let path = &self.project.database.path;
        if path.is_absolute() {
            return Ok(path.clone());
        }
        Ok(self.require_project_root()?.join(path))
    }

    /// Returns the password hasher for the configured cost
    pub fn hasher(&self) -> Result<Bcrypt> {
        Ok(Bcrypt::new(self.project.auth.bcrypt_cost)?)
    }

    /// Saves the project configuration
    pub fn save_project(&self) -> Result<()> {
        let root = self.require_project_root()?;
        let config_path = root.join(WORKSPACE_DIR).join("config.toml");

        let content =
            toml::to_string_pretty(&self.project).context("Failed to serialize project config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(root: Option<PathBuf>) -> Config {
        Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: root,
        }
    }

    #[test]
    fn default_config() {
        let config = config(None);

        assert_eq!(config.project.database.busy_timeout_ms, 5000);
        assert_eq!(config.project.auth.bcrypt_cost, 12);
        assert_eq!(config.global.default_format, OutputFormat::Text);
        assert_eq!(config.global.log.level, LogLevel::Warn);
        assert_eq!(config.hasher().unwrap().cost, 12);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
[database]
busy_timeout_ms = 250

[site]
tasks = ["fx", "lit", "comp"]
default_shot_tasks = ["comp"]
leads = ["fx:kybin"]
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.database.path, PathBuf::from(".shotline/shotline.db"));
        assert_eq!(config.site.tasks, vec!["fx", "lit", "comp"]);

        let site = config.site.to_site();
        assert_eq!(site.default_shot_tasks, vec!["comp"]);
        assert!(site.validate().is_ok());
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"

[log]
level = "debug"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.level.as_str(), "debug");
    }

    #[test]
    fn bcrypt_cost_is_checked() {
        let mut project = ProjectConfig::default();
        project.auth.bcrypt_cost = 40;
        assert!(project.validate().is_err());
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(WORKSPACE_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn relative_database_path_uses_root() {
        if std::env::var_os(DB_ENV).is_some() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let config = config(Some(dir.path().to_path_buf()));

        assert_eq!(
            config.database_path().unwrap(),
            dir.path().join(".shotline").join("shotline.db")
        );
    }

    #[test]
    fn config_not_in_project() {
        let config = config(None);

        assert!(!config.is_in_project());
        assert!(config.require_project_root().is_err());
    }
}
