//! Workspace management
//!
//! Handles workspace initialization and opens the configured database.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, info};

use super::config::{Config, WORKSPACE_DIR};
use super::schema::init_tables;
use super::site::{add_site, find_site};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a shotline workspace. Run 'shotline init' first.")]
    NotInWorkspace,
}

const DEFAULT_CONFIG: &str = r#"# shotline configuration

[database]
# Relative paths are resolved against the workspace root.
# SHOTLINE_DB overrides this.
path = ".shotline/shotline.db"
busy_timeout_ms = 5000

[site]
# Canonical task names, in display order
tasks = ["mod", "rig", "ani", "fx", "lit", "comp"]
default_shot_tasks = ["ani", "lit", "comp"]
default_asset_tasks = ["mod", "rig"]
# Task leads as "task:userid"
leads = []

[auth]
bcrypt_cost = 12
"#;

const GITIGNORE: &str = r#"# Database files
*.db
*.db-wal
*.db-shm
"#;

/// Opens a database file with WAL journaling, the given busy timeout and
/// an up-to-date schema
pub fn open_database(path: &Path, busy_timeout_ms: u64) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .context("Failed to set busy timeout")?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
        .context("Failed to enable WAL journaling")?;
    debug!(path = %path.display(), busy_timeout_ms, "database opened");

    init_tables(&conn).context("Failed to initialize schema")?;
    Ok(conn)
}

/// A shotline workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(WORKSPACE_DIR).is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a workspace at the given path, creating the schema and
    /// seeding the site row from `[site]` when there is none yet
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let dir = root.join(WORKSPACE_DIR);

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {} directory: {}", WORKSPACE_DIR, dir.display()))?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let workspace = Self::open(root)?;
        let mut conn = workspace.connect()?;
        if find_site(&conn)?.is_none() {
            let site = workspace.config.project.site.to_site();
            add_site(&mut conn, &site).context("Failed to seed site from [site]")?;
            info!(tasks = site.tasks.len(), "site seeded");
        }

        Ok(workspace)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .shotline directory path
    pub fn dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the resolved database path
    pub fn database_path(&self) -> Result<PathBuf> {
        self.config.database_path()
    }

    /// Opens a connection to the workspace database
    pub fn connect(&self) -> Result<Connection> {
        open_database(
            &self.database_path()?,
            self.config.project.database.busy_timeout_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::get_site;
    use tempfile::TempDir;

    fn no_db_override() -> bool {
        std::env::var_os(crate::storage::config::DB_ENV).is_none()
    }

    #[test]
    fn init_creates_structure() {
        if !no_db_override() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        assert!(workspace.dir().is_dir());
        assert!(workspace.dir().join("config.toml").is_file());
        assert!(workspace.dir().join(".gitignore").is_file());
        assert!(workspace.dir().join("shotline.db").is_file());
    }

    #[test]
    fn init_seeds_site() {
        if !no_db_override() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        let site = get_site(&workspace.connect().unwrap()).unwrap();
        assert_eq!(site.tasks, vec!["mod", "rig", "ani", "fx", "lit", "comp"]);
        assert_eq!(site.default_asset_tasks, vec!["mod", "rig"]);
    }

    #[test]
    fn init_is_idempotent() {
        if !no_db_override() {
            return;
        }
        let dir = TempDir::new().unwrap();

        Workspace::init(dir.path()).unwrap();
        Workspace::init(dir.path()).unwrap();

        assert!(dir.path().join(".shotline").is_dir());
    }

    #[test]
    fn open_non_workspace_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Workspace::open(dir.path()).is_err());
    }

    #[test]
    fn open_database_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tracker.db");
        let conn = open_database(&path, 100).unwrap();

        assert!(path.is_file());
        assert_eq!(
            crate::storage::schema_version(&conn).unwrap(),
            crate::storage::SCHEMA_VERSION
        );
    }
}
