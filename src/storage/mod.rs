//! # Storage Layer
//!
//! Relational persistence for the tracker, on SQLite through `rusqlite`.
//!
//! ## Tables
//!
//! | Table | Primary key |
//! |-------|-------------|
//! | `sites` | `site` (always `"only"`) |
//! | `shows` | `show` |
//! | `groups` | `show, grp` |
//! | `units` | `show, category, grp, unit` |
//! | `tasks` | `show, category, grp, unit, task` |
//! | `versions` | `show, category, grp, unit, task, version` |
//! | `reviews` | `show, category, grp, unit, task, version, created` |
//! | `users` | `userid` |
//! | `user_configs` | `userid` |
//!
//! ## Conventions
//!
//! - Stores are free functions over a caller-supplied connection: reads take
//!   `&Connection`, writes take `&mut Connection`. Nothing here keeps a handle.
//! - Every write goes through a [`Batch`], which runs in one transaction.
//! - Cross-table deletes are issued only by [`delete_tree`].
//! - Array columns are JSON text; unset timestamps are [`ZERO_TIME`].
//!
//! ## Workspace
//!
//! ```text
//! .shotline/
//! ├── config.toml    # Project configuration
//! └── shotline.db    # Default database location
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for opening a configured database
//! - [`Config`] - Project and global configuration
//! - [`UnitSearch`] - Filters for [`search_units`]

mod batch;
mod cascade;
mod config;
mod group;
mod marshal;
mod password;
mod review;
mod schema;
mod search;
mod show;
mod site;
mod task;
mod unit;
mod user;
mod version;
mod workspace;

pub use batch::{Batch, Statement};
pub use cascade::{delete_tree, Scope};
pub use config::{Config, ConfigError, GlobalConfig, LogLevel, OutputFormat, ProjectConfig};
pub use group::{add_group, delete_group, get_group, group_exists, show_groups, update_group};
pub use marshal::{Record, RowKey, ZERO_TIME};
pub use password::{Bcrypt, PasswordHasher};
pub use review::{add_review, version_reviews};
pub use schema::{init_tables, schema_version, table_counts, SCHEMA_VERSION, TABLES};
pub use search::{search_units, UnitSearch};
pub use show::{add_show, all_shows, delete_show, get_show, show_exists, update_show};
pub use site::{add_site, delete_site, find_site, get_site, update_site};
pub use task::{
    add_task, delete_task, get_task, task_exists, tasks_having_due, tasks_need_review, unit_tasks,
    update_task,
    update_task_publish_version, update_task_working_version, user_tasks,
};
pub use unit::{add_unit, delete_unit, get_unit, unit_exists, update_unit};
pub use user::{
    add_user, add_user_with, delete_user, get_user, get_user_config, update_user,
    update_user_config, update_user_password, update_user_password_with, user_exists,
    user_password_match, user_password_match_with, users,
};
pub use version::{
    add_version, delete_version, get_version, task_versions, unit_versions, update_version,
    update_version_status, version_exists,
};
pub use workspace::{open_database, Workspace, WorkspaceError};
