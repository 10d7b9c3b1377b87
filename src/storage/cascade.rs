//! Hierarchical deletes
//!
//! A delete removes the addressed row and every descendant row sharing its key
//! prefix, child tables first. This is the only code issuing cross-table
//! deletes.

use rusqlite::Connection;
use tracing::info;

use super::batch::{Batch, Statement};
use super::marshal::{text, where_key, RowKey};
use crate::domain::{GroupId, TaskId, UnitId, VersionId};
use crate::error::Result;

/// The root of a delete
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Show(&'a str),
    Group(&'a GroupId),
    Unit(&'a UnitId),
    Task(&'a TaskId),
    Version(&'a VersionId),
    User(&'a str),
}

const UNIT_KEY: &[&str] = &["show", "category", "grp", "unit"];
const TASK_KEY: &[&str] = &["show", "category", "grp", "unit", "task"];
const VERSION_KEY: &[&str] = &["show", "category", "grp", "unit", "task", "version"];

fn delete(table: &str, key: &[&str], params: Vec<rusqlite::types::Value>) -> Statement {
    Statement::new(
        format!("DELETE FROM {} WHERE {}", table, where_key(key, 1)),
        params,
    )
}

impl Scope<'_> {
    /// Child-first delete statements for this scope
    pub fn statements(&self) -> Vec<Statement> {
        match self {
            Scope::Show(show) => {
                let p = show.key_values();
                let mut stmts: Vec<Statement> =
                    ["reviews", "versions", "tasks", "units", "groups", "shows"]
                        .iter()
                        .map(|t| delete(t, &["show"], p.clone()))
                        .collect();
                stmts.push(Statement::new(
                    "UPDATE user_configs SET current_show = '' WHERE current_show = ?1",
                    p,
                ));
                stmts
            }
            Scope::Group(id) => {
                let p = id.key_values();
                ["reviews", "versions", "tasks", "units", "groups"]
                    .iter()
                    .map(|t| delete(t, &["show", "grp"], p.clone()))
                    .collect()
            }
            Scope::Unit(id) => {
                let p = id.key_values();
                ["reviews", "versions", "tasks", "units"]
                    .iter()
                    .map(|t| delete(t, UNIT_KEY, p.clone()))
                    .collect()
            }
            Scope::Task(id) => {
                let p = id.key_values();
                ["reviews", "versions", "tasks"]
                    .iter()
                    .map(|t| delete(t, TASK_KEY, p.clone()))
                    .collect()
            }
            Scope::Version(id) => {
                let p = id.key_values();
                let task_where = where_key(TASK_KEY, 1);
                vec![
                    delete("reviews", VERSION_KEY, p.clone()),
                    delete("versions", VERSION_KEY, p.clone()),
                    Statement::new(
                        format!(
                            "UPDATE tasks SET working_version = '', working_version_status = '' \
                             WHERE {} AND working_version = ?6",
                            task_where
                        ),
                        p.clone(),
                    ),
                    Statement::new(
                        format!(
                            "UPDATE tasks SET publish_version = '' WHERE {} AND publish_version = ?6",
                            task_where
                        ),
                        p,
                    ),
                ]
            }
            Scope::User(id) => {
                let p = vec![text(id)];
                vec![
                    delete("user_configs", &["userid"], p.clone()),
                    delete("users", &["userid"], p),
                ]
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Scope::Show(s) => format!("show {}", s),
            Scope::Group(id) => format!("group {}", id),
            Scope::Unit(id) => format!("unit {}", id),
            Scope::Task(id) => format!("task {}", id),
            Scope::Version(id) => format!("version {}", id),
            Scope::User(id) => format!("user {}", id),
        }
    }
}

/// Deletes the scope root and all of its descendants in one transaction
pub fn delete_tree(conn: &mut Connection, scope: Scope<'_>) -> Result<()> {
    let batch: Batch = scope.statements().into_iter().collect();
    batch.exec(conn)?;
    info!(scope = %scope.describe(), "deleted with descendants");
    Ok(())
}
