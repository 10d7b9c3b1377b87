//! Version store
//!
//! A task's `working_version_status` mirrors the status of its working version.
//! Every write that can change either side updates both in one transaction.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use tracing::info;

use super::batch::{Batch, Statement};
use super::cascade::{delete_tree, Scope};
use super::marshal::{self, list, text, time, where_key, Record, RowKey, Scan};
use super::task::get_task;
use crate::domain::{TaskId, UnitId, Version, VersionId, VersionStatus};
use crate::error::{Error, Result};

impl Record for Version {
    const TABLE: &'static str = "versions";
    const COLUMNS: &'static [&'static str] = &[
        "show",
        "category",
        "grp",
        "unit",
        "task",
        "version",
        "owner",
        "status",
        "output_files",
        "images",
        "mov",
        "work_file",
        "start_date",
        "end_date",
    ];
    const KEY_LEN: usize = 6;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.show),
            text(self.category.as_str()),
            text(&self.group),
            text(&self.unit),
            text(&self.task),
            text(&self.version),
            text(&self.owner),
            text(self.status.as_str()),
            list(&self.output_files),
            list(&self.images),
            text(&self.mov),
            text(&self.work_file),
            time(&self.start_date),
            time(&self.end_date),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut c = Scan::new(row);
        Ok(Self {
            show: c.string()?,
            category: c.parse()?,
            group: c.string()?,
            unit: c.string()?,
            task: c.string()?,
            version: c.string()?,
            owner: c.string()?,
            status: c.parse()?,
            output_files: c.list()?,
            images: c.list()?,
            mov: c.string()?,
            work_file: c.string()?,
            start_date: c.time()?,
            end_date: c.time()?,
        })
    }
}

/// Sets the task's working version and its status
fn set_working(task: &TaskId, version: &str, status: VersionStatus) -> Statement {
    let mut params = vec![text(version), text(status.as_str())];
    params.extend(task.key_values());
    Statement::new(
        format!(
            "UPDATE tasks SET working_version = ?1, working_version_status = ?2 WHERE {}",
            where_key(&["show", "category", "grp", "unit", "task"], 3)
        ),
        params,
    )
}

/// Adds a version and makes it the task's working version, atomically
pub fn add_version(conn: &mut Connection, version: &Version) -> Result<()> {
    version.validate()?;
    let task = version.task_id();
    get_task(conn, &task)?;
    let id = version.id();
    if version_exists(conn, &id)? {
        return Err(Error::already_exists("version", &id));
    }

    let mut batch = Batch::new();
    batch.push(marshal::insert(version));
    batch.push(set_working(&task, &version.version, version.status));
    batch.exec(conn)?;

    info!(version = %id, "version added");
    Ok(())
}

pub fn version_exists(conn: &Connection, id: &VersionId) -> Result<bool> {
    marshal::exists::<Version, _>(conn, id)
}

pub fn get_version(conn: &Connection, id: &VersionId) -> Result<Version> {
    id.validate()?;
    marshal::select_by_key(conn, id)?.ok_or_else(|| Error::not_found("version", id))
}

/// Overwrites an existing version; refreshes the task's working status when
/// this is its working version
pub fn update_version(conn: &mut Connection, version: &Version) -> Result<()> {
    version.validate()?;
    let id = version.id();
    if !version_exists(conn, &id)? {
        return Err(Error::not_found("version", &id));
    }
    let task = get_task(conn, &id.task_id())?;

    let mut batch = Batch::new();
    batch.push(marshal::update(version));
    if task.working_version == version.version {
        batch.push(set_working(&task.id(), &version.version, version.status));
    }
    batch.exec(conn)?;

    info!(version = %id, "version updated");
    Ok(())
}

/// Statements setting a version's status, plus the task's working status
/// when it is the working version
pub(super) fn status_statements(
    conn: &Connection,
    id: &VersionId,
    status: VersionStatus,
) -> Result<Vec<Statement>> {
    let task = get_task(conn, &id.task_id())?;
    let mut params = vec![text(status.as_str())];
    params.extend(id.key_values());
    let mut stmts = vec![Statement::new(
        format!(
            "UPDATE versions SET status = ?1 WHERE {}",
            where_key(Version::key_columns(), 2)
        ),
        params,
    )];
    if task.working_version == id.version {
        stmts.push(set_working(&task.id(), &id.version, status));
    }
    Ok(stmts)
}

/// Changes only the status of a version, keeping the task's working status in step
pub fn update_version_status(
    conn: &mut Connection,
    id: &VersionId,
    status: VersionStatus,
) -> Result<()> {
    id.validate()?;
    if !version_exists(conn, id)? {
        return Err(Error::not_found("version", id));
    }
    let batch: Batch = status_statements(conn, id, status)?.into_iter().collect();
    batch.exec(conn)?;

    info!(version = %id, %status, "version status updated");
    Ok(())
}

/// Deletes a version and clears task pointers that referenced it
pub fn delete_version(conn: &mut Connection, id: &VersionId) -> Result<()> {
    id.validate()?;
    if !version_exists(conn, id)? {
        return Err(Error::not_found("version", id));
    }
    delete_tree(conn, Scope::Version(id))
}

/// Versions of a task, ordered by version name
pub fn task_versions(conn: &Connection, id: &TaskId) -> Result<Vec<Version>> {
    id.validate()?;
    let tail = format!(
        "WHERE {} ORDER BY version",
        where_key(&Version::key_columns()[..5], 1)
    );
    marshal::select_where(conn, &tail, params_from_iter(id.key_values()))
}

/// Versions of every task of a unit, ordered by version name then task
pub fn unit_versions(conn: &Connection, id: &UnitId) -> Result<Vec<Version>> {
    id.validate()?;
    let tail = format!(
        "WHERE {} ORDER BY version, task",
        where_key(&Version::key_columns()[..4], 1)
    );
    marshal::select_where(conn, &tail, params_from_iter(id.key_values()))
}
