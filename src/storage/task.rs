//! Task store

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::info;

use super::batch::{Batch, Statement};
use super::cascade::{delete_tree, Scope};
use super::marshal::{self, select_columns, text, time, where_key, Record, RowKey, Scan, ZERO_TIME};
use super::site::{find_site, get_site};
use super::unit::unit_exists;
use super::version::get_version;
use crate::domain::{
    validate_show_name, validate_user_id, Category, Task, TaskId, UnitId, VersionStatus,
};
use crate::error::{Error, Result};

const TASK_KEY: &[&str] = &["show", "category", "grp", "unit", "task"];

impl Record for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [&'static str] = &[
        "show",
        "category",
        "grp",
        "unit",
        "task",
        "status",
        "due_date",
        "assignee",
        "publish_version",
        "working_version",
        "working_version_status",
    ];
    const KEY_LEN: usize = 5;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.show),
            text(self.category.as_str()),
            text(&self.group),
            text(&self.unit),
            text(&self.task),
            text(self.status.as_str()),
            time(&self.due_date),
            text(&self.assignee),
            text(&self.publish_version),
            text(&self.working_version),
            text(self.working_version_status.map_or("", |s| s.as_str())),
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
            status: c.parse()?,
            due_date: c.time()?,
            assignee: c.string()?,
            publish_version: c.string()?,
            working_version: c.string()?,
            working_version_status: c.parse_opt()?,
        })
    }
}

/// Checks the task value, its unit, its name against the site and its version pointers
fn verify(conn: &Connection, task: &Task) -> Result<()> {
    task.validate()?;
    let unit = task.unit_id();
    if !unit_exists(conn, &unit)? {
        return Err(Error::not_found("unit", &unit));
    }
    if !get_site(conn)?.has_task(&task.task) {
        return Err(Error::bad_request(format!(
            "task not defined in site: {}",
            task.task
        )));
    }
    let id = task.id();
    for name in [&task.working_version, &task.publish_version] {
        if !name.is_empty() {
            get_version(conn, &id.version(name.as_str())?)?;
        }
    }
    Ok(())
}

/// Adds a task row without touching the unit's task list, so the task starts hidden
/// unless the unit already lists it
pub fn add_task(conn: &mut Connection, task: &Task) -> Result<()> {
    verify(conn, task)?;
    let id = task.id();
    if task_exists(conn, &id)? {
        return Err(Error::already_exists("task", &id));
    }
    Batch::single(marshal::insert(task)).exec(conn)?;
    info!(task = %id, "task added");
    Ok(())
}

pub fn task_exists(conn: &Connection, id: &TaskId) -> Result<bool> {
    marshal::exists::<Task, _>(conn, id)
}

pub fn get_task(conn: &Connection, id: &TaskId) -> Result<Task> {
    id.validate()?;
    marshal::select_by_key(conn, id)?.ok_or_else(|| Error::not_found("task", id))
}

/// Overwrites every column of an existing task
pub fn update_task(conn: &mut Connection, task: &Task) -> Result<()> {
    verify(conn, task)?;
    let id = task.id();
    if !task_exists(conn, &id)? {
        return Err(Error::not_found("task", &id));
    }
    Batch::single(marshal::update(task)).exec(conn)?;
    info!(task = %id, "task updated");
    Ok(())
}

/// Deletes a task and its versions
pub fn delete_task(conn: &mut Connection, id: &TaskId) -> Result<()> {
    id.validate()?;
    if !task_exists(conn, id)? {
        return Err(Error::not_found("task", id));
    }
    delete_tree(conn, Scope::Task(id))
}

fn set_columns(id: &TaskId, assignments: &[(&str, Value)]) -> Statement {
    let set = assignments
        .iter()
        .enumerate()
        .map(|(i, (col, _))| format!("{} = ?{}", col, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE tasks SET {} WHERE {}",
        set,
        where_key(TASK_KEY, assignments.len() + 1)
    );
    let mut params: Vec<Value> = assignments.iter().map(|(_, v)| v.clone()).collect();
    params.extend(id.key_values());
    Statement::new(sql, params)
}

/// Points the task at one of its versions and copies that version's status.
/// An empty name clears the pointer.
pub fn update_task_working_version(conn: &mut Connection, id: &TaskId, version: &str) -> Result<()> {
    id.validate()?;
    if !task_exists(conn, id)? {
        return Err(Error::not_found("task", id));
    }
    let status: Option<VersionStatus> = if version.is_empty() {
        None
    } else {
        Some(get_version(conn, &id.version(version)?)?.status)
    };

    let stmt = set_columns(
        id,
        &[
            ("working_version", text(version)),
            ("working_version_status", text(status.map_or("", |s| s.as_str()))),
        ],
    );
    Batch::single(stmt).exec(conn)?;
    info!(task = %id, version, "working version set");
    Ok(())
}

/// Marks one of the task's versions as published. An empty name clears the pointer.
pub fn update_task_publish_version(conn: &mut Connection, id: &TaskId, version: &str) -> Result<()> {
    id.validate()?;
    if !task_exists(conn, id)? {
        return Err(Error::not_found("task", id));
    }
    if !version.is_empty() {
        get_version(conn, &id.version(version)?)?;
    }

    Batch::single(set_columns(id, &[("publish_version", text(version))])).exec(conn)?;
    info!(task = %id, version, "publish version set");
    Ok(())
}

/// Every task row of a unit, hidden ones included, in site task order
pub fn unit_tasks(conn: &Connection, id: &UnitId) -> Result<Vec<Task>> {
    id.validate()?;
    let tail = format!(
        "WHERE {} ORDER BY task",
        where_key(&TASK_KEY[..4], 1)
    );
    let mut tasks: Vec<Task> = marshal::select_where(conn, &tail, params_from_iter(id.key_values()))?;

    if let Some(site) = find_site(conn)? {
        // Stable sort keeps name order for tasks the site no longer lists.
        tasks.sort_by_key(|t| site.task_index(&t.task).unwrap_or(usize::MAX));
    }
    Ok(tasks)
}

/// Tasks assigned to a user that are visible on their unit
pub fn user_tasks(conn: &Connection, user: &str) -> Result<Vec<Task>> {
    validate_user_id(user)?;
    let sql = format!(
        "SELECT {} FROM tasks \
         JOIN units ON units.show = tasks.show AND units.category = tasks.category \
         AND units.grp = tasks.grp AND units.unit = tasks.unit \
         WHERE tasks.assignee = ?1 \
         AND EXISTS (SELECT 1 FROM json_each(units.tasks) WHERE json_each.value = tasks.task) \
         ORDER BY tasks.show, tasks.category, tasks.grp, tasks.unit, tasks.task",
        select_columns::<Task>(Some("tasks"))
    );
    marshal::query(conn, &sql, params![user])
}

/// Tasks of a show and category that have a due date, earliest first
pub fn tasks_having_due(conn: &Connection, show: &str, category: Category) -> Result<Vec<Task>> {
    validate_show_name(show)?;
    marshal::select_where(
        conn,
        "WHERE show = ?1 AND category = ?2 AND due_date != ?3 ORDER BY due_date, grp, unit, task",
        params![show, category.as_str(), ZERO_TIME],
    )
}

/// Tasks of a show and category whose working version awaits review
pub fn tasks_need_review(conn: &Connection, show: &str, category: Category) -> Result<Vec<Task>> {
    validate_show_name(show)?;
    marshal::select_where(
        conn,
        "WHERE show = ?1 AND category = ?2 AND working_version_status = ?3 ORDER BY grp, unit, task",
        params![show, category.as_str(), VersionStatus::NeedReview.as_str()],
    )
}
