//! Unit store
//!
//! Adding or updating a unit normalizes its task list to site order and creates
//! a task row for every listed task that has none. Task rows are never removed
//! here: a task dropped from the list stays stored as a hidden task.

use std::collections::HashSet;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use tracing::info;

use super::batch::Batch;
use super::cascade::{delete_tree, Scope};
use super::group::group_exists;
use super::marshal::{self, attrs, list, text, time, where_key, Record, RowKey, Scan};
use super::site::get_site;
use crate::domain::{Task, Unit, UnitId};
use crate::error::{Error, Result};

impl Record for Unit {
    const TABLE: &'static str = "units";
    const COLUMNS: &'static [&'static str] = &[
        "show",
        "category",
        "grp",
        "unit",
        "status",
        "edit_order",
        "description",
        "cg_description",
        "tags",
        "tasks",
        "due_date",
        "attrs",
    ];
    const KEY_LEN: usize = 4;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.show),
            text(self.category.as_str()),
            text(&self.group),
            text(&self.unit),
            text(self.status.as_str()),
            Value::Integer(self.edit_order),
            text(&self.description),
            text(&self.cg_description),
            list(&self.tags),
            list(&self.tasks),
            time(&self.due_date),
            attrs(&self.attrs),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut c = Scan::new(row);
        Ok(Self {
            show: c.string()?,
            category: c.parse()?,
            group: c.string()?,
            unit: c.string()?,
            status: c.parse()?,
            edit_order: c.next()?,
            description: c.string()?,
            cg_description: c.string()?,
            tags: c.list()?,
            tasks: c.list()?,
            due_date: c.time()?,
            attrs: c.attrs()?,
        })
    }
}

/// Validates the unit and returns a copy whose tasks follow site order
fn normalize(conn: &Connection, unit: &Unit) -> Result<Unit> {
    unit.validate()?;
    let site = get_site(conn)?;
    let mut unit = unit.clone();
    unit.tasks = site.order_tasks(&unit.tasks)?;
    Ok(unit)
}

/// Names of every task row stored for the unit, hidden ones included
fn stored_task_names(conn: &Connection, id: &UnitId) -> Result<HashSet<String>> {
    let sql = format!(
        "SELECT task FROM tasks WHERE {}",
        where_key(&["show", "category", "grp", "unit"], 1)
    );
    let mut stmt = conn.prepare(&sql)?;
    let names = stmt
        .query_map(params_from_iter(id.key_values()), |row| row.get(0))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(names)
}

/// Adds a unit and one in-progress task row per listed task, atomically
pub fn add_unit(conn: &mut Connection, unit: &Unit) -> Result<()> {
    let unit = normalize(conn, unit)?;
    let id = unit.id();
    let group = id.group_id();
    if !group_exists(conn, &group)? {
        return Err(Error::not_found("group", &group));
    }
    if unit_exists(conn, &id)? {
        return Err(Error::already_exists("unit", &id));
    }

    let mut batch = Batch::new();
    batch.push(marshal::insert(&unit));
    for name in &unit.tasks {
        batch.push(marshal::insert(&Task::new(&id.task(name)?)));
    }
    batch.exec(conn)?;

    info!(unit = %id, tasks = unit.tasks.len(), "unit added");
    Ok(())
}

pub fn unit_exists(conn: &Connection, id: &UnitId) -> Result<bool> {
    marshal::exists::<Unit, _>(conn, id)
}

pub fn get_unit(conn: &Connection, id: &UnitId) -> Result<Unit> {
    id.validate()?;
    marshal::select_by_key(conn, id)?.ok_or_else(|| Error::not_found("unit", id))
}

/// Overwrites an existing unit and creates task rows for newly listed tasks
pub fn update_unit(conn: &mut Connection, unit: &Unit) -> Result<()> {
    let unit = normalize(conn, unit)?;
    let id = unit.id();
    if !unit_exists(conn, &id)? {
        return Err(Error::not_found("unit", &id));
    }

    let stored = stored_task_names(conn, &id)?;
    let mut batch = Batch::new();
    batch.push(marshal::update(&unit));
    let mut added = 0;
    for name in unit.tasks.iter().filter(|t| !stored.contains(*t)) {
        batch.push(marshal::insert(&Task::new(&id.task(name)?)));
        added += 1;
    }
    batch.exec(conn)?;

    info!(unit = %id, added_tasks = added, "unit updated");
    Ok(())
}

/// Deletes a unit with its tasks and versions
pub fn delete_unit(conn: &mut Connection, id: &UnitId) -> Result<()> {
    id.validate()?;
    if !unit_exists(conn, id)? {
        return Err(Error::not_found("unit", id));
    }
    delete_tree(conn, Scope::Unit(id))
}
