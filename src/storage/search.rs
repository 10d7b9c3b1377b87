//! Unit search
//!
//! Filters are conjunctive. Unit-level filters read the `units` row; task-level
//! filters (assignee, task status, due date) join `tasks`, which can yield the
//! same unit more than once, so results are de-duplicated on the unit key here
//! rather than with `DISTINCT`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use super::marshal::{self, select_columns, text, time};
use crate::domain::{validate_show_name, Category, TaskStatus, Unit, UnitId, UnitStatus};
use crate::error::Result;

/// Unit search filters. Only `show` is required; empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSearch {
    pub show: String,
    pub category: Option<Category>,
    /// Group names, any of which may match
    pub groups: Vec<String>,
    /// Unit name fragments, any of which may match; `*` is a wildcard
    pub units: Vec<String>,
    pub tag: String,
    pub status: Option<UnitStatus>,
    /// Matches units listing this task
    pub task: String,
    pub assignee: String,
    pub task_status: Option<TaskStatus>,
    pub due: Option<DateTime<Utc>>,
}

impl UnitSearch {
    pub fn new(show: impl Into<String>) -> Self {
        Self {
            show: show.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.units.push(unit.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn status(mut self, status: UnitStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    pub fn task_status(mut self, status: TaskStatus) -> Self {
        self.task_status = Some(status);
        self
    }

    pub fn due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    /// Returns true if any filter needs the tasks table
    fn joins_tasks(&self) -> bool {
        !self.assignee.is_empty() || self.task_status.is_some() || self.due.is_some()
    }

    /// Builds the query text and its parameters
    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut conds: Vec<String> = Vec::new();
        let mut vals: Vec<Value> = Vec::new();
        let mut push = |conds: &mut Vec<String>, cond: &str, val: Value| {
            vals.push(val);
            conds.push(cond.replace("?#", &format!("?{}", vals.len())));
        };

        push(&mut conds, "units.show = ?#", text(&self.show));
        if let Some(category) = self.category {
            push(&mut conds, "units.category = ?#", text(category.as_str()));
        }

        let mut any_unit = Vec::new();
        for unit in self.units.iter().filter(|u| !u.is_empty()) {
            push(&mut any_unit, "units.unit LIKE ?# ESCAPE '\\'", Value::Text(like_pattern(unit)));
        }
        if !any_unit.is_empty() {
            conds.push(format!("({})", any_unit.join(" OR ")));
        }

        let mut any_group = Vec::new();
        for group in self.groups.iter().filter(|g| !g.is_empty()) {
            push(&mut any_group, "units.grp = ?#", text(group));
        }
        if !any_group.is_empty() {
            conds.push(format!("({})", any_group.join(" OR ")));
        }

        if !self.tag.is_empty() {
            push(
                &mut conds,
                "EXISTS (SELECT 1 FROM json_each(units.tags) WHERE json_each.value = ?#)",
                text(&self.tag),
            );
        }
        if let Some(status) = self.status {
            push(&mut conds, "units.status = ?#", text(status.as_str()));
        }
        if !self.task.is_empty() {
            push(
                &mut conds,
                "EXISTS (SELECT 1 FROM json_each(units.tasks) WHERE json_each.value = ?#)",
                text(&self.task),
            );
        }
        if !self.assignee.is_empty() {
            push(&mut conds, "tasks.assignee = ?#", text(&self.assignee));
        }
        if let Some(status) = self.task_status {
            push(&mut conds, "tasks.status = ?#", text(status.as_str()));
        }
        if self.due.is_some() {
            push(&mut conds, "tasks.due_date = ?#", time(&self.due));
        }

        let mut sql = format!("SELECT {} FROM units", select_columns::<Unit>(Some("units")));
        if self.joins_tasks() {
            sql.push_str(
                " JOIN tasks ON tasks.show = units.show AND tasks.category = units.category \
                 AND tasks.grp = units.grp AND tasks.unit = units.unit",
            );
        }
        sql.push_str(" WHERE ");
        sql.push_str(&conds.join(" AND "));
        (sql, vals)
    }
}

/// LIKE pattern for a unit fragment: `*` is the only wildcard, and a
/// fragment without one matches anywhere in the name
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    if fragment.contains('*') {
        escaped.replace('*', "%")
    } else {
        format!("%{}%", escaped)
    }
}

/// Units matching every supplied filter, sorted by unit name
pub fn search_units(conn: &Connection, search: &UnitSearch) -> Result<Vec<Unit>> {
    validate_show_name(&search.show)?;
    let (sql, vals) = search.to_sql();
    debug!(%sql, params = vals.len(), "searching units");

    let rows: Vec<Unit> = marshal::query(conn, &sql, params_from_iter(vals))?;
    let mut seen: HashSet<UnitId> = HashSet::new();
    let mut units: Vec<Unit> = rows.into_iter().filter(|u| seen.insert(u.id())).collect();
    units.sort_by(|a, b| a.unit.cmp(&b.unit));
    Ok(units)
}
