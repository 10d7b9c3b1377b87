//! Group store

use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use tracing::info;

use super::batch::Batch;
use super::cascade::{delete_tree, Scope};
use super::marshal::{self, attrs, list, text, Record, Scan};
use super::show::show_exists;
use super::site::get_site;
use crate::domain::{validate_show_name, Group, GroupId};
use crate::error::{Error, Result};

impl Record for Group {
    const TABLE: &'static str = "groups";
    const COLUMNS: &'static [&'static str] = &["show", "grp", "default_tasks", "notes", "attrs"];
    const KEY_LEN: usize = 2;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.show),
            text(&self.group),
            list(&self.default_tasks),
            text(&self.notes),
            attrs(&self.attrs),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut c = Scan::new(row);
        Ok(Self {
            show: c.string()?,
            group: c.string()?,
            default_tasks: c.list()?,
            notes: c.string()?,
            attrs: c.attrs()?,
        })
    }
}

fn verify(conn: &Connection, group: &Group) -> Result<()> {
    group.validate()?;
    if !group.default_tasks.is_empty() {
        get_site(conn)?.check_tasks("default task", &group.default_tasks)?;
    }
    Ok(())
}

/// Adds a group to an existing show
pub fn add_group(conn: &mut Connection, group: &Group) -> Result<()> {
    verify(conn, group)?;
    if !show_exists(conn, &group.show)? {
        return Err(Error::not_found("show", &group.show));
    }
    let id = group.id();
    if group_exists(conn, &id)? {
        return Err(Error::already_exists("group", &id));
    }
    Batch::single(marshal::insert(group)).exec(conn)?;
    info!(group = %id, "group added");
    Ok(())
}

pub fn group_exists(conn: &Connection, id: &GroupId) -> Result<bool> {
    marshal::exists::<Group, _>(conn, id)
}

pub fn get_group(conn: &Connection, id: &GroupId) -> Result<Group> {
    id.validate()?;
    marshal::select_by_key(conn, id)?.ok_or_else(|| Error::not_found("group", id))
}

/// Groups of a show, ordered by name
pub fn show_groups(conn: &Connection, show: &str) -> Result<Vec<Group>> {
    validate_show_name(show)?;
    marshal::select_where(conn, "WHERE show = ?1 ORDER BY grp", params![show])
}

pub fn update_group(conn: &mut Connection, group: &Group) -> Result<()> {
    verify(conn, group)?;
    let id = group.id();
    if !group_exists(conn, &id)? {
        return Err(Error::not_found("group", &id));
    }
    Batch::single(marshal::update(group)).exec(conn)?;
    info!(group = %id, "group updated");
    Ok(())
}

/// Deletes a group and the units, tasks and versions inside it
pub fn delete_group(conn: &mut Connection, id: &GroupId) -> Result<()> {
    id.validate()?;
    if !group_exists(conn, id)? {
        return Err(Error::not_found("group", id));
    }
    delete_tree(conn, Scope::Group(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Show, Site};
    use crate::storage::schema::init_tables;
    use crate::storage::show::add_show;
    use crate::storage::site::add_site;

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        let site = Site {
            tasks: vec!["fx".to_string(), "lit".to_string()],
            ..Default::default()
        };
        add_site(&mut conn, &site).unwrap();
        add_show(&mut conn, &Show::new("TEST")).unwrap();
        conn
    }

    fn group(name: &str) -> Group {
        Group::new(&GroupId::new("TEST", name).unwrap())
    }

    #[test]
    fn add_then_get() {
        let mut conn = conn();
        let mut g = group("CG");
        g.default_tasks = vec!["fx".to_string()];
        g.attrs.set("sequence", "opening");
        add_group(&mut conn, &g).unwrap();

        assert_eq!(get_group(&conn, &g.id()).unwrap(), g);
    }

    #[test]
    fn requires_show() {
        let mut conn = conn();
        let g = Group::new(&GroupId::new("OTHER", "CG").unwrap());
        assert!(add_group(&mut conn, &g).unwrap_err().is_not_found());
    }

    #[test]
    fn default_tasks_checked_against_site() {
        let mut conn = conn();
        let mut g = group("CG");
        g.default_tasks = vec!["paint".to_string()];
        assert!(add_group(&mut conn, &g).unwrap_err().is_bad_request());
    }

    #[test]
    fn show_groups_sorted() {
        let mut conn = conn();
        add_group(&mut conn, &group("seq_b")).unwrap();
        add_group(&mut conn, &group("seq_a")).unwrap();

        let names: Vec<String> = show_groups(&conn, "TEST")
            .unwrap()
            .into_iter()
            .map(|g| g.group)
            .collect();
        assert_eq!(names, vec!["seq_a", "seq_b"]);
    }

    #[test]
    fn update_and_delete() {
        let mut conn = conn();
        let mut g = group("CG");
        add_group(&mut conn, &g).unwrap();

        g.notes = "night shots".to_string();
        update_group(&mut conn, &g).unwrap();
        assert_eq!(get_group(&conn, &g.id()).unwrap().notes, "night shots");

        delete_group(&mut conn, &g.id()).unwrap();
        assert!(get_group(&conn, &g.id()).unwrap_err().is_not_found());
    }
}
