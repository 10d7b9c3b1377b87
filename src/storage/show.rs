//! Show store

use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use tracing::info;

use super::batch::Batch;
use super::cascade::{delete_tree, Scope};
use super::marshal::{self, attrs, list, text, time, Record, Scan};
use super::site::get_site;
use crate::domain::{validate_show_name, Show};
use crate::error::{Error, Result};

impl Record for Show {
    const TABLE: &'static str = "shows";
    const COLUMNS: &'static [&'static str] = &[
        "show",
        "status",
        "client",
        "director",
        "supervisor",
        "cg_supervisor",
        "pd",
        "managers",
        "crank_in",
        "crank_up",
        "start_date",
        "release_date",
        "due_date",
        "output_size",
        "view_lut",
        "default_shot_tasks",
        "default_asset_tasks",
        "tags",
        "notes",
        "attrs",
    ];
    const KEY_LEN: usize = 1;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.show),
            text(self.status.as_str()),
            text(&self.client),
            text(&self.director),
            text(&self.supervisor),
            text(&self.cg_supervisor),
            text(&self.pd),
            list(&self.managers),
            time(&self.crank_in),
            time(&self.crank_up),
            time(&self.start_date),
            time(&self.release_date),
            time(&self.due_date),
            text(&self.output_size),
            text(&self.view_lut),
            list(&self.default_shot_tasks),
            list(&self.default_asset_tasks),
            list(&self.tags),
            text(&self.notes),
            attrs(&self.attrs),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut c = Scan::new(row);
        Ok(Self {
            show: c.string()?,
            status: c.parse()?,
            client: c.string()?,
            director: c.string()?,
            supervisor: c.string()?,
            cg_supervisor: c.string()?,
            pd: c.string()?,
            managers: c.list()?,
            crank_in: c.time()?,
            crank_up: c.time()?,
            start_date: c.time()?,
            release_date: c.time()?,
            due_date: c.time()?,
            output_size: c.string()?,
            view_lut: c.string()?,
            default_shot_tasks: c.list()?,
            default_asset_tasks: c.list()?,
            tags: c.list()?,
            notes: c.string()?,
            attrs: c.attrs()?,
        })
    }
}

/// Checks the fields of a show against the site and its own rules
fn verify(conn: &Connection, show: &Show) -> Result<()> {
    show.validate()?;
    if !show.default_shot_tasks.is_empty() || !show.default_asset_tasks.is_empty() {
        let site = get_site(conn)?;
        site.check_tasks("default shot task", &show.default_shot_tasks)?;
        site.check_tasks("default asset task", &show.default_asset_tasks)?;
    }
    Ok(())
}

pub fn add_show(conn: &mut Connection, show: &Show) -> Result<()> {
    verify(conn, show)?;
    if show_exists(conn, &show.show)? {
        return Err(Error::already_exists("show", &show.show));
    }
    Batch::single(marshal::insert(show)).exec(conn)?;
    info!(show = %show.show, "show added");
    Ok(())
}

pub fn show_exists(conn: &Connection, show: &str) -> Result<bool> {
    validate_show_name(show)?;
    marshal::exists::<Show, _>(conn, show)
}

pub fn get_show(conn: &Connection, show: &str) -> Result<Show> {
    validate_show_name(show)?;
    marshal::select_by_key(conn, show)?.ok_or_else(|| Error::not_found("show", show))
}

/// Every show, ordered by name
pub fn all_shows(conn: &Connection) -> Result<Vec<Show>> {
    marshal::select_where(conn, "ORDER BY show", [])
}

/// Overwrites every column of an existing show
pub fn update_show(conn: &mut Connection, show: &Show) -> Result<()> {
    verify(conn, show)?;
    if !show_exists(conn, &show.show)? {
        return Err(Error::not_found("show", &show.show));
    }
    Batch::single(marshal::update(show)).exec(conn)?;
    info!(show = %show.show, "show updated");
    Ok(())
}

/// Deletes a show with all of its groups, units, tasks and versions
pub fn delete_show(conn: &mut Connection, show: &str) -> Result<()> {
    if !show_exists(conn, show)? {
        return Err(Error::not_found("show", show));
    }
    delete_tree(conn, Scope::Show(show))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ShowStatus, Site};
    use crate::storage::schema::init_tables;
    use crate::storage::site::add_site;
    use chrono::{TimeZone, Utc};

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        let site = Site {
            tasks: vec!["fx".to_string(), "comp".to_string()],
            ..Default::default()
        };
        add_site(&mut conn, &site).unwrap();
        conn
    }

    #[test]
    fn add_then_get_roundtrip() {
        let mut conn = conn();
        let mut show = Show::new("TEST");
        show.status = ShowStatus::Prod;
        show.client = "studio".to_string();
        show.managers = vec!["jane".to_string(), "kim".to_string()];
        show.crank_in = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single();
        show.output_size = "2048x1152".to_string();
        show.default_shot_tasks = vec!["fx".to_string(), "comp".to_string()];
        show.attrs.set("fps", "24");

        add_show(&mut conn, &show).unwrap();
        assert_eq!(get_show(&conn, "TEST").unwrap(), show);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut conn = conn();
        add_show(&mut conn, &Show::new("TEST")).unwrap();
        let err = add_show(&mut conn, &Show::new("TEST")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
        assert!(err.is_bad_request());
    }

    #[test]
    fn default_tasks_must_be_site_tasks() {
        let mut conn = conn();
        let mut show = Show::new("TEST");
        show.default_asset_tasks = vec!["paint".to_string()];
        assert!(add_show(&mut conn, &show).unwrap_err().is_bad_request());
    }

    #[test]
    fn all_shows_sorted() {
        let mut conn = conn();
        for name in ["ZETA", "ALPHA", "MID"] {
            add_show(&mut conn, &Show::new(name)).unwrap();
        }
        let names: Vec<String> = all_shows(&conn).unwrap().into_iter().map(|s| s.show).collect();
        assert_eq!(names, vec!["ALPHA", "MID", "ZETA"]);
    }

    #[test]
    fn update_and_delete_require_row() {
        let mut conn = conn();
        assert!(update_show(&mut conn, &Show::new("TEST")).unwrap_err().is_not_found());
        assert!(delete_show(&mut conn, "TEST").unwrap_err().is_not_found());
        assert!(get_show(&conn, "TEST").unwrap_err().is_not_found());
        assert!(get_show(&conn, "BAD NAME").unwrap_err().is_bad_request());
    }
}
