//! Site store
//!
//! The site is a single row whose key is always [`SITE_KEY`].

use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use tracing::info;

use super::batch::{Batch, Statement};
use super::marshal::{self, list, text, Record, Scan};
use crate::domain::{Site, SITE_KEY};
use crate::error::{Error, Result};

impl Record for Site {
    const TABLE: &'static str = "sites";
    const COLUMNS: &'static [&'static str] = &[
        "site",
        "vfx_supervisors",
        "vfx_producers",
        "cg_supervisors",
        "project_managers",
        "tasks",
        "default_shot_tasks",
        "default_asset_tasks",
        "leads",
    ];
    const KEY_LEN: usize = 1;

    fn values(&self) -> Vec<Value> {
        vec![
            text(SITE_KEY),
            list(&self.vfx_supervisors),
            list(&self.vfx_producers),
            list(&self.cg_supervisors),
            list(&self.project_managers),
            list(&self.tasks),
            list(&self.default_shot_tasks),
            list(&self.default_asset_tasks),
            list(&self.leads),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut c = Scan::new(row);
        let _key: String = c.string()?;
        Ok(Self {
            vfx_supervisors: c.list()?,
            vfx_producers: c.list()?,
            cg_supervisors: c.list()?,
            project_managers: c.list()?,
            tasks: c.list()?,
            default_shot_tasks: c.list()?,
            default_asset_tasks: c.list()?,
            leads: c.list()?,
        })
    }
}

/// Inserts the site row if it does not exist yet; an existing row is left untouched
pub fn add_site(conn: &mut Connection, site: &Site) -> Result<()> {
    site.validate()?;

    let stmt = marshal::insert(site);
    let stmt = Statement::new(format!("{} ON CONFLICT (site) DO NOTHING", stmt.sql), stmt.params);
    Batch::single(stmt).exec(conn)?;
    info!(tasks = site.tasks.len(), "site added");
    Ok(())
}

pub fn get_site(conn: &Connection) -> Result<Site> {
    find_site(conn)?.ok_or_else(|| Error::not_found("site", SITE_KEY))
}

/// Returns the site, or `None` before it was added
pub fn find_site(conn: &Connection) -> Result<Option<Site>> {
    marshal::select_by_key(conn, SITE_KEY)
}

pub fn update_site(conn: &mut Connection, site: &Site) -> Result<()> {
    site.validate()?;
    if !marshal::exists::<Site, _>(conn, SITE_KEY)? {
        return Err(Error::not_found("site", SITE_KEY));
    }
    Batch::single(marshal::update(site)).exec(conn)?;
    info!("site updated");
    Ok(())
}

pub fn delete_site(conn: &mut Connection) -> Result<()> {
    if !marshal::exists::<Site, _>(conn, SITE_KEY)? {
        return Err(Error::not_found("site", SITE_KEY));
    }
    Batch::single(Statement::new(
        "DELETE FROM sites WHERE site = ?1",
        vec![text(SITE_KEY)],
    ))
    .exec(conn)?;
    info!("site deleted");
    Ok(())
}
