//! Relational schema
//!
//! Name-bearing columns carry non-empty and space-free CHECK constraints; array
//! columns hold JSON text arrays; time columns hold RFC 3339 text with
//! `0001-01-01T00:00:00Z` meaning "unset".

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

/// Bump when the table layout changes
pub const SCHEMA_VERSION: i32 = 2;

/// Tables in parent-first order
pub const TABLES: &[&str] = &[
    "sites",
    "shows",
    "groups",
    "units",
    "tasks",
    "versions",
    "reviews",
    "users",
    "user_configs",
];

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sites (
    site TEXT PRIMARY KEY CHECK (site = 'only'),
    vfx_supervisors TEXT NOT NULL DEFAULT '[]',
    vfx_producers TEXT NOT NULL DEFAULT '[]',
    cg_supervisors TEXT NOT NULL DEFAULT '[]',
    project_managers TEXT NOT NULL DEFAULT '[]',
    tasks TEXT NOT NULL DEFAULT '[]',
    default_shot_tasks TEXT NOT NULL DEFAULT '[]',
    default_asset_tasks TEXT NOT NULL DEFAULT '[]',
    leads TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS shows (
    show TEXT PRIMARY KEY CHECK (length(show) > 0) CHECK (show NOT LIKE '% %'),
    status TEXT NOT NULL CHECK (status IN ('waiting', 'pre', 'prod', 'post', 'done', 'hold')),
    client TEXT NOT NULL,
    director TEXT NOT NULL,
    supervisor TEXT NOT NULL,
    cg_supervisor TEXT NOT NULL,
    pd TEXT NOT NULL,
    managers TEXT NOT NULL,
    crank_in TEXT NOT NULL,
    crank_up TEXT NOT NULL,
    start_date TEXT NOT NULL,
    release_date TEXT NOT NULL,
    due_date TEXT NOT NULL,
    output_size TEXT NOT NULL,
    view_lut TEXT NOT NULL,
    default_shot_tasks TEXT NOT NULL,
    default_asset_tasks TEXT NOT NULL,
    tags TEXT NOT NULL,
    notes TEXT NOT NULL,
    attrs TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS groups (
    show TEXT NOT NULL CHECK (length(show) > 0) CHECK (show NOT LIKE '% %'),
    grp TEXT NOT NULL CHECK (length(grp) > 0) CHECK (grp NOT LIKE '% %'),
    default_tasks TEXT NOT NULL,
    notes TEXT NOT NULL,
    attrs TEXT NOT NULL,
    PRIMARY KEY (show, grp)
);

CREATE TABLE IF NOT EXISTS units (
    show TEXT NOT NULL CHECK (length(show) > 0) CHECK (show NOT LIKE '% %'),
    category TEXT NOT NULL CHECK (category IN ('shot', 'asset')),
    grp TEXT NOT NULL CHECK (length(grp) > 0) CHECK (grp NOT LIKE '% %'),
    unit TEXT NOT NULL CHECK (length(unit) > 0) CHECK (unit NOT LIKE '% %'),
    status TEXT NOT NULL CHECK (status IN ('omit', 'hold', 'in-progress', 'done')),
    edit_order INTEGER NOT NULL,
    description TEXT NOT NULL,
    cg_description TEXT NOT NULL,
    tags TEXT NOT NULL,
    tasks TEXT NOT NULL,
    due_date TEXT NOT NULL,
    attrs TEXT NOT NULL,
    PRIMARY KEY (show, category, grp, unit)
);

CREATE TABLE IF NOT EXISTS tasks (
    show TEXT NOT NULL CHECK (length(show) > 0) CHECK (show NOT LIKE '% %'),
    category TEXT NOT NULL CHECK (category IN ('shot', 'asset')),
    grp TEXT NOT NULL CHECK (length(grp) > 0) CHECK (grp NOT LIKE '% %'),
    unit TEXT NOT NULL CHECK (length(unit) > 0) CHECK (unit NOT LIKE '% %'),
    task TEXT NOT NULL CHECK (length(task) > 0) CHECK (task NOT LIKE '% %'),
    status TEXT NOT NULL CHECK (status IN ('in-progress', 'hold', 'done')),
    due_date TEXT NOT NULL,
    assignee TEXT NOT NULL,
    publish_version TEXT NOT NULL,
    working_version TEXT NOT NULL,
    working_version_status TEXT NOT NULL,
    PRIMARY KEY (show, category, grp, unit, task)
);

CREATE TABLE IF NOT EXISTS versions (
    show TEXT NOT NULL CHECK (length(show) > 0) CHECK (show NOT LIKE '% %'),
    category TEXT NOT NULL CHECK (category IN ('shot', 'asset')),
    grp TEXT NOT NULL CHECK (length(grp) > 0) CHECK (grp NOT LIKE '% %'),
    unit TEXT NOT NULL CHECK (length(unit) > 0) CHECK (unit NOT LIKE '% %'),
    task TEXT NOT NULL CHECK (length(task) > 0) CHECK (task NOT LIKE '% %'),
    version TEXT NOT NULL CHECK (length(version) > 0) CHECK (version NOT LIKE '% %'),
    owner TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('waiting', 'in-progress', 'need-review', 'retake', 'approved')),
    output_files TEXT NOT NULL,
    images TEXT NOT NULL,
    mov TEXT NOT NULL,
    work_file TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    PRIMARY KEY (show, category, grp, unit, task, version)
);

CREATE TABLE IF NOT EXISTS reviews (
    show TEXT NOT NULL CHECK (length(show) > 0) CHECK (show NOT LIKE '% %'),
    category TEXT NOT NULL CHECK (category IN ('shot', 'asset')),
    grp TEXT NOT NULL CHECK (length(grp) > 0) CHECK (grp NOT LIKE '% %'),
    unit TEXT NOT NULL CHECK (length(unit) > 0) CHECK (unit NOT LIKE '% %'),
    task TEXT NOT NULL CHECK (length(task) > 0) CHECK (task NOT LIKE '% %'),
    version TEXT NOT NULL CHECK (length(version) > 0) CHECK (version NOT LIKE '% %'),
    created TEXT NOT NULL,
    reviewer TEXT NOT NULL CHECK (length(reviewer) > 0),
    messenger TEXT NOT NULL CHECK (length(messenger) > 0),
    msg TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('', 'retake', 'approved')),
    PRIMARY KEY (show, category, grp, unit, task, version, created)
);

CREATE TABLE IF NOT EXISTS users (
    userid TEXT PRIMARY KEY CHECK (length(userid) > 0) CHECK (userid NOT LIKE '% %'),
    kor_name TEXT NOT NULL,
    name TEXT NOT NULL,
    team TEXT NOT NULL,
    role TEXT NOT NULL,
    email TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    entry_date TEXT NOT NULL,
    hashed_password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_configs (
    userid TEXT PRIMARY KEY CHECK (length(userid) > 0) CHECK (userid NOT LIKE '% %'),
    current_show TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_units_show ON units(show, category);
CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assignee);
CREATE INDEX IF NOT EXISTS idx_versions_task ON versions(show, category, grp, unit, task);
CREATE INDEX IF NOT EXISTS idx_tasks_working_status ON tasks(show, category, working_version_status);
";

/// Reads `PRAGMA user_version`
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let version: Option<i32> = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .optional()?;
    Ok(version.unwrap_or(0))
}

/// Creates any missing table and stamps the schema version. Safe to call on
/// every open.
pub fn init_tables(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(Error::internal(format!(
            "database schema version {} is newer than supported version {}",
            current, SCHEMA_VERSION
        )));
    }

    conn.execute_batch(SCHEMA)?;
    if current != SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
        debug!(from = current, to = SCHEMA_VERSION, "schema version stamped");
    }
    Ok(())
}

/// Row count of every table, in [`TABLES`] order
pub fn table_counts(conn: &Connection) -> Result<Vec<(&'static str, i64)>> {
    TABLES
        .iter()
        .map(|table| -> Result<(&'static str, i64)> {
            let n: i64 =
                conn.query_row(&format!("SELECT count(*) FROM {}", table), [], |row| row.get(0))?;
            Ok((*table, n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        init_tables(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn all_tables_exist() {
        let conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        let counts = table_counts(&conn).unwrap();
        assert_eq!(counts.len(), TABLES.len());
        assert!(counts.iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn older_schema_gains_reviews() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 1").unwrap();
        init_tables(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        let n: i64 = conn
            .query_row("SELECT count(*) FROM reviews", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn newer_schema_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99").unwrap();
        assert!(init_tables(&conn).unwrap_err().is_internal());
    }

    #[test]
    fn name_checks_reject_spaces() {
        let conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO user_configs (userid, current_show) VALUES ('a b', '')",
            [],
        );
        assert!(result.is_err());
    }
}
