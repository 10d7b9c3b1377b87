//! Read-only inspection commands

use anyhow::Result;

use super::output::Output;
use crate::storage::{all_shows, schema_version, search_units, table_counts, UnitSearch, Workspace};

/// Shows row counts per table
pub fn status(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let path = workspace.database_path()?;
    let conn = workspace.connect()?;

    let version = schema_version(&conn)?;
    let counts = table_counts(&conn)?;

    if output.is_json() {
        let tables: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(table, n)| (table.to_string(), serde_json::json!(n)))
            .collect();
        output.data(&serde_json::json!({
            "database": path.display().to_string(),
            "schema_version": version,
            "tables": tables,
        }));
    } else {
        println!("Workspace Status");
        println!("{}", "=".repeat(40));
        println!();
        println!("Database: {}", path.display());
        println!("Schema:   v{}", version);
        println!();
        for (table, n) in &counts {
            println!("  {:<14} {}", table, n);
        }
    }

    Ok(())
}

/// Lists every show
pub fn shows(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let conn = workspace.connect()?;
    let shows = all_shows(&conn)?;
    output.verbose_ctx("shows", &format!("Found {} shows", shows.len()));

    if output.is_json() {
        output.data(&shows);
    } else if shows.is_empty() {
        println!("No shows");
    } else {
        output.row(&["SHOW", "STATUS", "CLIENT"]);
        for show in &shows {
            output.row(&[&show.show, show.status.as_str(), &show.client]);
        }
    }

    Ok(())
}

/// Lists units matching the filters
pub fn search(output: &Output, search: &UnitSearch) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let conn = workspace.connect()?;
    let units = search_units(&conn, search)?;
    output.verbose_ctx("search", &format!("Found {} units", units.len()));

    if output.is_json() {
        output.data(&units);
    } else if units.is_empty() {
        println!("No units found in {}", search.show);
    } else {
        output.row(&["UNIT", "STATUS", "TASKS", "TAGS"]);
        for unit in &units {
            output.row(&[
                &unit.id().to_string(),
                unit.status.as_str(),
                &unit.tasks.join(","),
                &unit.tags.join(","),
            ]);
        }
        println!();
        println!("Found {} unit(s)", units.len());
    }

    Ok(())
}
