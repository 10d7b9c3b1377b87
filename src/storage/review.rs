//! Review store
//!
//! Reviews hang off a version and are only ever added; they disappear with
//! their version through [`delete_tree`](super::cascade::delete_tree).

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use tracing::info;

use super::batch::Batch;
use super::marshal::{self, text, time, where_key, Record, RowKey, Scan};
use super::version::{status_statements, version_exists};
use crate::domain::{Review, VersionId};
use crate::error::{Error, Result};

impl Record for Review {
    const TABLE: &'static str = "reviews";
    const COLUMNS: &'static [&'static str] = &[
        "show",
        "category",
        "grp",
        "unit",
        "task",
        "version",
        "created",
        "reviewer",
        "messenger",
        "msg",
        "status",
    ];
    const KEY_LEN: usize = 7;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.show),
            text(self.category.as_str()),
            text(&self.group),
            text(&self.unit),
            text(&self.task),
            text(&self.version),
            time(&Some(self.created)),
            text(&self.reviewer),
            text(&self.messenger),
            text(&self.msg),
            text(self.status.map(|s| s.as_str()).unwrap_or("")),
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
            created: c.time()?.unwrap_or_default(),
            reviewer: c.string()?,
            messenger: c.string()?,
            msg: c.string()?,
            status: c.parse_opt()?,
        })
    }
}

impl RowKey for Review {
    fn key_values(&self) -> Vec<Value> {
        let mut values = self.version_id().key_values();
        values.push(time(&Some(self.created)));
        values
    }
}

/// Adds a review to an existing version. A verdict also becomes the
/// version's status, in the same transaction.
pub fn add_review(conn: &mut Connection, review: &Review) -> Result<()> {
    review.validate()?;
    let version = review.version_id();
    if !version_exists(conn, &version)? {
        return Err(Error::not_found("version", &version));
    }
    if marshal::exists::<Review, _>(conn, review)? {
        return Err(Error::already_exists(
            "review",
            format!("{}@{}", version, review.created.to_rfc3339()),
        ));
    }

    let mut batch = Batch::new();
    batch.push(marshal::insert(review));
    if let Some(status) = review.status {
        for stmt in status_statements(conn, &version, status.version_status())? {
            batch.push(stmt);
        }
    }
    batch.exec(conn)?;

    info!(version = %version, reviewer = %review.reviewer, "review added");
    Ok(())
}

/// Reviews of a version, oldest first
pub fn version_reviews(conn: &Connection, id: &VersionId) -> Result<Vec<Review>> {
    id.validate()?;
    if !version_exists(conn, id)? {
        return Err(Error::not_found("version", id));
    }
    let tail = format!("WHERE {}", where_key(&Review::key_columns()[..6], 1));
    let mut reviews: Vec<Review> =
        marshal::select_where(conn, &tail, params_from_iter(id.key_values()))?;
    // Fractional seconds make the stored text sort unreliably
    reviews.sort_by_key(|r| r.created);
    Ok(reviews)
}
