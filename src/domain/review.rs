//! Review domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{Category, VersionId};
use super::status::ReviewStatus;
use crate::error::{Error, Result};

/// A reviewer's note on a version, delivered by a messenger
///
/// Reviews are keyed by their version and creation time, so a version keeps
/// its whole review history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub show: String,
    pub category: Category,
    pub group: String,
    pub unit: String,
    pub task: String,
    pub version: String,
    pub created: DateTime<Utc>,

    /// User id of the supervisor who gave the review
    pub reviewer: String,
    /// User id of whoever recorded it
    pub messenger: String,
    pub msg: String,
    /// Verdict, if the review carries one
    pub status: Option<ReviewStatus>,
}

impl Review {
    /// Creates an empty review of the version, stamped now
    pub fn new(id: &VersionId) -> Self {
        Self {
            show: id.show.clone(),
            category: id.category,
            group: id.group.clone(),
            unit: id.unit.clone(),
            task: id.task.clone(),
            version: id.version.clone(),
            created: Utc::now(),
            reviewer: String::new(),
            messenger: String::new(),
            msg: String::new(),
            status: None,
        }
    }

    pub fn version_id(&self) -> VersionId {
        VersionId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
            task: self.task.clone(),
            version: self.version.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let id = self.version_id();
        id.validate()?;
        if self.reviewer.trim().is_empty() {
            return Err(Error::bad_request(format!("review of {} needs a reviewer", id)));
        }
        if self.messenger.trim().is_empty() {
            return Err(Error::bad_request(format!("review of {} needs a messenger", id)));
        }
        Ok(())
    }
}
