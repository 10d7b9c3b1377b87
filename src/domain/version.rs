//! Version domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{Category, TaskId, VersionId};
use super::status::VersionStatus;
use crate::error::{Error, Result};

/// A deliverable snapshot of a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub show: String,
    pub category: Category,
    pub group: String,
    pub unit: String,
    pub task: String,
    pub version: String,

    pub owner: String,
    pub status: VersionStatus,
    /// Paths of the rendered outputs
    pub output_files: Vec<String>,
    /// Preview image paths
    pub images: Vec<String>,
    pub mov: String,
    /// Scene file that produced the outputs
    pub work_file: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Version {
    pub fn new(id: &VersionId) -> Self {
        Self {
            show: id.show.clone(),
            category: id.category,
            group: id.group.clone(),
            unit: id.unit.clone(),
            task: id.task.clone(),
            version: id.version.clone(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> VersionId {
        VersionId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
            task: self.task.clone(),
            version: self.version.clone(),
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.id().task_id()
    }

    pub fn validate(&self) -> Result<()> {
        self.id().validate()?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::bad_request(format!(
                    "version {} ends before it starts",
                    self.id()
                )));
            }
        }
        Ok(())
    }
}
