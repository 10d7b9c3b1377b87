//! Task domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{Category, TaskId, UnitId};
use super::status::{TaskStatus, VersionStatus};
use crate::error::Result;

/// A discipline's work on a unit (e.g. fx, lit, comp)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub show: String,
    pub category: Category,
    pub group: String,
    pub unit: String,
    pub task: String,

    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    /// User id of the artist; empty when unassigned
    pub assignee: String,

    /// Version delivered to the client; empty when none
    pub publish_version: String,
    /// Version currently being worked on; empty when none
    pub working_version: String,
    /// Status of the working version, kept in step with that version row
    pub working_version_status: Option<VersionStatus>,
}

impl Task {
    /// Creates an in-progress task with no versions
    pub fn new(id: &TaskId) -> Self {
        Self {
            show: id.show.clone(),
            category: id.category,
            group: id.group.clone(),
            unit: id.unit.clone(),
            task: id.task.clone(),
            status: TaskStatus::InProgress,
            ..Default::default()
        }
    }

    pub fn id(&self) -> TaskId {
        TaskId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
            task: self.task.clone(),
        }
    }

    pub fn unit_id(&self) -> UnitId {
        self.id().unit_id()
    }

    pub fn validate(&self) -> Result<()> {
        self.id().validate()
    }
}
