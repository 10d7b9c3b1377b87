//! Unit domain model
//!
//! A unit is a single shot or asset. Its `tasks` list holds the tasks shown for
//! the unit, in site order. Task rows whose name left the list stay stored as
//! hidden tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attrs::Attrs;
use super::id::{Category, UnitId};
use super::status::UnitStatus;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub show: String,
    pub category: Category,
    pub group: String,
    pub unit: String,

    pub status: UnitStatus,
    /// Position in the edit; 0 when unknown
    pub edit_order: i64,
    pub description: String,
    pub cg_description: String,
    pub tags: Vec<String>,

    /// Visible tasks, ordered as in the site task list
    pub tasks: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub attrs: Attrs,
}

impl Unit {
    /// Creates an in-progress unit with no tasks
    pub fn new(id: &UnitId) -> Self {
        Self {
            show: id.show.clone(),
            category: id.category,
            group: id.group.clone(),
            unit: id.unit.clone(),
            status: UnitStatus::InProgress,
            ..Default::default()
        }
    }

    pub fn id(&self) -> UnitId {
        UnitId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.id().validate()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns true if `task` is listed (not hidden) on this unit
    pub fn shows_task(&self, task: &str) -> bool {
        self.tasks.iter().any(|t| t == task)
    }
}
