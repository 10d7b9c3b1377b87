//! Group domain model
//!
//! A group is a shot sequence or an asset category inside a show.

use serde::{Deserialize, Serialize};

use super::attrs::Attrs;
use super::id::GroupId;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub show: String,
    pub group: String,

    /// Tasks a new unit in this group starts with
    pub default_tasks: Vec<String>,
    pub notes: String,
    pub attrs: Attrs,
}

impl Group {
    pub fn new(id: &GroupId) -> Self {
        Self {
            show: id.show.clone(),
            group: id.group.clone(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> GroupId {
        GroupId {
            show: self.show.clone(),
            group: self.group.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.id().validate()
    }
}
