//! Show domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attrs::Attrs;
use super::id::validate_show_name;
use super::status::ShowStatus;
use crate::error::{Error, Result};

/// A production
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    /// Show name, unique across the site
    pub show: String,
    pub status: ShowStatus,

    pub client: String,
    pub director: String,
    pub supervisor: String,
    pub cg_supervisor: String,
    pub pd: String,
    pub managers: Vec<String>,

    pub crank_in: Option<DateTime<Utc>>,
    pub crank_up: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub release_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,

    /// Delivery resolution as `{width}x{height}`
    pub output_size: String,
    pub view_lut: String,

    /// Tasks a new shot starts with
    pub default_shot_tasks: Vec<String>,
    /// Tasks a new asset starts with
    pub default_asset_tasks: Vec<String>,

    pub tags: Vec<String>,
    pub notes: String,
    pub attrs: Attrs,
}

impl Show {
    pub fn new(show: impl Into<String>) -> Self {
        Self {
            show: show.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.show
    }

    /// Checks the fields that do not depend on other rows
    pub fn validate(&self) -> Result<()> {
        validate_show_name(&self.show)?;
        if !self.output_size.is_empty() && parse_output_size(&self.output_size).is_none() {
            return Err(Error::bad_request(format!(
                "invalid output size (want WIDTHxHEIGHT): {:?}",
                self.output_size
            )));
        }
        Ok(())
    }

    /// Returns the output size as (width, height) if set
    pub fn output_resolution(&self) -> Option<(u32, u32)> {
        parse_output_size(&self.output_size)
    }
}

fn parse_output_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once('x')?;
    let w: u32 = w.parse().ok()?;
    let h: u32 = h.parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}
