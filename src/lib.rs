//! shotline - the data layer of a VFX production tracker
//!
//! Shows contain groups (sequences or asset categories), groups contain
//! units (shots or assets), units carry tasks and tasks accumulate versions.
//! A singleton site row holds the canonical task vocabulary. Stores in
//! [`storage`] persist all of it in SQLite; [`domain`] holds the values and
//! the validation that needs no database.

pub mod api;
pub mod cli;
pub mod domain;
pub mod error;
pub mod storage;

pub use domain::{
    Attrs, Category, Group, GroupId, Review, ReviewStatus, Show, ShowStatus, Site, Task, TaskId,
    TaskStatus, Unit, UnitId, UnitStatus, User, UserConfig, Version, VersionId, VersionStatus,
};
pub use error::{Error, ErrorKind, Result};
