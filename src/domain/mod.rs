//! Domain models for the production tracker
//!
//! Entity values, IDs, status vocabularies and the validation that does not
//! need the database.

mod attrs;
mod group;
mod id;
mod review;
mod show;
mod site;
mod status;
mod task;
mod unit;
mod user;
mod version;

pub use attrs::Attrs;
pub use group::Group;
pub use id::{
    validate_group_name, validate_show_name, validate_task_name, validate_unit_name,
    validate_user_id, validate_version_name, Category, GroupId, TaskId, UnitId, VersionId,
};
pub use review::Review;
pub use show::Show;
pub use site::{Site, SITE_KEY};
pub use status::{ReviewStatus, ShowStatus, TaskStatus, UnitStatus, VersionStatus};
pub use task::Task;
pub use unit::Unit;
pub use user::{User, UserConfig};
pub use version::Version;
