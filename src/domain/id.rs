//! Hierarchical IDs and name validation
//!
//! ID Format (components joined by `/`):
//! - Show: `{show}` (e.g., `TEST`)
//! - Group: `{show}/{group}` (e.g., `TEST/CG`)
//! - Unit: `{show}/{category}/{group}/{unit}` (e.g., `TEST/shot/CG/0010`)
//! - Task: `{unit-id}/{task}` (e.g., `TEST/shot/CG/0010/fx`)
//! - Version: `{task-id}/{version}` (e.g., `TEST/shot/CG/0010/fx/v001`)
//!
//! Parsing checks arity, rejects empty or space-containing components and runs
//! the name validators, so `parse(to_string(id)) == id` for every valid ID.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{Error, Result};

fn show_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("show regex must compile"))
}

fn group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("group regex must compile"))
}

fn shot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("shot regex must compile"))
}

fn asset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z]+(_?[A-Za-z0-9]*){0,2}$").expect("asset regex must compile")
    })
}

fn has_space(s: &str) -> bool {
    s.chars().any(char::is_whitespace)
}

/// Checks a show name: ASCII letters and digits only
pub fn validate_show_name(name: &str) -> Result<()> {
    if !show_re().is_match(name) {
        return Err(Error::bad_request(format!("invalid show name: {:?}", name)));
    }
    Ok(())
}

/// Checks a group name: a letter followed by letters, digits or underscores
pub fn validate_group_name(name: &str) -> Result<()> {
    if !group_re().is_match(name) {
        return Err(Error::bad_request(format!("invalid group name: {:?}", name)));
    }
    Ok(())
}

/// Checks a unit name against the rule of its category.
///
/// Shot names are digits only and keep their padding (`0010`). Asset names start
/// with letters and may carry up to two `_`-separated suffixes (`chair_big_01`).
pub fn validate_unit_name(category: Category, name: &str) -> Result<()> {
    let ok = match category {
        Category::Shot => shot_re().is_match(name),
        Category::Asset => asset_re().is_match(name),
    };
    if !ok {
        return Err(Error::bad_request(format!(
            "invalid {} name: {:?}",
            category, name
        )));
    }
    Ok(())
}

/// Checks the shape of a task name; membership in Site.tasks is checked by the stores
pub fn validate_task_name(name: &str) -> Result<()> {
    validate_plain("task", name)
}

pub fn validate_version_name(name: &str) -> Result<()> {
    validate_plain("version", name)
}

pub fn validate_user_id(id: &str) -> Result<()> {
    validate_plain("user id", id)
}

fn validate_plain(what: &str, name: &str) -> Result<()> {
    if name.is_empty() || has_space(name) || name.contains('/') {
        return Err(Error::bad_request(format!("invalid {}: {:?}", what, name)));
    }
    Ok(())
}

/// Unit category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Shot,
    Asset,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Shot, Category::Asset];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shot => "shot",
            Category::Asset => "asset",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shot" => Ok(Category::Shot),
            "asset" => Ok(Category::Asset),
            _ => Err(Error::bad_request(format!("invalid category: {:?}", s))),
        }
    }
}

/// Splits `s` on `/` into exactly `N` non-empty, space-free components
fn split<'a, const N: usize>(kind: &str, s: &'a str) -> Result<[&'a str; N]> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != N {
        return Err(Error::bad_request(format!(
            "invalid {} id: {:?} (expected {} components)",
            kind, s, N
        )));
    }
    if parts.iter().any(|p| p.is_empty() || has_space(p)) {
        return Err(Error::bad_request(format!(
            "invalid {} id: {:?} (empty or spaced component)",
            kind, s
        )));
    }
    let mut out = [""; N];
    out.copy_from_slice(&parts);
    Ok(out)
}

/// Group ID in the format `{show}/{group}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId {
    pub show: String,
    pub group: String,
}

impl GroupId {
    pub fn new(show: impl Into<String>, group: impl Into<String>) -> Result<Self> {
        let id = Self {
            show: show.into(),
            group: group.into(),
        };
        id.validate()?;
        Ok(id)
    }

    pub fn validate(&self) -> Result<()> {
        validate_show_name(&self.show)?;
        validate_group_name(&self.group)
    }

    /// Creates the ID of a unit inside this group
    pub fn unit(&self, category: Category, unit: impl Into<String>) -> Result<UnitId> {
        UnitId::new(self.show.clone(), category, self.group.clone(), unit)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.show, self.group)
    }
}

impl FromStr for GroupId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let [show, group] = split::<2>("group", s)?;
        Self::new(show, group)
    }
}

/// Unit ID in the format `{show}/{category}/{group}/{unit}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitId {
    pub show: String,
    pub category: Category,
    pub group: String,
    pub unit: String,
}

impl UnitId {
    pub fn new(
        show: impl Into<String>,
        category: Category,
        group: impl Into<String>,
        unit: impl Into<String>,
    ) -> Result<Self> {
        let id = Self {
            show: show.into(),
            category,
            group: group.into(),
            unit: unit.into(),
        };
        id.validate()?;
        Ok(id)
    }

    pub fn validate(&self) -> Result<()> {
        validate_show_name(&self.show)?;
        validate_group_name(&self.group)?;
        validate_unit_name(self.category, &self.unit)
    }

    /// Returns the ID of the group this unit belongs to
    pub fn group_id(&self) -> GroupId {
        GroupId {
            show: self.show.clone(),
            group: self.group.clone(),
        }
    }

    /// Creates the ID of a task on this unit
    pub fn task(&self, task: impl Into<String>) -> Result<TaskId> {
        let task = task.into();
        validate_task_name(&task)?;
        Ok(TaskId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
            task,
        })
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.show, self.category, self.group, self.unit)
    }
}

impl FromStr for UnitId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let [show, category, group, unit] = split::<4>("unit", s)?;
        Self::new(show, category.parse()?, group, unit)
    }
}

/// Task ID in the format `{show}/{category}/{group}/{unit}/{task}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    pub show: String,
    pub category: Category,
    pub group: String,
    pub unit: String,
    pub task: String,
}

impl TaskId {
    pub fn new(unit: &UnitId, task: impl Into<String>) -> Result<Self> {
        unit.task(task)
    }

    pub fn validate(&self) -> Result<()> {
        self.unit_id().validate()?;
        validate_task_name(&self.task)
    }

    /// Returns the ID of the unit this task belongs to
    pub fn unit_id(&self) -> UnitId {
        UnitId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
        }
    }

    /// Creates the ID of a version of this task
    pub fn version(&self, version: impl Into<String>) -> Result<VersionId> {
        let version = version.into();
        validate_version_name(&version)?;
        Ok(VersionId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
            task: self.task.clone(),
            version,
        })
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.show, self.category, self.group, self.unit, self.task
        )
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let [show, category, group, unit, task] = split::<5>("task", s)?;
        UnitId::new(show, category.parse()?, group, unit)?.task(task)
    }
}

/// Version ID in the format `{show}/{category}/{group}/{unit}/{task}/{version}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    pub show: String,
    pub category: Category,
    pub group: String,
    pub unit: String,
    pub task: String,
    pub version: String,
}

impl VersionId {
    pub fn new(task: &TaskId, version: impl Into<String>) -> Result<Self> {
        task.version(version)
    }

    pub fn validate(&self) -> Result<()> {
        self.task_id().validate()?;
        validate_version_name(&self.version)
    }

    /// Returns the ID of the task this version belongs to
    pub fn task_id(&self) -> TaskId {
        TaskId {
            show: self.show.clone(),
            category: self.category,
            group: self.group.clone(),
            unit: self.unit.clone(),
            task: self.task.clone(),
        }
    }

    pub fn unit_id(&self) -> UnitId {
        self.task_id().unit_id()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.show, self.category, self.group, self.unit, self.task, self.version
        )
    }
}

impl FromStr for VersionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let [show, category, group, unit, task, version] = split::<6>("version", s)?;
        UnitId::new(show, category.parse()?, group, unit)?
            .task(task)?
            .version(version)
    }
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = Error;

                fn try_from(value: String) -> Result<Self> {
                    value.parse()
                }
            }

            impl From<$ty> for String {
                fn from(id: $ty) -> Self {
                    id.to_string()
                }
            }
        )*
    };
}

string_conversions!(GroupId, UnitId, TaskId, VersionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_names() {
        assert!(validate_show_name("TEST").is_ok());
        assert!(validate_show_name("show2024").is_ok());
        assert!(validate_show_name("").is_err());
        assert!(validate_show_name("my show").is_err());
        assert!(validate_show_name("my_show").is_err());
    }

    #[test]
    fn group_names() {
        assert!(validate_group_name("CG").is_ok());
        assert!(validate_group_name("G").is_ok());
        assert!(validate_group_name("seq_01").is_ok());
        assert!(validate_group_name("01seq").is_err());
        assert!(validate_group_name("").is_err());
    }

    #[test]
    fn unit_names_follow_category() {
        assert!(validate_unit_name(Category::Shot, "0010").is_ok());
        assert!(validate_unit_name(Category::Shot, "10a").is_err());
        assert!(validate_unit_name(Category::Asset, "chair").is_ok());
        assert!(validate_unit_name(Category::Asset, "chair_big_01").is_ok());
        assert!(validate_unit_name(Category::Asset, "0010").is_err());
        assert!(validate_unit_name(Category::Asset, "a_b_c_d").is_err());
    }

    #[test]
    fn validator_errors_carry_value() {
        let err = validate_show_name("bad show").unwrap_err();
        assert!(err.is_bad_request());
        assert!(err.to_string().contains("bad show"));
    }

    #[test]
    fn unit_id_roundtrip() {
        let id: UnitId = "TEST/shot/CG/0010".parse().unwrap();
        assert_eq!(id.show, "TEST");
        assert_eq!(id.category, Category::Shot);
        assert_eq!(id.group, "CG");
        assert_eq!(id.unit, "0010");
        assert_eq!(id.to_string(), "TEST/shot/CG/0010");
    }

    #[test]
    fn version_id_parents() {
        let id: VersionId = "TEST/asset/char/hero/mod/v001".parse().unwrap();
        assert_eq!(id.task_id().to_string(), "TEST/asset/char/hero/mod");
        assert_eq!(id.unit_id().to_string(), "TEST/asset/char/hero");
        assert_eq!(id.unit_id().group_id().to_string(), "TEST/char");
    }

    #[test]
    fn ids_reject_wrong_arity() {
        assert!("TEST".parse::<GroupId>().is_err());
        assert!("TEST/CG/extra".parse::<GroupId>().is_err());
        assert!("TEST/shot/CG".parse::<UnitId>().is_err());
        assert!("TEST/shot/CG/0010".parse::<TaskId>().is_err());
    }

    #[test]
    fn ids_reject_bad_components() {
        assert!("TEST/prop/CG/0010".parse::<UnitId>().is_err());
        assert!("TEST//CG/0010".parse::<UnitId>().is_err());
        assert!("TEST/shot/CG/00 10".parse::<UnitId>().is_err());
        assert!("TEST/shot/CG/0010/f x".parse::<TaskId>().is_err());
    }

    #[test]
    fn serde_roundtrip_task_id() {
        let id: TaskId = "TEST/shot/CG/0010/fx".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"TEST/shot/CG/0010/fx\"");

        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_rejects_invalid_id() {
        let parsed: std::result::Result<UnitId, _> = serde_json::from_str("\"TEST/shot\"");
        assert!(parsed.is_err());
    }
}
