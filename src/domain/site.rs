//! Site-wide settings
//!
//! The site is the single installation record. Its task list is the canonical
//! task vocabulary: units may only carry tasks listed here, in this order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::id::validate_task_name;
use crate::error::{Error, Result};

/// Row key of the singleton site row
pub const SITE_KEY: &str = "only";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub vfx_supervisors: Vec<String>,
    pub vfx_producers: Vec<String>,
    pub cg_supervisors: Vec<String>,
    pub project_managers: Vec<String>,

    /// Canonical task names in display order
    pub tasks: Vec<String>,
    pub default_shot_tasks: Vec<String>,
    pub default_asset_tasks: Vec<String>,

    /// Task leads as `task:userid`; a task may have several leads
    pub leads: Vec<String>,
}

impl Site {
    /// Checks the task vocabulary, the default task sets and the leads
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for task in &self.tasks {
            validate_task_name(task)?;
            if !seen.insert(task.as_str()) {
                return Err(Error::bad_request(format!("duplicate site task: {}", task)));
            }
        }
        self.check_tasks("default shot task", &self.default_shot_tasks)?;
        self.check_tasks("default asset task", &self.default_asset_tasks)?;
        for lead in &self.leads {
            self.parse_lead(lead)?;
        }
        Ok(())
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.iter().any(|t| t == name)
    }

    /// Position of `name` in the canonical task list
    pub fn task_index(&self, name: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t == name)
    }

    /// Fails with BadRequest naming the first entry of `tasks` the site does not know
    pub fn check_tasks(&self, what: &str, tasks: &[String]) -> Result<()> {
        match tasks.iter().find(|t| !self.has_task(t)) {
            Some(unknown) => Err(Error::bad_request(format!(
                "{} not defined in site: {}",
                what, unknown
            ))),
            None => Ok(()),
        }
    }

    /// Returns `tasks` without duplicates, sorted by their position in the site list.
    ///
    /// Unknown names are rejected. The sort is stable, so entries at an equal
    /// index would keep their input order.
    pub fn order_tasks(&self, tasks: &[String]) -> Result<Vec<String>> {
        self.check_tasks("task", tasks)?;

        let mut seen = HashSet::new();
        let mut ordered: Vec<String> = tasks
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();
        ordered.sort_by_key(|t| self.task_index(t).unwrap_or(usize::MAX));
        Ok(ordered)
    }

    /// Splits a `task:userid` lead entry
    pub fn parse_lead<'a>(&self, lead: &'a str) -> Result<(&'a str, &'a str)> {
        let invalid = || Error::bad_request(format!("invalid lead (want task:userid): {:?}", lead));
        let (task, user) = lead.split_once(':').ok_or_else(invalid)?;
        if task.is_empty() || user.is_empty() || lead.contains(char::is_whitespace) {
            return Err(invalid());
        }
        if !self.has_task(task) {
            return Err(Error::bad_request(format!(
                "lead task not defined in site: {}",
                task
            )));
        }
        Ok((task, user))
    }

    /// User ids registered as leads of `task`
    pub fn leads_of(&self, task: &str) -> Vec<&str> {
        self.leads
            .iter()
            .filter_map(|l| l.split_once(':'))
            .filter(|(t, _)| *t == task)
            .map(|(_, u)| u)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site {
            tasks: ["mod", "rig", "fx", "lit", "comp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Default::default()
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn order_follows_site() {
        let ordered = site().order_tasks(&strings(&["comp", "fx", "mod"])).unwrap();
        assert_eq!(ordered, strings(&["mod", "fx", "comp"]));
    }

    #[test]
    fn order_drops_duplicates() {
        let ordered = site().order_tasks(&strings(&["lit", "fx", "lit"])).unwrap();
        assert_eq!(ordered, strings(&["fx", "lit"]));
    }

    #[test]
    fn order_rejects_unknown() {
        let err = site().order_tasks(&strings(&["paint"])).unwrap_err();
        assert!(err.is_bad_request());
        assert!(err.to_string().contains("paint"));
    }

    #[test]
    fn validate_rejects_duplicate_tasks() {
        let mut s = site();
        s.tasks.push("fx".to_string());
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_checks_defaults() {
        let mut s = site();
        s.default_shot_tasks = strings(&["fx", "comp"]);
        assert!(s.validate().is_ok());

        s.default_asset_tasks = strings(&["paint"]);
        assert!(s.validate().is_err());
    }

    #[test]
    fn leads() {
        let mut s = site();
        s.leads = strings(&["fx:kybin", "fx:kaycho", "comp:jane"]);
        assert!(s.validate().is_ok());
        assert_eq!(s.leads_of("fx"), vec!["kybin", "kaycho"]);

        s.leads.push("paint:bob".to_string());
        assert!(s.validate().is_err());

        s.leads = strings(&["fxkybin"]);
        assert!(s.validate().is_err());
    }
}
