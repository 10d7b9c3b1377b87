//! Status vocabularies
//!
//! Each family lists its valid values in display order. Transitions are not
//! restricted: any valid value may replace any other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $family:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every valid value, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Returns true if `s` is one of the values in [`Self::ALL`]
            pub fn is_valid(s: &str) -> bool {
                s.parse::<$name>().is_ok()
            }

            /// Returns the string form of every valid value
            pub fn all_strs() -> Vec<&'static str> {
                Self::ALL.iter().map(|s| s.as_str()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(Error::bad_request(format!(
                        "invalid {} status: {:?}",
                        $family, s
                    ))),
                }
            }
        }
    };
}

status_enum! {
    /// Production phase of a show
    ShowStatus, "show" {
        Waiting => "waiting",
        Pre => "pre",
        Prod => "prod",
        Post => "post",
        Done => "done",
        Hold => "hold",
    }
}

status_enum! {
    /// Status of a shot or asset
    UnitStatus, "unit" {
        Omit => "omit",
        Hold => "hold",
        InProgress => "in-progress",
        Done => "done",
    }
}

status_enum! {
    TaskStatus, "task" {
        InProgress => "in-progress",
        Hold => "hold",
        Done => "done",
    }
}

status_enum! {
    /// Review state of a version
    VersionStatus, "version" {
        Waiting => "waiting",
        InProgress => "in-progress",
        NeedReview => "need-review",
        Retake => "retake",
        Approved => "approved",
    }
}

status_enum! {
    /// Verdict a reviewer may attach to a review note
    ReviewStatus, "review" {
        Retake => "retake",
        Approved => "approved",
    }
}

impl ReviewStatus {
    /// The version status this verdict corresponds to
    pub fn version_status(&self) -> VersionStatus {
        match self {
            ReviewStatus::Retake => VersionStatus::Retake,
            ReviewStatus::Approved => VersionStatus::Approved,
        }
    }
}

impl Default for ShowStatus {
    fn default() -> Self {
        ShowStatus::Waiting
    }
}

impl Default for UnitStatus {
    fn default() -> Self {
        UnitStatus::InProgress
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::InProgress
    }
}

impl Default for VersionStatus {
    fn default() -> Self {
        VersionStatus::InProgress
    }
}

impl UnitStatus {
    /// Returns true if the unit is dropped from the production
    pub fn is_omitted(&self) -> bool {
        matches!(self, UnitStatus::Omit)
    }
}

impl TaskStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl VersionStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, VersionStatus::Approved)
    }
}
