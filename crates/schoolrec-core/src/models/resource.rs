//! Backend resources and the record trait tying models to their endpoints.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A collection exposed by the backend under `/admin/<path>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Employees,
    Students,
    SchoolYear,
    SchoolLevel,
    SchoolSection,
    SchoolSubject,
    SchoolBuilding,
    SchoolRoom,
    SchoolClass,
    ClassSubject,
    Enrollment,
    EnrolledSubject,
}

impl Resource {
    pub const ALL: [Resource; 12] = [
        Resource::Employees,
        Resource::Students,
        Resource::SchoolYear,
        Resource::SchoolLevel,
        Resource::SchoolSection,
        Resource::SchoolSubject,
        Resource::SchoolBuilding,
        Resource::SchoolRoom,
        Resource::SchoolClass,
        Resource::ClassSubject,
        Resource::Enrollment,
        Resource::EnrolledSubject,
    ];

    /// Path segment under `/admin/`
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Employees => "employees",
            Resource::Students => "students",
            Resource::SchoolYear => "school-year",
            Resource::SchoolLevel => "school-level",
            Resource::SchoolSection => "school-section",
            Resource::SchoolSubject => "school-subject",
            Resource::SchoolBuilding => "school-building",
            Resource::SchoolRoom => "school-room",
            Resource::SchoolClass => "school-class",
            Resource::ClassSubject => "school-class-subject",
            Resource::Enrollment => "school-enrollment",
            Resource::EnrolledSubject => "school-enrolled-subject",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.path() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Resource::ALL.iter().map(|r| r.path()).collect();
                format!("Unknown resource '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// A backend record type with a known collection.
pub trait Record: DeserializeOwned {
    const RESOURCE: Resource;

    fn id(&self) -> &str;

    /// One-line description for listings
    fn summary(&self) -> String;
}

/// A foreign key that the backend may send either as a bare id or as the
/// populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Populated(Box<T>),
}

impl<T: Record> Ref<T> {
    pub fn id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Populated(record) => record.id(),
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Populated(record) => Some(record),
        }
    }
}
