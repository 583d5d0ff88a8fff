//! School structure: years, levels, sections, subjects, buildings, rooms
//! and classes.

use serde::{Deserialize, Serialize};

use super::person::Employee;
use super::resource::{Record, Ref, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolYear {
    #[serde(rename = "_id")]
    pub id: String,
    pub school_year: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub date_close: Option<String>,
    /// Only one year is active at a time; enrollment opens against it
    #[serde(default)]
    pub status: Option<bool>,
}

impl Record for SchoolYear {
    const RESOURCE: Resource = Resource::SchoolYear;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        let active = if self.status.unwrap_or(false) { " (active)" } else { "" };
        format!(
            "{} | {} - {}{}",
            self.school_year.as_deref().unwrap_or("-"),
            self.date_from.as_deref().unwrap_or("?"),
            self.date_to.as_deref().unwrap_or("?"),
            active
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolLevel {
    #[serde(rename = "_id")]
    pub id: String,
    pub level_name: Option<String>,
    pub level_description: Option<String>,
}

impl Record for SchoolLevel {
    const RESOURCE: Resource = Resource::SchoolLevel;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        self.level_name.clone().unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolSection {
    #[serde(rename = "_id")]
    pub id: String,
    pub section_name: Option<String>,
    pub section_description: Option<String>,
    pub school_level_id: Option<Ref<SchoolLevel>>,
}

impl Record for SchoolSection {
    const RESOURCE: Resource = Resource::SchoolSection;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        format!(
            "{} | {}",
            level_name(&self.school_level_id),
            self.section_name.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolSubject {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject_name: Option<String>,
    pub subject_description: Option<String>,
    pub school_level_id: Option<Ref<SchoolLevel>>,
}

impl SchoolSubject {
    pub fn name(&self) -> &str {
        self.subject_name.as_deref().unwrap_or(&self.id)
    }
}

impl Record for SchoolSubject {
    const RESOURCE: Resource = Resource::SchoolSubject;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        format!("{} | {}", level_name(&self.school_level_id), self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolBuilding {
    #[serde(rename = "_id")]
    pub id: String,
    pub building_name: Option<String>,
    pub building_description: Option<String>,
}

impl Record for SchoolBuilding {
    const RESOURCE: Resource = Resource::SchoolBuilding;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        self.building_name.clone().unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRoom {
    #[serde(rename = "_id")]
    pub id: String,
    pub room_name: Option<String>,
    pub room_description: Option<String>,
    pub building_id: Option<Ref<SchoolBuilding>>,
}

impl SchoolRoom {
    pub fn name(&self) -> &str {
        self.room_name.as_deref().unwrap_or(&self.id)
    }
}

impl Record for SchoolRoom {
    const RESOURCE: Resource = Resource::SchoolRoom;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        let building = self
            .building_id
            .as_ref()
            .and_then(|b| b.populated())
            .and_then(|b| b.building_name.as_deref())
            .unwrap_or("-");
        format!("{} | {}", building, self.name())
    }
}

/// A class: one level/section in one school year, with an adviser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolClass {
    #[serde(rename = "_id")]
    pub id: String,
    pub school_year_id: Option<Ref<SchoolYear>>,
    pub school_level_id: Option<Ref<SchoolLevel>>,
    pub school_section_id: Option<Ref<SchoolSection>>,
    pub employee_id: Option<Ref<Employee>>,
}

impl Record for SchoolClass {
    const RESOURCE: Resource = Resource::SchoolClass;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        let year = self
            .school_year_id
            .as_ref()
            .and_then(|y| y.populated())
            .and_then(|y| y.school_year.as_deref())
            .unwrap_or("N/A");
        let section = self
            .school_section_id
            .as_ref()
            .and_then(|s| s.populated())
            .and_then(|s| s.section_name.as_deref())
            .unwrap_or("-");
        let adviser = self
            .employee_id
            .as_ref()
            .and_then(|e| e.populated())
            .map(|e| e.display_name())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} | {} | {} | {}",
            year,
            level_name(&self.school_level_id),
            section,
            adviser
        )
    }
}

fn level_name(level: &Option<Ref<SchoolLevel>>) -> &str {
    level
        .as_ref()
        .and_then(|l| l.populated())
        .and_then(|l| l.level_name.as_deref())
        .unwrap_or("N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_with_populated_refs() {
        let json = r#"{
            "_id": "c1",
            "school_year_id": {"_id": "y1", "school_year": "2025-2026"},
            "school_level_id": {"_id": "l1", "level_name": "Grade 7"},
            "school_section_id": "s1",
            "employee_id": {"_id": "e1", "employee_title": "Mr.", "first_name": "Jose", "last_name": "Rizal"}
        }"#;
        let class: SchoolClass = serde_json::from_str(json).unwrap();
        assert_eq!(class.school_level_id.as_ref().unwrap().id(), "l1");
        assert_eq!(class.school_section_id.as_ref().unwrap().id(), "s1");
        assert!(class.school_section_id.as_ref().unwrap().populated().is_none());
        assert_eq!(class.summary(), "2025-2026 | Grade 7 | - | Mr. Jose Rizal");
    }

    #[test]
    fn test_subject_with_bare_level_id() {
        let json = r#"{"_id": "sub1", "subject_name": "Math", "school_level_id": "l1"}"#;
        let subject: SchoolSubject = serde_json::from_str(json).unwrap();
        assert_eq!(subject.name(), "Math");
        assert_eq!(subject.summary(), "N/A | Math");
    }

    #[test]
    fn test_school_year_summary_marks_active() {
        let year = SchoolYear {
            id: "y".to_string(),
            school_year: Some("2025-2026".to_string()),
            date_from: Some("2025-06-01".to_string()),
            date_to: Some("2026-03-31".to_string()),
            status: Some(true),
            ..Default::default()
        };
        assert_eq!(year.summary(), "2025-2026 | 2025-06-01 - 2026-03-31 (active)");
    }
}
