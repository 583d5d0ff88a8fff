use serde::{Deserialize, Serialize};

use super::resource::{Record, Resource};

/// A staff member. Teaching employees can advise classes and teach subjects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: String,
    /// Institution-assigned employee number, distinct from `id`
    pub employee_id: Option<String>,
    pub employee_title: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub teaching: Option<String>,
    pub email: Option<String>,
    pub employee_picture: Option<String>,
}

impl Employee {
    /// Name with honorific, e.g. "Mr. Juan Dela Cruz"
    pub fn display_name(&self) -> String {
        join_name(&[&self.employee_title, &self.first_name, &self.last_name])
    }

    pub fn is_teaching(&self) -> bool {
        matches!(
            self.teaching.as_deref().map(str::to_lowercase).as_deref(),
            Some("yes") | Some("true") | Some("1")
        )
    }
}

impl Record for Employee {
    const RESOURCE: Resource = Resource::Employees;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        let teaching = if self.is_teaching() { " (teaching)" } else { "" };
        format!(
            "{} | {}{}",
            self.employee_id.as_deref().unwrap_or("-"),
            self.display_name(),
            teaching
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: String,
    /// Student number shown to staff
    pub student_id: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub students_picture: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        join_name(&[&self.first_name, &self.last_name])
    }
}

impl Record for Student {
    const RESOURCE: Resource = Resource::Students;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        format!(
            "{} | {}",
            self.student_id.as_deref().unwrap_or("-"),
            self.full_name()
        )
    }
}

/// Join the present, non-blank name parts with single spaces.
pub(crate) fn join_name(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_display_name_skips_missing_parts() {
        let emp = Employee {
            id: "e1".to_string(),
            employee_title: Some("Ms.".to_string()),
            first_name: Some("Ana".to_string()),
            last_name: Some("Reyes".to_string()),
            ..Default::default()
        };
        assert_eq!(emp.display_name(), "Ms. Ana Reyes");

        let untitled = Employee {
            employee_title: None,
            ..emp
        };
        assert_eq!(untitled.display_name(), "Ana Reyes");
    }

    #[test]
    fn test_parse_student_with_mongo_id() {
        let json = r#"{"_id":"665f","student_id":"2025-0001","first_name":"Lea","last_name":"Santos","gender":"F"}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.id(), "665f");
        assert_eq!(student.summary(), "2025-0001 | Lea Santos");
    }

    #[test]
    fn test_summary_marks_teaching_staff() {
        let mut emp = Employee {
            id: "e1".to_string(),
            employee_id: Some("EMP-7".to_string()),
            first_name: Some("Ana".to_string()),
            last_name: Some("Reyes".to_string()),
            ..Default::default()
        };
        assert!(!emp.is_teaching());
        assert_eq!(emp.summary(), "EMP-7 | Ana Reyes");

        emp.teaching = Some("Yes".to_string());
        assert!(emp.is_teaching());
        assert_eq!(emp.summary(), "EMP-7 | Ana Reyes (teaching)");
    }
}
