//! Class-subject schedules and enrollments.
//!
//! `ClassSubject` is the backend record for one scheduled session of a
//! subject in a class. `CandidateEntry` is the flattened form offered to the
//! enrollment form as a selectable slot.

use serde::{Deserialize, Serialize};

use super::person::{Employee, Student};
use super::resource::{Record, Ref, Resource};
use super::school::{SchoolClass, SchoolRoom, SchoolSubject};
use crate::utils::format_time_range;

/// Separator used in candidate labels
const LABEL_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSubject {
    #[serde(rename = "_id")]
    pub id: String,
    pub class_id: Option<Ref<SchoolClass>>,
    pub subject_id: Option<Ref<SchoolSubject>>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub room_id: Option<Ref<SchoolRoom>>,
    pub employee_id: Option<Ref<Employee>>,
    pub max_enrolled: Option<u32>,
    pub remarks: Option<String>,
}

impl ClassSubject {
    pub fn subject_name(&self) -> Option<&str> {
        self.subject_id
            .as_ref()
            .and_then(|s| s.populated())
            .and_then(|s| s.subject_name.as_deref())
    }

    pub fn room_name(&self) -> Option<&str> {
        self.room_id
            .as_ref()
            .and_then(|r| r.populated())
            .and_then(|r| r.room_name.as_deref())
    }

    pub fn teacher_name(&self) -> Option<String> {
        self.employee_id
            .as_ref()
            .and_then(|e| e.populated())
            .map(|e| e.display_name())
            .filter(|n| !n.is_empty())
    }

    /// Flatten into a selectable enrollment slot.
    pub fn to_candidate(&self) -> CandidateEntry {
        CandidateEntry::new(
            self.id.clone(),
            self.subject_name().unwrap_or_default().to_string(),
            self.time_from.clone(),
            self.time_to.clone(),
            self.room_name().map(str::to_string),
            self.teacher_name(),
        )
    }
}

impl Record for ClassSubject {
    const RESOURCE: Resource = Resource::ClassSubject;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        self.to_candidate().label
    }
}

/// A class-subject slot offered to the enrollment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub id: String,
    /// `"<subject> | <from> - <to> | <room> | <teacher>"`
    pub label: String,
    pub subject_label: String,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub room_label: Option<String>,
    pub teacher_label: Option<String>,
}

impl CandidateEntry {
    pub fn new(
        id: String,
        subject_label: String,
        time_from: Option<String>,
        time_to: Option<String>,
        room_label: Option<String>,
        teacher_label: Option<String>,
    ) -> Self {
        let label = [
            subject_label.clone(),
            format_time_range(time_from.as_deref(), time_to.as_deref()),
            room_label.clone().unwrap_or_default(),
            teacher_label.clone().unwrap_or_default(),
        ]
        .join(LABEL_SEPARATOR);

        Self {
            id,
            label,
            subject_label,
            time_from,
            time_to,
            room_label,
            teacher_label,
        }
    }
}

/// An enrollment of one student in a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(rename = "_id")]
    pub id: String,
    pub student_id: Option<Ref<Student>>,
    pub class_id: Option<Ref<SchoolClass>>,
    pub created_datetime: Option<String>,
}

impl Record for Enrollment {
    const RESOURCE: Resource = Resource::Enrollment;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        let student = self
            .student_id
            .as_ref()
            .and_then(|s| s.populated())
            .map(|s| s.summary())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "{} | {}",
            student,
            crate::utils::format_date(self.created_datetime.as_deref().unwrap_or(""))
        )
    }
}

/// One subject a student is enrolled in, as listed on the enrollment screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledSubject {
    #[serde(rename = "_id")]
    pub id: String,
    pub student_id: Option<Ref<Student>>,
    pub class_subject_id: Option<Ref<ClassSubject>>,
    pub remarks: Option<String>,
    pub created_datetime: Option<String>,
}

impl Record for EnrolledSubject {
    const RESOURCE: Resource = Resource::EnrolledSubject;

    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> String {
        let student = self
            .student_id
            .as_ref()
            .and_then(|s| s.populated())
            .map(|s| s.summary())
            .unwrap_or_else(|| "N/A".to_string());
        let slot = self
            .class_subject_id
            .as_ref()
            .and_then(|c| c.populated())
            .map(|c| c.to_candidate().label)
            .unwrap_or_else(|| "N/A".to_string());
        format!("{} | {}", student, slot)
    }
}
