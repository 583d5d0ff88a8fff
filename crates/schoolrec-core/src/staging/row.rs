//! Staged rows and the form drafts they are built from.
//!
//! A row is either a class-schedule entry (admin building a class timetable)
//! or an enrollment selection (a student picking fixed class-subject slots).
//! Both serialize to the shape the batch endpoints expect.

use serde::{Serialize, Serializer};

use crate::models::CandidateEntry;

/// A selected dropdown option: backend id plus what the user saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StagedRow {
    ClassSchedule(ClassScheduleRow),
    EnrollmentSelection(EnrollmentRow),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassScheduleRow {
    #[serde(rename = "id")]
    pub reference_id: String,
    /// Saved class-subject id when the row came from the backend
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
    pub subject_id: String,
    #[serde(rename = "subject")]
    pub display_subject: String,
    #[serde(rename = "timeFrom")]
    pub time_from: String,
    #[serde(rename = "timeTo")]
    pub time_to: String,
    pub room_id: String,
    #[serde(rename = "room")]
    pub room_label: String,
    #[serde(rename = "employee_id", skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(rename = "teacher", skip_serializing_if = "Option::is_none")]
    pub teacher_label: Option<String>,
    #[serde(rename = "maxEnrolled")]
    pub max_enrolled: u32,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentRow {
    /// Class-subject slot id
    #[serde(rename = "id")]
    pub reference_id: String,
    #[serde(rename = "subject")]
    pub display_subject: String,
    #[serde(rename = "timeFrom")]
    pub time_from: String,
    #[serde(rename = "timeTo")]
    pub time_to: String,
    #[serde(rename = "room", serialize_with = "as_label")]
    pub room_label: String,
    #[serde(rename = "teacher", serialize_with = "as_optional_label")]
    pub teacher_label: Option<String>,
    pub remarks: String,
}

#[derive(Serialize)]
struct Label<'a> {
    label: &'a str,
}

fn as_label<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    Label { label: value }.serialize(serializer)
}

fn as_optional_label<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    Label {
        label: value.as_deref().unwrap_or("-"),
    }
    .serialize(serializer)
}

impl StagedRow {
    pub fn reference_id(&self) -> &str {
        match self {
            StagedRow::ClassSchedule(row) => &row.reference_id,
            StagedRow::EnrollmentSelection(row) => &row.reference_id,
        }
    }

    pub fn display_subject(&self) -> &str {
        match self {
            StagedRow::ClassSchedule(row) => &row.display_subject,
            StagedRow::EnrollmentSelection(row) => &row.display_subject,
        }
    }

    pub fn time_from(&self) -> &str {
        match self {
            StagedRow::ClassSchedule(row) => &row.time_from,
            StagedRow::EnrollmentSelection(row) => &row.time_from,
        }
    }

    pub fn time_to(&self) -> &str {
        match self {
            StagedRow::ClassSchedule(row) => &row.time_to,
            StagedRow::EnrollmentSelection(row) => &row.time_to,
        }
    }

    pub fn room_label(&self) -> &str {
        match self {
            StagedRow::ClassSchedule(row) => &row.room_label,
            StagedRow::EnrollmentSelection(row) => &row.room_label,
        }
    }

    pub fn teacher_label(&self) -> Option<&str> {
        match self {
            StagedRow::ClassSchedule(row) => row.teacher_label.as_deref(),
            StagedRow::EnrollmentSelection(row) => row.teacher_label.as_deref(),
        }
    }

    pub fn max_enrolled(&self) -> Option<u32> {
        match self {
            StagedRow::ClassSchedule(row) => Some(row.max_enrolled),
            StagedRow::EnrollmentSelection(_) => None,
        }
    }

    pub fn remarks(&self) -> &str {
        match self {
            StagedRow::ClassSchedule(row) => &row.remarks,
            StagedRow::EnrollmentSelection(row) => &row.remarks,
        }
    }

    /// Load the row back into form fields for editing.
    pub fn to_draft(&self) -> RowDraft {
        match self {
            StagedRow::ClassSchedule(row) => RowDraft::ClassSchedule(ClassScheduleDraft {
                existing_id: row.existing_id.clone(),
                subject: Some(Choice::new(&row.subject_id, &row.display_subject)),
                time_from: Some(row.time_from.clone()),
                time_to: Some(row.time_to.clone()),
                room: Some(Choice::new(&row.room_id, &row.room_label)),
                teacher: match (&row.teacher_id, &row.teacher_label) {
                    (Some(id), label) => Some(Choice::new(id, label.clone().unwrap_or_default())),
                    (None, _) => None,
                },
                max_enrolled: Some(row.max_enrolled),
                remarks: Some(row.remarks.clone()),
            }),
            StagedRow::EnrollmentSelection(row) => RowDraft::EnrollmentSelection(EnrollmentDraft {
                slot: Some(CandidateEntry::new(
                    row.reference_id.clone(),
                    row.display_subject.clone(),
                    Some(row.time_from.clone()),
                    Some(row.time_to.clone()),
                    Some(row.room_label.clone()),
                    row.teacher_label.clone(),
                )),
                remarks: Some(row.remarks.clone()),
            }),
        }
    }
}

/// Unvalidated form input for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDraft {
    ClassSchedule(ClassScheduleDraft),
    EnrollmentSelection(EnrollmentDraft),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassScheduleDraft {
    pub existing_id: Option<String>,
    pub subject: Option<Choice>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub room: Option<Choice>,
    pub teacher: Option<Choice>,
    pub max_enrolled: Option<u32>,
    pub remarks: Option<String>,
}

impl ClassScheduleDraft {
    /// Row key: the saved id if there is one, otherwise subject plus slot.
    pub fn reference_id(&self, subject_id: &str, time_from: &str, time_to: &str) -> String {
        match self.existing_id {
            Some(ref id) if !id.trim().is_empty() => id.clone(),
            _ => format!("{}@{}-{}", subject_id, time_from.trim(), time_to.trim()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentDraft {
    pub slot: Option<CandidateEntry>,
    pub remarks: Option<String>,
}

/// Present and not blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment_row() -> StagedRow {
        StagedRow::EnrollmentSelection(EnrollmentRow {
            reference_id: "cs1".to_string(),
            display_subject: "Math".to_string(),
            time_from: "08:00".to_string(),
            time_to: "09:00".to_string(),
            room_label: "Room 101".to_string(),
            teacher_label: None,
            remarks: String::new(),
        })
    }

    #[test]
    fn test_enrollment_row_wire_shape() {
        let value = serde_json::to_value(enrollment_row()).unwrap();
        assert_eq!(value["id"], "cs1");
        assert_eq!(value["subject"], "Math");
        assert_eq!(value["timeFrom"], "08:00");
        assert_eq!(value["room"]["label"], "Room 101");
        assert_eq!(value["teacher"]["label"], "-");
    }

    #[test]
    fn test_class_row_wire_shape() {
        let row = StagedRow::ClassSchedule(ClassScheduleRow {
            reference_id: "sub1@08:00-09:00".to_string(),
            existing_id: None,
            subject_id: "sub1".to_string(),
            display_subject: "Math".to_string(),
            time_from: "08:00".to_string(),
            time_to: "09:00".to_string(),
            room_id: "r1".to_string(),
            room_label: "Room 101".to_string(),
            teacher_id: None,
            teacher_label: None,
            max_enrolled: 40,
            remarks: String::new(),
        });
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["maxEnrolled"], 40);
        assert_eq!(value["room_id"], "r1");
        assert!(value.get("_id").is_none());
        assert!(value.get("employee_id").is_none());
        assert_eq!(row.max_enrolled(), Some(40));
    }

    #[test]
    fn test_enrollment_row_to_draft_rebuilds_slot() {
        match enrollment_row().to_draft() {
            RowDraft::EnrollmentSelection(draft) => {
                let slot = draft.slot.unwrap();
                assert_eq!(slot.id, "cs1");
                assert_eq!(slot.label, "Math | 08:00 - 09:00 | Room 101 | ");
            }
            other => panic!("unexpected draft: {other:?}"),
        }
    }

    #[test]
    fn test_reference_id_prefers_saved_id() {
        let mut draft = ClassScheduleDraft::default();
        assert_eq!(draft.reference_id("sub1", "08:00", "09:00"), "sub1@08:00-09:00");
        draft.existing_id = Some("cs9".to_string());
        assert_eq!(draft.reference_id("sub1", "08:00", "09:00"), "cs9");
    }
}
