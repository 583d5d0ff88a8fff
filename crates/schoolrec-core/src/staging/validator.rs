use tracing::debug;

use super::row::{
    present, ClassScheduleDraft, ClassScheduleRow, EnrollmentDraft, EnrollmentRow, RowDraft,
    StagedRow,
};
use super::time::{overlaps, to_minutes};
use super::ValidationError;

/// A row that passed validation against some staged set.
///
/// Only `validate` constructs this. It is not `Clone`, and
/// `StagedRowSet::add` still re-checks the reference against its own rows,
/// since the row may have been validated against a different slice.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidatedRow(StagedRow);

impl ValidatedRow {
    pub fn row(&self) -> &StagedRow {
        &self.0
    }

    pub fn into_inner(self) -> StagedRow {
        self.0
    }
}

/// Check a draft against the rows already staged.
///
/// Rules, first failure wins: subject, start, end, start before end, room,
/// capacity (class schedule only), unique reference, and no overlap with
/// another session of the same subject (class schedule only). Sessions of
/// different subjects may overlap.
pub fn validate(draft: &RowDraft, existing: &[StagedRow]) -> Result<ValidatedRow, ValidationError> {
    let result = match draft {
        RowDraft::ClassSchedule(draft) => validate_class_schedule(draft, existing),
        RowDraft::EnrollmentSelection(draft) => validate_enrollment(draft, existing),
    };
    if let Err(ref reason) = result {
        debug!(reason = %reason, "Row rejected");
    }
    result.map(ValidatedRow)
}

fn validate_class_schedule(
    draft: &ClassScheduleDraft,
    existing: &[StagedRow],
) -> Result<StagedRow, ValidationError> {
    let subject = draft
        .subject
        .as_ref()
        .filter(|s| !s.id.trim().is_empty())
        .ok_or(ValidationError::MissingSubject)?;
    let time_from = present(&draft.time_from).ok_or(ValidationError::MissingStartTime)?;
    let time_to = present(&draft.time_to).ok_or(ValidationError::MissingEndTime)?;
    let (from, to) = checked_range(time_from, time_to)?;
    let room = draft
        .room
        .as_ref()
        .filter(|r| !r.id.trim().is_empty())
        .ok_or(ValidationError::MissingRoom)?;
    let max_enrolled = draft.max_enrolled.ok_or(ValidationError::MissingCapacity)?;

    let reference_id = draft.reference_id(&subject.id, time_from, time_to);
    ensure_unique(&reference_id, existing)?;

    for row in existing {
        let StagedRow::ClassSchedule(other) = row else {
            continue;
        };
        if other.subject_id != subject.id {
            continue;
        }
        // Rows in the set were validated, so their times parse.
        let (Ok(other_from), Ok(other_to)) =
            (to_minutes(&other.time_from), to_minutes(&other.time_to))
        else {
            continue;
        };
        if overlaps(from, to, other_from, other_to) {
            return Err(ValidationError::ScheduleOverlap {
                subject: other.display_subject.clone(),
                time_from: other.time_from.clone(),
                time_to: other.time_to.clone(),
            });
        }
    }

    Ok(StagedRow::ClassSchedule(ClassScheduleRow {
        reference_id,
        existing_id: draft.existing_id.clone(),
        subject_id: subject.id.clone(),
        display_subject: subject.label.clone(),
        time_from: time_from.to_string(),
        time_to: time_to.to_string(),
        room_id: room.id.clone(),
        room_label: room.label.clone(),
        teacher_id: draft.teacher.as_ref().map(|t| t.id.clone()),
        teacher_label: draft.teacher.as_ref().map(|t| t.label.clone()),
        max_enrolled,
        remarks: draft.remarks.clone().unwrap_or_default(),
    }))
}

fn validate_enrollment(
    draft: &EnrollmentDraft,
    existing: &[StagedRow],
) -> Result<StagedRow, ValidationError> {
    let slot = draft
        .slot
        .as_ref()
        .filter(|s| !s.id.trim().is_empty())
        .ok_or(ValidationError::MissingSubject)?;
    let time_from = present(&slot.time_from).ok_or(ValidationError::MissingStartTime)?;
    let time_to = present(&slot.time_to).ok_or(ValidationError::MissingEndTime)?;
    checked_range(time_from, time_to)?;
    let room = present(&slot.room_label).ok_or(ValidationError::MissingRoom)?;

    ensure_unique(&slot.id, existing)?;

    Ok(StagedRow::EnrollmentSelection(EnrollmentRow {
        reference_id: slot.id.clone(),
        display_subject: slot.subject_label.clone(),
        time_from: time_from.to_string(),
        time_to: time_to.to_string(),
        room_label: room.to_string(),
        teacher_label: slot.teacher_label.clone(),
        remarks: draft.remarks.clone().unwrap_or_default(),
    }))
}

fn checked_range(time_from: &str, time_to: &str) -> Result<(u32, u32), ValidationError> {
    let from = to_minutes(time_from)?;
    let to = to_minutes(time_to)?;
    if from >= to {
        return Err(ValidationError::InvalidTimeRange);
    }
    Ok((from, to))
}

pub(crate) fn ensure_unique(reference_id: &str, existing: &[StagedRow]) -> Result<(), ValidationError> {
    if existing.iter().any(|row| row.reference_id() == reference_id) {
        return Err(ValidationError::DuplicateSubject);
    }
    Ok(())
}
