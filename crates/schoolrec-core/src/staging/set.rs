use tracing::debug;

use super::catalog::SelectionCatalog;
use super::row::{RowDraft, StagedRow};
use super::validator::{ensure_unique, validate, ValidatedRow};
use super::{StagingError, ValidationError};

/// A row taken out for editing, remembered so it can go back where it was.
#[derive(Debug, Clone)]
struct PendingEdit {
    index: usize,
    original: StagedRow,
}

/// Ordered rows staged for one parent record, plus the catalog they were
/// picked from.
///
/// Rows are never changed in place: editing removes the row and the edited
/// version is validated and added again at the same position.
#[derive(Debug, Clone)]
pub struct StagedRowSet<C: SelectionCatalog> {
    rows: Vec<StagedRow>,
    catalog: C,
    editing: Option<PendingEdit>,
}

impl<C: SelectionCatalog> StagedRowSet<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            rows: Vec::new(),
            catalog,
            editing: None,
        }
    }

    pub fn rows(&self) -> &[StagedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StagedRow> {
        self.rows.get(index)
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Validate a draft against the current rows and add it.
    /// Returns the index the row landed at.
    pub fn stage(&mut self, draft: &RowDraft) -> Result<usize, ValidationError> {
        let row = validate(draft, &self.rows)?;
        self.add(row)
    }

    /// Add a validated row. A pending edit puts it back at the edited
    /// position; otherwise it is appended. A reference already in this set
    /// is rejected even if the row passed validation elsewhere.
    pub fn add(&mut self, row: ValidatedRow) -> Result<usize, ValidationError> {
        let row = row.into_inner();
        ensure_unique(row.reference_id(), &self.rows)?;
        let reference_id = row.reference_id().to_string();
        let index = match self.editing.take() {
            Some(edit) => edit.index.min(self.rows.len()),
            None => self.rows.len(),
        };
        self.rows.insert(index, row);
        self.consume_from_catalog(&reference_id);
        debug!(reference_id = %reference_id, index, "Row staged");
        Ok(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<StagedRow, StagingError> {
        if index >= self.rows.len() {
            return Err(StagingError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        let row = self.rows.remove(index);
        self.restore_to_catalog(row.reference_id());
        debug!(reference_id = %row.reference_id(), index, "Row removed");
        Ok(row)
    }

    /// Take a row out for editing and return its fields as a draft.
    /// Stage the edited draft to put it back, or `cancel_edit` to restore it.
    pub fn edit_at(&mut self, index: usize) -> Result<RowDraft, StagingError> {
        if self.editing.is_some() {
            return Err(StagingError::EditInProgress);
        }
        let original = self.remove_at(index)?;
        let draft = original.to_draft();
        self.editing = Some(PendingEdit { index, original });
        Ok(draft)
    }

    /// Put the row under edit back unchanged. Returns false if nothing was
    /// being edited.
    pub fn cancel_edit(&mut self) -> bool {
        match self.editing.take() {
            Some(edit) => {
                let index = edit.index.min(self.rows.len());
                self.consume_from_catalog(edit.original.reference_id());
                self.rows.insert(index, edit.original);
                true
            }
            None => false,
        }
    }

    /// Drop every row and return their candidates to the catalog.
    pub fn clear(&mut self) {
        let rows = std::mem::take(&mut self.rows);
        for row in &rows {
            self.restore_to_catalog(row.reference_id());
        }
        self.editing = None;
    }

    /// Swap in freshly loaded candidates, keeping staged ones hidden.
    pub fn reload_catalog(&mut self, items: Vec<C::Item>) {
        let staged: Vec<&str> = self.rows.iter().map(|r| r.reference_id()).collect();
        self.catalog.replace(items, &staged);
    }

    fn consume_from_catalog(&mut self, reference_id: &str) {
        self.catalog.consume(reference_id);
    }

    fn restore_to_catalog(&mut self, reference_id: &str) {
        self.catalog.restore(reference_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateEntry;
    use crate::staging::catalog::{ShrinkingCatalog, StaticCatalog};
    use crate::staging::row::{ClassScheduleDraft, Choice, EnrollmentDraft};

    fn entry(id: &str, subject: &str, from: &str, to: &str) -> CandidateEntry {
        CandidateEntry::new(
            id.to_string(),
            subject.to_string(),
            Some(from.to_string()),
            Some(to.to_string()),
            Some("Room 1".to_string()),
            None,
        )
    }

    fn pick<C: SelectionCatalog<Item = CandidateEntry>>(set: &StagedRowSet<C>, id: &str) -> RowDraft {
        RowDraft::EnrollmentSelection(EnrollmentDraft {
            slot: set.catalog().find(id).cloned(),
            remarks: None,
        })
    }

    fn enrollment_set() -> StagedRowSet<ShrinkingCatalog<CandidateEntry>> {
        StagedRowSet::new(ShrinkingCatalog::new(vec![
            entry("math", "Math", "08:00", "09:00"),
            entry("sci", "Science", "09:00", "10:00"),
            entry("art", "Art", "10:00", "11:00"),
        ]))
    }

    fn class_draft(from: &str, to: &str) -> RowDraft {
        RowDraft::ClassSchedule(ClassScheduleDraft {
            subject: Some(Choice::new("math", "Math")),
            time_from: Some(from.to_string()),
            time_to: Some(to.to_string()),
            room: Some(Choice::new("r1", "Room 1")),
            max_enrolled: Some(30),
            ..Default::default()
        })
    }

    #[test]
    fn test_staging_shrinks_catalog() {
        let mut set = enrollment_set();
        let draft = pick(&set, "math");
        assert_eq!(set.stage(&draft).unwrap(), 0);
        assert_eq!(set.len(), 1);
        assert!(set.catalog().find("math").is_none());
        assert_eq!(set.catalog().candidates().len(), 2);
    }

    #[test]
    fn test_duplicate_reference_rejected_and_set_unchanged() {
        let mut set = enrollment_set();
        let draft = pick(&set, "math");
        set.stage(&draft).unwrap();
        assert_eq!(set.stage(&draft).unwrap_err(), ValidationError::DuplicateSubject);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_invalid_range_leaves_set_unchanged() {
        let mut set = StagedRowSet::new(StaticCatalog::<CandidateEntry>::default());
        set.stage(&class_draft("08:00", "09:00")).unwrap();
        let before = set.rows().to_vec();
        assert_eq!(
            set.stage(&class_draft("10:00", "09:00")).unwrap_err(),
            ValidationError::InvalidTimeRange
        );
        assert_eq!(set.rows(), before.as_slice());
    }

    #[test]
    fn test_remove_then_readd_is_idempotent() {
        let mut set = enrollment_set();
        for id in ["math", "sci", "art"] {
            let draft = pick(&set, id);
            set.stage(&draft).unwrap();
        }
        let rows_before = set.rows().to_vec();
        let removed = set.remove_at(1).unwrap();
        assert_eq!(removed.reference_id(), "sci");
        assert!(set.catalog().find("sci").is_some());

        set.stage(&removed.to_draft()).unwrap();
        let mut rows_after = set.rows().to_vec();
        let mut expected = rows_before.clone();
        rows_after.sort_by(|a, b| a.reference_id().cmp(b.reference_id()));
        expected.sort_by(|a, b| a.reference_id().cmp(b.reference_id()));
        assert_eq!(rows_after, expected);
        assert!(set.catalog().is_empty());
    }

    #[test]
    fn test_add_rejects_row_validated_against_other_rows() {
        let mut set = enrollment_set();
        let draft = pick(&set, "math");
        let first = validate(&draft, &[]).unwrap();
        let second = validate(&draft, &[]).unwrap();

        assert_eq!(set.add(first).unwrap(), 0);
        assert_eq!(set.add(second).unwrap_err(), ValidationError::DuplicateSubject);
        assert_eq!(set.len(), 1);

        // The slot was consumed once; removing the row offers it again.
        set.remove_at(0).unwrap();
        assert!(set.catalog().find("math").is_some());
        assert_eq!(set.catalog().candidates().len(), 3);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut set = enrollment_set();
        assert_eq!(
            set.remove_at(0).unwrap_err(),
            StagingError::IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_edit_readds_at_same_position() {
        let mut set = StagedRowSet::new(StaticCatalog::<CandidateEntry>::default());
        set.stage(&class_draft("08:00", "09:00")).unwrap();
        set.stage(&class_draft("10:00", "11:00")).unwrap();
        set.stage(&class_draft("13:00", "14:00")).unwrap();

        let RowDraft::ClassSchedule(mut draft) = set.edit_at(1).unwrap() else {
            panic!("expected class draft");
        };
        assert!(set.is_editing());
        assert_eq!(set.len(), 2);

        // The edited row no longer conflicts with its old slot.
        draft.time_from = Some("10:30".to_string());
        draft.time_to = Some("11:30".to_string());
        let index = set.stage(&RowDraft::ClassSchedule(draft)).unwrap();
        assert_eq!(index, 1);
        assert!(!set.is_editing());
        assert_eq!(set.get(1).unwrap().time_from(), "10:30");
    }

    #[test]
    fn test_edit_revalidates_against_remaining_rows() {
        let mut set = StagedRowSet::new(StaticCatalog::<CandidateEntry>::default());
        set.stage(&class_draft("08:00", "09:00")).unwrap();
        set.stage(&class_draft("10:00", "11:00")).unwrap();

        let RowDraft::ClassSchedule(mut draft) = set.edit_at(1).unwrap() else {
            panic!("expected class draft");
        };
        draft.time_from = Some("08:30".to_string());
        let err = set.stage(&RowDraft::ClassSchedule(draft)).unwrap_err();
        assert!(matches!(err, ValidationError::ScheduleOverlap { .. }));
        assert!(set.is_editing());

        assert_eq!(set.edit_at(0).unwrap_err(), StagingError::EditInProgress);
        assert!(set.cancel_edit());
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().time_from(), "10:00");
    }

    #[test]
    fn test_edit_enrollment_returns_slot_then_reconsumes() {
        let mut set = enrollment_set();
        let draft = pick(&set, "math");
        set.stage(&draft).unwrap();

        let draft = set.edit_at(0).unwrap();
        assert!(set.catalog().find("math").is_some());
        set.stage(&draft).unwrap();
        assert!(set.catalog().find("math").is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clear_returns_everything_to_catalog() {
        let mut set = enrollment_set();
        for id in ["math", "art"] {
            let draft = pick(&set, id);
            set.stage(&draft).unwrap();
        }
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.catalog().candidates().len(), 3);
    }

    #[test]
    fn test_reload_catalog_keeps_staged_hidden() {
        let mut set = enrollment_set();
        let draft = pick(&set, "math");
        set.stage(&draft).unwrap();
        set.reload_catalog(vec![
            entry("math", "Math", "08:00", "09:00"),
            entry("pe", "PE", "14:00", "15:00"),
        ]);
        let offered: Vec<&str> = set.catalog().candidates().into_iter().map(|c| c.id.as_str()).collect();
        assert_eq!(offered, vec!["pe"]);
    }
}
