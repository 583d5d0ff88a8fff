//! Row staging for class schedules and enrollment subject selection.
//!
//! A form collects rows in memory, checks each one against the rows already
//! collected, and saves them all in a single batch request:
//!
//! - `time`: `HH:MM` parsing and half-open overlap
//! - `validator`: required fields, duplicates, same-subject overlap
//! - `catalog`: static and shrinking candidate pools
//! - `set`: the ordered staged rows
//! - `submit`: batch request building and the `BatchWriter` seam
//! - `session`: one open form, catalog load sequencing and the save flow

pub mod catalog;
pub mod error;
pub mod row;
pub mod session;
pub mod set;
pub mod submit;
pub mod time;
pub mod validator;

pub use catalog::{CatalogItem, SelectionCatalog, ShrinkingCatalog, StaticCatalog};
pub use error::{CatalogLoadError, StagingError, SubmitError, ValidationError};
pub use row::{
    Choice, ClassScheduleDraft, ClassScheduleRow, EnrollmentDraft, EnrollmentRow, RowDraft,
    StagedRow,
};
pub use session::{CatalogLoad, EditingSession, LoadTicket};
pub use set::StagedRowSet;
pub use submit::{
    build_request, submit, BatchEndpoint, BatchMethod, BatchRequest, BatchWriter, ParentContext,
};
pub use time::{overlaps, to_minutes};
pub use validator::{validate, ValidatedRow};
