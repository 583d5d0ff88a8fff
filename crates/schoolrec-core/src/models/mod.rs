//! Data models for school-records entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Employee`, `Student`: people records
//! - `SchoolYear`, `SchoolLevel`, `SchoolSection`, `SchoolSubject`,
//!   `SchoolBuilding`, `SchoolRoom`, `SchoolClass`: school structure
//! - `ClassSubject`, `Enrollment`, `EnrolledSubject`: schedules and enrollment
//! - `Page`, `ListResponse`, `WriteResponse`: response envelopes
//! - `Resource`, `Record`, `Ref`: endpoint mapping and foreign keys

pub mod envelope;
pub mod person;
pub mod resource;
pub mod schedule;
pub mod school;

pub use envelope::{ListResponse, Page, WriteResponse};
pub use person::{Employee, Student};
pub use resource::{Record, Ref, Resource};
pub use schedule::{CandidateEntry, ClassSubject, EnrolledSubject, Enrollment};
pub use school::{
    SchoolBuilding, SchoolClass, SchoolLevel, SchoolRoom, SchoolSection, SchoolSubject, SchoolYear,
};
