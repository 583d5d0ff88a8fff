//! Packaging a staged set into one batch write.

use std::future::Future;

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::api::ApiError;
use crate::auth::AuthContext;
use crate::models::{Resource, WriteResponse};

use super::row::StagedRow;
use super::SubmitError;

/// The record a staged set is attached to when saved.
#[derive(Debug, Clone, PartialEq)]
pub enum ParentContext {
    /// A class whose subject schedule is being built. `fields` carries any
    /// class attributes edited on the same form.
    Class {
        class_id: String,
        fields: Map<String, Value>,
    },
    /// A student enrollment, new (`enrollment_id: None`) or existing.
    Enrollment {
        enrollment_id: Option<String>,
        student_id: String,
        class_id: Option<String>,
    },
}

impl ParentContext {
    pub fn class(class_id: impl Into<String>) -> Self {
        ParentContext::Class {
            class_id: class_id.into(),
            fields: Map::new(),
        }
    }

    pub fn new_enrollment(student_id: impl Into<String>, class_id: impl Into<String>) -> Self {
        ParentContext::Enrollment {
            enrollment_id: None,
            student_id: student_id.into(),
            class_id: Some(class_id.into()),
        }
    }

    /// Enrollment needs at least one subject; a class schedule may be saved
    /// empty.
    pub fn requires_rows(&self) -> bool {
        matches!(self, ParentContext::Enrollment { .. })
    }

    pub fn endpoint(&self) -> BatchEndpoint {
        match self {
            ParentContext::Class { class_id, .. } => BatchEndpoint::ClassSubjectsAddMany {
                class_id: class_id.clone(),
            },
            ParentContext::Enrollment {
                enrollment_id: Some(id),
                ..
            } => BatchEndpoint::EnrollmentEdit { id: id.clone() },
            ParentContext::Enrollment {
                enrollment_id: None,
                ..
            } => BatchEndpoint::EnrollmentAdd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEndpoint {
    ClassSubjectsAddMany { class_id: String },
    EnrollmentAdd,
    EnrollmentEdit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMethod {
    Post,
    Put,
}

impl BatchEndpoint {
    pub fn method(&self) -> BatchMethod {
        match self {
            BatchEndpoint::EnrollmentEdit { .. } => BatchMethod::Put,
            _ => BatchMethod::Post,
        }
    }

    /// Path under `/admin/`
    pub fn path(&self) -> String {
        match self {
            BatchEndpoint::ClassSubjectsAddMany { class_id } => {
                format!("{}/add_many/{}", Resource::ClassSubject.path(), class_id)
            }
            BatchEndpoint::EnrollmentAdd => format!("{}/add", Resource::Enrollment.path()),
            BatchEndpoint::EnrollmentEdit { id } => {
                format!("{}/edit/{}", Resource::Enrollment.path(), id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub endpoint: BatchEndpoint,
    pub body: Value,
}

/// Sends one batch request. Implemented by `ApiClient`; tests use fakes.
pub trait BatchWriter {
    fn write_batch(
        &self,
        auth: &AuthContext,
        request: &BatchRequest,
    ) -> impl Future<Output = Result<WriteResponse, ApiError>> + Send;
}

/// Build the request body: parent fields plus `subjects: [rows]`.
pub fn build_request(parent: &ParentContext, rows: &[StagedRow]) -> Result<BatchRequest, SubmitError> {
    if rows.is_empty() && parent.requires_rows() {
        return Err(SubmitError::NothingStaged);
    }

    let mut body = match parent {
        ParentContext::Class { class_id, fields } => {
            let mut body = fields.clone();
            body.insert("class_id".to_string(), json!(class_id));
            body
        }
        ParentContext::Enrollment {
            student_id,
            class_id,
            ..
        } => {
            let mut body = Map::new();
            body.insert("student_id".to_string(), json!(student_id));
            if let Some(class_id) = class_id {
                body.insert("class_id".to_string(), json!(class_id));
            }
            body
        }
    };
    body.insert("subjects".to_string(), json!(rows));

    Ok(BatchRequest {
        endpoint: parent.endpoint(),
        body: Value::Object(body),
    })
}

/// Send the staged rows for `parent` as one write.
///
/// Nothing is sent when the set is empty but rows are required, or when the
/// auth context has expired. No retry on failure; the caller keeps its rows.
pub async fn submit<W: BatchWriter>(
    writer: &W,
    auth: &AuthContext,
    parent: &ParentContext,
    rows: &[StagedRow],
) -> Result<Value, SubmitError> {
    let request = build_request(parent, rows)?;
    auth.bearer()?;

    info!(path = %request.endpoint.path(), rows = rows.len(), "Submitting staged rows");
    let response = writer.write_batch(auth, &request).await;
    match response.and_then(WriteResponse::into_result) {
        Ok(record) => Ok(record),
        Err(err) => {
            warn!(error = %err, path = %request.endpoint.path(), "Batch submission failed");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::row::EnrollmentRow;

    fn row(id: &str) -> StagedRow {
        StagedRow::EnrollmentSelection(EnrollmentRow {
            reference_id: id.to_string(),
            display_subject: "Math".to_string(),
            time_from: "08:00".to_string(),
            time_to: "09:00".to_string(),
            room_label: "Room 1".to_string(),
            teacher_label: None,
            remarks: String::new(),
        })
    }

    #[test]
    fn test_class_batch_path_and_body() {
        let mut fields = Map::new();
        fields.insert("employee_id".to_string(), json!("e1"));
        let parent = ParentContext::Class {
            class_id: "c1".to_string(),
            fields,
        };
        let request = build_request(&parent, &[row("cs1")]).unwrap();
        assert_eq!(request.endpoint.path(), "school-class-subject/add_many/c1");
        assert_eq!(request.endpoint.method(), BatchMethod::Post);
        assert_eq!(request.body["employee_id"], "e1");
        assert_eq!(request.body["class_id"], "c1");
        assert_eq!(request.body["subjects"][0]["id"], "cs1");
    }

    #[test]
    fn test_empty_class_schedule_allowed() {
        let request = build_request(&ParentContext::class("c1"), &[]).unwrap();
        assert_eq!(request.body["subjects"], json!([]));
    }

    #[test]
    fn test_empty_enrollment_rejected() {
        let parent = ParentContext::new_enrollment("s1", "c1");
        assert!(matches!(build_request(&parent, &[]), Err(SubmitError::NothingStaged)));
    }

    #[test]
    fn test_existing_enrollment_uses_edit() {
        let parent = ParentContext::Enrollment {
            enrollment_id: Some("en1".to_string()),
            student_id: "s1".to_string(),
            class_id: None,
        };
        let request = build_request(&parent, &[row("cs1")]).unwrap();
        assert_eq!(request.endpoint.path(), "school-enrollment/edit/en1");
        assert_eq!(request.endpoint.method(), BatchMethod::Put);
        assert_eq!(request.body["student_id"], "s1");
        assert!(request.body.get("class_id").is_none());
    }
}
