use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::{ApiError, DEFAULT_REJECTION_MESSAGE};

/// One page of a `/list` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(rename = "currentPage", default = "first_page")]
    pub current_page: u32,
    #[serde(rename = "totalPages", default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Unpaged list response used by dependent lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Response to add / edit / delete / batch writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl WriteResponse {
    /// Turn `{ success: false }` into `ApiError::Rejected` and hand back the
    /// saved record (or `Null` when the backend did not echo one).
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
            Err(ApiError::Rejected(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_when_counts_missing() {
        let page: Page<Value> = serde_json::from_str(r#"{"data": [{"_id": "a"}]}"#).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_counts() {
        let page: Page<Value> =
            serde_json::from_str(r#"{"data": [], "currentPage": 2, "totalPages": 5}"#).unwrap();
        assert!(page.has_next());
    }

    #[test]
    fn test_write_response_rejected_keeps_message() {
        let resp: WriteResponse =
            serde_json::from_str(r#"{"success": false, "message": "Room already booked"}"#).unwrap();
        match resp.into_result() {
            Err(ApiError::Rejected(msg)) => assert_eq!(msg, "Room already booked"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_write_response_rejected_without_message() {
        let resp: WriteResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        match resp.into_result() {
            Err(ApiError::Rejected(msg)) => assert_eq!(msg, DEFAULT_REJECTION_MESSAGE),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_write_response_success_returns_data() {
        let resp: WriteResponse =
            serde_json::from_str(r#"{"success": true, "data": {"_id": "c1"}}"#).unwrap();
        assert_eq!(resp.into_result().unwrap()["_id"], "c1");
    }
}
