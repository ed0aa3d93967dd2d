//! Success envelope shared by every REST handler.
//!
//! ```json
//! { "success": true, "data": ..., "message"?: "...", "pagination"?: { ... } }
//! ```

use habitual_core::pagination::Pagination;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// A body with no `data`, only a confirmation message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only_omits_data() {
        let json = serde_json::to_value(ApiResponse::message("Habit deleted")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "Habit deleted" }));
    }

    #[test]
    fn paginated_carries_pagination_block() {
        let json =
            serde_json::to_value(ApiResponse::paginated(vec![1, 2], Pagination::new(1, 2, 5)))
                .unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pagination"]["pages"], 3);
    }
}
