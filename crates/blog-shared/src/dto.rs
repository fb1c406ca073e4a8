//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAdminRequest {
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing an admin's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// One section of a post, as sent and received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDto {
    pub heading: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Body of create and full-replace requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostRequest {
    pub title: String,
    pub introduction: String,
    #[serde(default)]
    pub sections: Vec<SectionDto>,
    /// Absent on update means "leave the publication state alone".
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// Body of the publish toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub is_published: bool,
}

/// A blog post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub introduction: String,
    pub sections: Vec<SectionDto>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Confirmation of a permanent delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

/// Query string of paginated listings: `?page=2&limit=6`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A page of results with the totals a pagination control needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_request_uses_camel_case_and_optional_flag() {
        let body = r#"{
            "title": "Hello",
            "introduction": "World",
            "sections": [{"heading": "One", "examples": ["a", "b"]}],
            "isPublished": true
        }"#;

        let request: BlogPostRequest = serde_json::from_str(body).unwrap();

        assert_eq!(request.is_published, Some(true));
        assert_eq!(request.sections[0].content, "");
        assert_eq!(request.sections[0].examples, vec!["a", "b"]);

        let without_flag: BlogPostRequest =
            serde_json::from_str(r#"{"title": "t", "introduction": "i"}"#).unwrap();
        assert!(without_flag.is_published.is_none());
        assert!(without_flag.sections.is_empty());
    }

    #[test]
    fn test_paginated_response_field_names() {
        let page = PaginatedResponse::<u8> {
            items: vec![],
            total_count: 0,
            total_pages: 1,
            current_page: 1,
            page_size: 6,
        };

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["pageSize"], 6);
    }
}
