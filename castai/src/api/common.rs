//! Common types and utilities for the CAST AI API

use serde::{Deserialize, Serialize};

/// Envelope of every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub message: Option<String>,
    #[serde(default)]
    pub field_violations: Vec<FieldViolation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: message={message:?}, field_violations={field_violations:?}")]
pub struct ApiErrorDetails {
    pub message: Option<String>,
    pub field_violations: Vec<FieldViolation>,
}

/// Base path of everything scoped to one cluster
pub fn cluster_path(cluster_id: &str) -> String {
    format!("/v1/kubernetes/clusters/{}", urlencoding::encode(cluster_id))
}

/// Appends an encoded path segment
pub fn child_path(base: &str, segment: &str) -> String {
    format!("{}/{}", base, urlencoding::encode(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_encoded() {
        let base = cluster_path("c-1");
        assert_eq!(base, "/v1/kubernetes/clusters/c-1");
        assert_eq!(
            child_path(&format!("{}/node-templates", base), "gpu pool/a"),
            "/v1/kubernetes/clusters/c-1/node-templates/gpu%20pool%2Fa"
        );
    }

    #[test]
    fn list_without_items_is_empty() {
        let list: ListResponse<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn error_body_with_violations() {
        let body = r#"{"message":"invalid","fieldViolations":[{"field":"subnets","description":"required"}]}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("invalid"));
        assert_eq!(parsed.field_violations[0].field, "subnets");
    }
}
