// src/core/backend.rs
//! Transport seam between the view state and the analysis service

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::types::{ErrorBody, JobMatch};
use crate::upload::StagedFile;

/// Status and raw body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json_body(status: u16, body: serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// The `error` field of a JSON error body, if there is one
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.trim().is_empty())
    }

    /// Server error carrying the body's message or `fallback`
    pub fn server_error(&self, fallback: impl FnOnce(u16) -> String) -> ClientError {
        ClientError::Server {
            status: self.status,
            message: self.error_message().unwrap_or_else(|| fallback(self.status)),
        }
    }
}

/// Every call the client makes to the analysis service.
///
/// `Err` is reserved for requests that never completed (network failures,
/// unreadable local files). Any HTTP status, including errors, comes back
/// as an `HttpReply` so each view can attribute it.
#[async_trait]
pub trait MatchingBackend: Send + Sync {
    async fn list_jds(&self) -> Result<HttpReply, ClientError>;

    async fn upload_jd(&self, jd: &StagedFile) -> Result<HttpReply, ClientError>;

    async fn delete_jd(&self, id: &str) -> Result<HttpReply, ClientError>;

    /// Address of the raw stored document
    fn view_jd_url(&self, id: &str) -> String;

    async fn analyze_resume(&self, resume: &StagedFile) -> Result<HttpReply, ClientError>;

    async fn send_results(
        &self,
        email: &str,
        job_matches: &[JobMatch],
    ) -> Result<HttpReply, ClientError>;

    async fn bulk_analyze(
        &self,
        jd: &StagedFile,
        resumes: &[StagedFile],
    ) -> Result<HttpReply, ClientError>;

    async fn analyze_missing_skills(
        &self,
        resume: &StagedFile,
        job_description: &str,
    ) -> Result<HttpReply, ClientError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extraction() {
        let reply = HttpReply::json_body(500, serde_json::json!({"error": "model timeout"}));
        assert_eq!(reply.error_message().as_deref(), Some("model timeout"));
        assert!(!reply.is_success());
    }

    #[test]
    fn test_server_error_falls_back_on_non_json_body() {
        let reply = HttpReply::new(502, "<html>Bad Gateway</html>");
        let err = reply.server_error(|s| format!("Server error: {}", s));
        assert_eq!(err.to_string(), "Server error: 502");
    }

    #[test]
    fn test_decode_failure_is_typed() {
        let reply = HttpReply::new(200, "not json");
        let parsed: Result<serde_json::Value, _> = reply.json();
        assert!(matches!(parsed, Err(ClientError::Decode(_))));
    }
}
