// src/core/service_client.rs
//! HTTP client for the TalentAlign analysis service

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{error, info, trace};

use crate::core::backend::{HttpReply, MatchingBackend};
use crate::error::ClientError;
use crate::types::{JobMatch, SendResultsRequest};
use crate::upload::StagedFile;

const JDS_ENDPOINT: &str = "/api/jds";
const UPLOAD_JD_ENDPOINT: &str = "/api/upload-jd";
const DELETE_JD_ENDPOINT: &str = "/api/delete-jd";
const VIEW_JD_ENDPOINT: &str = "/api/view-jd";
const ANALYZE_RESUME_ENDPOINT: &str = "/api/analyze-resume";
const SEND_RESULTS_ENDPOINT: &str = "/api/send-results";
const BULK_ANALYZE_ENDPOINT: &str = "/api/bulk-analyze-resumes";
const MISSING_SKILLS_ENDPOINT: &str = "/api/analyze-missing-skills";

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create new service client. A zero timeout leaves requests unbounded.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if timeout_seconds > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(timeout_seconds));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Multipart part carrying a staged file's bytes
    async fn file_part(&self, file: &StagedFile) -> Result<Part, ClientError> {
        let content = tokio::fs::read(&file.path).await.map_err(|e| {
            ClientError::validation(format!(
                "Failed to read file {}: {}",
                file.path.display(),
                e
            ))
        })?;

        Part::bytes(content)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ClientError::validation(format!("Invalid content type for {}: {}", file.name, e)))
    }

    async fn finish(&self, url: &str, sent: reqwest::Result<reqwest::Response>) -> Result<HttpReply, ClientError> {
        let response = sent.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        trace!("Response status from {}: {}", url, status);

        let body = response.text().await.map_err(ClientError::from)?;
        if !status.is_success() {
            error!("Service error response from {}: {} {}", url, status, body);
        }

        Ok(HttpReply::new(status.as_u16(), body))
    }
}

#[async_trait]
impl MatchingBackend for ServiceClient {
    async fn list_jds(&self) -> Result<HttpReply, ClientError> {
        let url = self.url(JDS_ENDPOINT);
        trace!("Fetching job descriptions: {}", url);
        let sent = self.client.get(&url).send().await;
        self.finish(&url, sent).await
    }

    async fn upload_jd(&self, jd: &StagedFile) -> Result<HttpReply, ClientError> {
        let url = self.url(UPLOAD_JD_ENDPOINT);
        let form = Form::new().part("jd", self.file_part(jd).await?);

        info!("Uploading job description {} to {}", jd.name, url);
        let sent = self.client.post(&url).multipart(form).send().await;
        self.finish(&url, sent).await
    }

    async fn delete_jd(&self, id: &str) -> Result<HttpReply, ClientError> {
        let url = format!("{}/{}", self.url(DELETE_JD_ENDPOINT), id);
        info!("Deleting job description: {}", id);
        let sent = self.client.delete(&url).send().await;
        self.finish(&url, sent).await
    }

    fn view_jd_url(&self, id: &str) -> String {
        format!("{}/{}", self.url(VIEW_JD_ENDPOINT), id)
    }

    async fn analyze_resume(&self, resume: &StagedFile) -> Result<HttpReply, ClientError> {
        let url = self.url(ANALYZE_RESUME_ENDPOINT);
        let form = Form::new().part("resume", self.file_part(resume).await?);

        info!("Calling resume analysis service: {}", url);
        let sent = self.client.post(&url).multipart(form).send().await;
        self.finish(&url, sent).await
    }

    async fn send_results(
        &self,
        email: &str,
        job_matches: &[JobMatch],
    ) -> Result<HttpReply, ClientError> {
        let url = self.url(SEND_RESULTS_ENDPOINT);
        let payload = SendResultsRequest { email, job_matches };

        info!("Sending {} job matches by email", job_matches.len());
        let sent = self.client.post(&url).json(&payload).send().await;
        self.finish(&url, sent).await
    }

    async fn bulk_analyze(
        &self,
        jd: &StagedFile,
        resumes: &[StagedFile],
    ) -> Result<HttpReply, ClientError> {
        let url = self.url(BULK_ANALYZE_ENDPOINT);
        let mut form = Form::new().part("jd", self.file_part(jd).await?);
        for resume in resumes {
            form = form.part("resumes", self.file_part(resume).await?);
        }

        info!(
            "Calling bulk analysis service: {} ({} resumes against {})",
            url,
            resumes.len(),
            jd.name
        );
        let sent = self.client.post(&url).multipart(form).send().await;
        self.finish(&url, sent).await
    }

    async fn analyze_missing_skills(
        &self,
        resume: &StagedFile,
        job_description: &str,
    ) -> Result<HttpReply, ClientError> {
        let url = self.url(MISSING_SKILLS_ENDPOINT);
        let form = Form::new()
            .part("resume", self.file_part(resume).await?)
            .text("job_description", job_description.to_string());

        info!("Calling missing skills analysis: {}", url);
        let sent = self.client.post(&url).multipart(form).send().await;
        self.finish(&url, sent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_joined_without_double_slash() {
        let client = ServiceClient::new("http://localhost:5000/", 0).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.view_jd_url("abc-123"),
            "http://localhost:5000/api/view-jd/abc-123"
        );
    }

    #[tokio::test]
    async fn test_unreadable_file_is_reported_before_sending() {
        let client = ServiceClient::new("http://127.0.0.1:9", 1).unwrap();
        let missing = StagedFile::new("/nonexistent/dir/resume.pdf", 10, "application/pdf");

        let err = client.analyze_resume(&missing).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
