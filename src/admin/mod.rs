// src/admin/mod.rs
//! Admin view: the stored job-description corpus

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::core::{HttpReply, MatchingBackend};
use crate::error::ClientError;
use crate::types::{DuplicateJdBody, ErrorBody, JdRecord};
use crate::upload::{SelectOutcome, StagedFile, UploadSet};
use crate::utils::matches_query;

pub const DEFAULT_PAGE_SIZE: usize = 6;

/// One file of a batch that did not make it into the corpus
#[derive(Debug, Clone, PartialEq)]
pub struct UploadIssue {
    pub file_name: String,
    pub error: ClientError,
}

impl UploadIssue {
    pub fn message(&self) -> String {
        match &self.error {
            ClientError::Conflict { .. } => self.error.to_string(),
            ClientError::Network(_) => format!(
                "Network error while uploading \"{}\". Please check your connection.",
                self.file_name
            ),
            other => format!("Failed to upload \"{}\": {}", self.file_name, other),
        }
    }
}

/// Outcome of a whole batch, reported once at the end
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub uploaded: Vec<JdRecord>,
    pub issues: Vec<UploadIssue>,
    pub finished_at: DateTime<Utc>,
}

impl UploadReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// The combined message shown after the batch, if anything went wrong
    pub fn summary(&self) -> Option<String> {
        if self.issues.is_empty() {
            return None;
        }
        let lines: Vec<String> = self.issues.iter().map(UploadIssue::message).collect();
        Some(format!("Upload process finished.\n\n- {}", lines.join("\n- ")))
    }
}

#[derive(Debug, Clone)]
pub struct AdminState {
    jds: Vec<JdRecord>,
    loaded: bool,
    loading: bool,
    error: Option<String>,
    staged: UploadSet,
    uploading: bool,
    pending_delete: Option<String>,
    deleting: Option<String>,
    viewing: Option<String>,
    search: String,
    page: usize,
    page_size: usize,
}

impl Default for AdminState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl AdminState {
    pub fn new(page_size: usize) -> Self {
        Self {
            jds: Vec::new(),
            loaded: false,
            loading: false,
            error: None,
            staged: UploadSet::default(),
            uploading: false,
            pending_delete: None,
            deleting: None,
            viewing: None,
            search: String::new(),
            page: 0,
            page_size: page_size.max(1),
        }
    }

    // ===== Listing =====

    /// Fetch the corpus. Skipped once the local list holds anything, since
    /// uploads and deletes keep it current from then on.
    pub async fn load(&mut self, backend: &dyn MatchingBackend) {
        if !self.jds.is_empty() {
            return;
        }

        self.loading = true;
        self.error = None;

        let outcome = match backend.list_jds().await {
            Ok(reply) if reply.is_success() => reply.json::<Vec<JdRecord>>(),
            Ok(reply) => Err(reply.server_error(|_| "Failed to fetch job descriptions.".to_string())),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(jds) => {
                info!("Loaded {} job descriptions", jds.len());
                self.jds = jds;
                self.loaded = true;
            }
            Err(err) => {
                error!("Failed to list job descriptions: {}", err);
                self.error = Some(err.to_string());
            }
        }

        self.loading = false;
    }

    pub fn jds(&self) -> &[JdRecord] {
        &self.jds
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // ===== Upload =====

    pub fn select_files(&mut self, files: Vec<StagedFile>) -> SelectOutcome {
        let outcome = self.staged.select_files(files);
        self.error = outcome.warning.clone();
        outcome
    }

    pub fn remove_staged(&mut self, name: &str) {
        self.staged.remove_file(name);
    }

    pub fn staged(&self) -> &[StagedFile] {
        self.staged.files()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Upload every staged file, one request at a time
    pub async fn upload(&mut self, backend: &dyn MatchingBackend) -> Option<UploadReport> {
        if self.staged.is_empty() {
            self.error = Some("Please select at least one PDF file to upload.".to_string());
            return None;
        }

        self.uploading = true;
        self.error = None;

        let files = self.staged.take();
        let mut uploaded = Vec::new();
        let mut issues = Vec::new();

        for file in files {
            match Self::upload_one(backend, &file).await {
                Ok(record) => {
                    info!("Uploaded {} as {}", file.name, record.id);
                    uploaded.push(record);
                }
                Err(err) => {
                    warn!("Upload of {} failed: {}", file.name, err);
                    issues.push(UploadIssue {
                        file_name: file.name,
                        error: err,
                    });
                }
            }
        }

        if !uploaded.is_empty() {
            let mut jds = uploaded.clone();
            jds.append(&mut self.jds);
            self.jds = jds;
        }

        let report = UploadReport {
            uploaded,
            issues,
            finished_at: Utc::now(),
        };
        self.error = report.summary();
        self.staged.reset();
        self.uploading = false;

        Some(report)
    }

    async fn upload_one(
        backend: &dyn MatchingBackend,
        file: &StagedFile,
    ) -> Result<JdRecord, ClientError> {
        let reply = backend.upload_jd(file).await?;

        if reply.status == 409 {
            return Err(ClientError::Conflict {
                file_name: file.name.clone(),
                existing: existing_file_name(&reply),
            });
        }

        if !reply.is_success() {
            let message = match serde_json::from_str::<ErrorBody>(&reply.body) {
                Ok(body) => body
                    .error
                    .unwrap_or_else(|| "Unknown server error".to_string()),
                Err(_) => format!("Server error {}", reply.status),
            };
            return Err(ClientError::Server {
                status: reply.status,
                message,
            });
        }

        reply.json()
    }

    // ===== Delete =====

    /// Ask for confirmation before deleting `id`
    pub fn request_delete(&mut self, id: &str) {
        self.pending_delete = Some(id.to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Delete the JD awaiting confirmation, if any
    pub async fn confirm_delete(&mut self, backend: &dyn MatchingBackend) {
        if let Some(id) = self.pending_delete.take() {
            self.delete(backend, &id).await;
        }
    }

    /// Remove `id` locally once the server has confirmed the deletion
    pub async fn delete(&mut self, backend: &dyn MatchingBackend, id: &str) {
        self.deleting = Some(id.to_string());
        self.error = None;

        let outcome = match backend.delete_jd(id).await {
            Ok(reply) if reply.is_success() => Ok(()),
            Ok(reply) => Err(reply.server_error(|_| "Failed to delete JD.".to_string())),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => {
                info!("Deleted job description {}", id);
                self.jds.retain(|jd| jd.id != id);
                if self.viewing.as_deref() == Some(id) {
                    self.viewing = None;
                }
                self.clamp_page();
            }
            Err(err) => {
                error!("Failed to delete job description {}: {}", id, err);
                self.error = Some(err.to_string());
            }
        }

        self.deleting = None;
        self.pending_delete = None;
    }

    pub fn deleting(&self) -> Option<&str> {
        self.deleting.as_deref()
    }

    // ===== Viewing =====

    pub fn view(&mut self, id: &str) -> Option<&JdRecord> {
        let record = self.jds.iter().find(|jd| jd.id == id)?;
        self.viewing = Some(record.id.clone());
        Some(record)
    }

    pub fn close_view(&mut self) {
        self.viewing = None;
    }

    pub fn viewing(&self) -> Option<&JdRecord> {
        let id = self.viewing.as_deref()?;
        self.jds.iter().find(|jd| jd.id == id)
    }

    pub fn view_url(&self, backend: &dyn MatchingBackend, id: &str) -> String {
        backend.view_jd_url(id)
    }

    // ===== Search and pagination =====

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 0;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filtered(&self) -> Vec<&JdRecord> {
        self.jds
            .iter()
            .filter(|jd| matches_query(jd.file_name(), &self.search))
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn current_page(&self) -> Vec<&JdRecord> {
        self.filtered()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        let last = self.total_pages().saturating_sub(1);
        if self.page > last {
            self.page = last;
        }
    }

    // ===== Errors =====

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

fn existing_file_name(reply: &HttpReply) -> String {
    serde_json::from_str::<DuplicateJdBody>(&reply.body)
        .ok()
        .and_then(|body| body.existing_jd)
        .and_then(|existing| existing.file_name)
        .unwrap_or_else(|| "an existing file".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::testing::FakeBackend;
    use crate::utils::{content_type_for, PDF_MIME};
    use serde_json::json;

    fn pdf(name: &str) -> StagedFile {
        StagedFile::new(name, 1024, PDF_MIME)
    }

    fn record(id: &str, name: &str) -> serde_json::Value {
        json!({"id": id, "payload": {"file_name": name, "full_text": format!("Full text of {}", name)}})
    }

    fn listing(count: usize) -> HttpReply {
        let items: Vec<serde_json::Value> = (0..count)
            .map(|i| record(&format!("id{}", i), &format!("jd_{}.pdf", i)))
            .collect();
        HttpReply::json_body(200, json!(items))
    }

    async fn loaded(count: usize) -> (FakeBackend, AdminState) {
        let backend = FakeBackend::new().reply("list_jds", listing(count));
        let mut state = AdminState::default();
        state.load(&backend).await;
        (backend, state)
    }

    #[tokio::test]
    async fn test_load_fetches_only_while_empty() {
        let (backend, mut state) = loaded(2).await;
        assert_eq!(state.jds().len(), 2);
        assert!(state.is_loaded());

        state.load(&backend).await;
        assert_eq!(backend.call_count("list_jds"), 1);
    }

    #[tokio::test]
    async fn test_load_failure_uses_fallback() {
        let backend = FakeBackend::new().reply("list_jds", HttpReply::new(500, "boom"));
        let mut state = AdminState::default();

        state.load(&backend).await;

        assert_eq!(state.error(), Some("Failed to fetch job descriptions."));
        assert!(!state.is_loading());
        assert!(state.jds().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_is_reported_and_not_added() {
        let (_, mut state) = loaded(1).await;
        let backend = FakeBackend::new()
            .reply(
                "upload_jd",
                HttpReply::json_body(
                    409,
                    json!({
                        "message": "Duplicate job description detected",
                        "existing_jd": {"id": "id0", "file_name": "jd_old.pdf", "similarity_score": 0.99}
                    }),
                ),
            )
            .reply(
                "upload_jd",
                HttpReply::json_body(201, json!({"id": "new1", "payload": {"file_name": "jd_b.pdf", "full_text": "x"}, "status": "created"})),
            );
        state.select_files(vec![pdf("jd_a.pdf"), pdf("jd_b.pdf")]);

        let report = state.upload(&backend).await.unwrap();

        assert_eq!(backend.calls(), vec!["upload_jd jd_a.pdf", "upload_jd jd_b.pdf"]);
        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(state.jds().len(), 2);
        assert_eq!(state.jds()[0].id, "new1");

        let summary = state.error().unwrap();
        assert!(summary.starts_with("Upload process finished.\n\n- "));
        assert!(summary.contains("\"jd_a.pdf\" was not uploaded because it is a duplicate of \"jd_old.pdf\"."));
        assert!(state.staged().is_empty());
        assert!(!state.is_uploading());
    }

    #[tokio::test]
    async fn test_every_failure_kind_is_collected() {
        let backend = FakeBackend::new()
            .reply("upload_jd", HttpReply::json_body(409, json!({})))
            .reply("upload_jd", HttpReply::json_body(500, json!({"error": "embedding failed"})))
            .reply("upload_jd", HttpReply::new(502, "<html>"))
            .fail("upload_jd", ClientError::network("refused"))
            .reply("upload_jd", HttpReply::json_body(201, record("ok", "e.pdf")));
        let mut state = AdminState::default();
        state.select_files(vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf"), pdf("d.pdf"), pdf("e.pdf")]);

        let report = state.upload(&backend).await.unwrap();

        let messages: Vec<String> = report.issues.iter().map(UploadIssue::message).collect();
        assert_eq!(
            messages,
            vec![
                "\"a.pdf\" was not uploaded because it is a duplicate of \"an existing file\".",
                "Failed to upload \"b.pdf\": embedding failed",
                "Failed to upload \"c.pdf\": Server error 502",
                "Network error while uploading \"d.pdf\". Please check your connection.",
            ]
        );
        assert_eq!(state.jds().len(), 1);
        assert_eq!(
            state.error().unwrap(),
            format!("Upload process finished.\n\n- {}", messages.join("\n- "))
        );
    }

    #[tokio::test]
    async fn test_new_uploads_are_prepended_in_order() {
        let (_, mut state) = loaded(1).await;
        let backend = FakeBackend::new()
            .reply("upload_jd", HttpReply::json_body(201, record("n1", "x.pdf")))
            .reply("upload_jd", HttpReply::json_body(201, record("n2", "y.pdf")));
        state.select_files(vec![pdf("x.pdf"), pdf("y.pdf")]);

        let report = state.upload(&backend).await.unwrap();

        let ids: Vec<&str> = state.jds().iter().map(|jd| jd.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2", "id0"]);
        assert!(!report.has_issues());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let backend = FakeBackend::new();
        let mut state = AdminState::default();

        assert!(state.upload(&backend).await.is_none());
        assert_eq!(
            state.error(),
            Some("Please select at least one PDF file to upload.")
        );
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_select_warns_on_non_pdf() {
        let mut state = AdminState::default();
        let outcome = state.select_files(vec![
            pdf("a.pdf"),
            StagedFile::new("b.docx", 10, content_type_for("b.docx")),
        ]);
        assert_eq!(outcome.added, vec!["a.pdf"]);
        assert_eq!(state.error(), Some("Some files were not PDFs and were ignored."));

        state.select_files(vec![pdf("c.pdf")]);
        assert_eq!(state.error(), None);
        assert_eq!(state.staged().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_waits_for_confirmation_from_server() {
        let (_, mut state) = loaded(2).await;
        let backend = FakeBackend::new()
            .reply("delete_jd", HttpReply::json_body(500, json!({"error": "locked"})))
            .reply("delete_jd", HttpReply::new(204, ""));

        state.request_delete("id0");
        state.confirm_delete(&backend).await;
        assert_eq!(state.jds().len(), 2);
        assert_eq!(state.error(), Some("locked"));
        assert!(state.pending_delete().is_none());

        state.dismiss_error();
        state.delete(&backend, "id0").await;
        assert_eq!(state.jds().len(), 1);
        assert_eq!(state.jds()[0].id, "id1");
        assert!(state.deleting().is_none());
    }

    #[tokio::test]
    async fn test_delete_fallback_message() {
        let (_, mut state) = loaded(1).await;
        let backend = FakeBackend::new().reply("delete_jd", HttpReply::new(500, "oops"));

        state.delete(&backend, "id0").await;

        assert_eq!(state.error(), Some("Failed to delete JD."));
        assert_eq!(state.jds().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_delete_sends_nothing() {
        let (backend, mut state) = loaded(1).await;
        state.request_delete("id0");
        state.cancel_delete();
        state.confirm_delete(&backend).await;
        assert_eq!(backend.call_count("delete_jd"), 0);
    }

    #[tokio::test]
    async fn test_search_and_pagination() {
        let (_, mut state) = loaded(14).await;
        assert_eq!(state.total_pages(), 3);
        assert_eq!(state.current_page().len(), 6);

        state.next_page();
        state.next_page();
        state.next_page();
        assert_eq!(state.page(), 2);
        assert_eq!(state.current_page().len(), 2);

        state.set_search("JD_1");
        assert_eq!(state.page(), 0);
        // jd_1, jd_10 .. jd_13
        assert_eq!(state.filtered().len(), 5);
        assert_eq!(state.total_pages(), 1);

        state.prev_page();
        assert_eq!(state.page(), 0);
    }

    #[tokio::test]
    async fn test_view_and_url() {
        let (backend, mut state) = loaded(2).await;

        let viewed = state.view("id1").unwrap();
        assert_eq!(viewed.payload.full_text, "Full text of jd_1.pdf");
        assert_eq!(state.viewing().unwrap().id, "id1");
        assert!(state.view("missing").is_none());

        assert_eq!(state.view_url(&backend, "id1"), "http://fake/api/view-jd/id1");
        state.close_view();
        assert!(state.viewing().is_none());
    }
}
