// src/bulk/mod.rs
//! Recruiter view: one JD against many resumes

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::core::MatchingBackend;
use crate::error::ClientError;
use crate::export;
use crate::presenter::{rank_candidates, SortKey};
use crate::types::{BulkAnalysisResult, CandidateMatch};
use crate::upload::{SelectOutcome, SingleFileSlot, StagedFile, UploadSet};

const JD_REJECTED: &str = "Job Description must be a PDF file.";
const RESUMES_REJECTED: &str = "All selected resume files must be PDFs.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Processing,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct BulkState {
    jd: SingleFileSlot,
    resumes: UploadSet,
    phase: Phase,
    result: Option<BulkAnalysisResult>,
    error: Option<String>,
    search_query: String,
    sort_key: SortKey,
}

impl Default for BulkState {
    fn default() -> Self {
        Self {
            jd: SingleFileSlot::new(JD_REJECTED),
            resumes: UploadSet::new(RESUMES_REJECTED),
            phase: Phase::Idle,
            result: None,
            error: None,
            search_query: String::new(),
            sort_key: SortKey::Score,
        }
    }
}

impl BulkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rejected pick clears the JD slot
    pub fn select_jd(&mut self, file: StagedFile) {
        match self.jd.select(file, true) {
            Ok(()) => self.error = None,
            Err(message) => self.error = Some(message),
        }
    }

    pub fn select_resumes(&mut self, files: Vec<StagedFile>) -> SelectOutcome {
        let outcome = self.resumes.select_files(files);
        self.error = outcome.warning.clone();
        outcome
    }

    pub fn remove_resume(&mut self, name: &str) {
        self.resumes.remove_file(name);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn jd(&self) -> Option<&StagedFile> {
        self.jd.file()
    }

    pub fn resumes(&self) -> &[StagedFile] {
        self.resumes.files()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<&BulkAnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Candidates filtered by the search query and sorted by the current key
    pub fn displayed(&self) -> Vec<&CandidateMatch> {
        match &self.result {
            Some(result) => {
                rank_candidates(&result.candidate_matches, &self.search_query, self.sort_key)
            }
            None => Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub async fn analyze(&mut self, backend: &dyn MatchingBackend) {
        let jd = match self.jd.file() {
            Some(jd) if !self.resumes.is_empty() => jd.clone(),
            _ => {
                self.error = Some("Please upload one JD and at least one resume.".to_string());
                return;
            }
        };

        self.phase = Phase::Processing;
        self.error = None;
        self.result = None;

        info!(
            "Comparing {} resumes against {}",
            self.resumes.len(),
            jd.name
        );

        match Self::request(backend, &jd, self.resumes.files()).await {
            Ok(result) => {
                info!(
                    "Bulk analysis ranked {} candidates",
                    result.candidate_matches.len()
                );
                self.result = Some(result);
                self.phase = Phase::Done;
            }
            Err(err) => {
                error!("Bulk analysis failed: {}", err);
                self.error = Some(format!("Analysis failed: {}", err));
                self.phase = Phase::Failed;
            }
        }
    }

    async fn request(
        backend: &dyn MatchingBackend,
        jd: &StagedFile,
        resumes: &[StagedFile],
    ) -> Result<BulkAnalysisResult, ClientError> {
        let reply = backend.bulk_analyze(jd, resumes).await?;
        if !reply.is_success() {
            return Err(reply.server_error(|status| format!("Server error: {}", status)));
        }
        reply.json()
    }

    /// Export the displayed ranking as CSV into `dir`
    pub async fn export_csv(&self, dir: &Path) -> Result<PathBuf> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No bulk analysis results to export"))?;
        export::write_csv(dir, &result.job_description_payload.file_name, &self.displayed()).await
    }
}
