// src/upload.rs
//! Staging of PDF files before they are submitted

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::utils::{content_type_for, PDF_MIME};

/// A local file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub path: PathBuf,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            size,
            mime_type: mime_type.into(),
        }
    }

    /// Stat a file on disk and derive its MIME type from the extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        if !metadata.is_file() {
            anyhow::bail!("Not a regular file: {}", path.display());
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", path.display()))?
            .to_string();

        Ok(Self {
            mime_type: content_type_for(&name).to_string(),
            size: metadata.len(),
            path: path.to_path_buf(),
            name,
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME
    }

    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

/// What a batch selection did to the set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOutcome {
    pub added: Vec<String>,
    pub rejected: Vec<String>,
    pub duplicates: Vec<String>,
    pub warning: Option<String>,
}

/// Ordered set of staged files, unique by name
#[derive(Debug, Clone)]
pub struct UploadSet {
    files: Vec<StagedFile>,
    warning: Option<String>,
    rejection_message: &'static str,
}

impl Default for UploadSet {
    fn default() -> Self {
        Self::new("Some files were not PDFs and were ignored.")
    }
}

impl UploadSet {
    /// `rejection_message` is surfaced whenever a batch contains a non-PDF
    pub fn new(rejection_message: &'static str) -> Self {
        Self {
            files: Vec::new(),
            warning: None,
            rejection_message,
        }
    }

    /// Add the PDF subset of `candidates`, skipping names already staged.
    /// Non-PDFs are reported through the warning, never as an error.
    pub fn select_files(&mut self, candidates: Vec<StagedFile>) -> SelectOutcome {
        let mut outcome = SelectOutcome::default();

        for file in candidates {
            if !file.is_pdf() {
                debug!("Rejected non-PDF file: {} ({})", file.name, file.mime_type);
                outcome.rejected.push(file.name);
                continue;
            }

            if self.contains(&file.name) {
                outcome.duplicates.push(file.name);
                continue;
            }

            outcome.added.push(file.name.clone());
            self.files.push(file);
        }

        if outcome.rejected.is_empty() {
            self.warning = None;
        } else {
            warn!("{} file(s) rejected: {:?}", outcome.rejected.len(), outcome.rejected);
            self.warning = Some(self.rejection_message.to_string());
        }
        outcome.warning = self.warning.clone();

        outcome
    }

    /// Removes by name; absent names are ignored
    pub fn remove_file(&mut self, name: &str) {
        self.files.retain(|f| f.name != name);
    }

    pub fn reset(&mut self) {
        self.files.clear();
        self.warning = None;
    }

    /// Empties the set and hands the files over, leaving the warning alone
    pub fn take(&mut self) -> Vec<StagedFile> {
        std::mem::take(&mut self.files)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn clear_warning(&mut self) {
        self.warning = None;
    }
}

/// Single-file slot (candidate resume, bulk JD); a new pick replaces the old one
#[derive(Debug, Clone)]
pub struct SingleFileSlot {
    file: Option<StagedFile>,
    rejection_message: &'static str,
}

impl SingleFileSlot {
    pub fn new(rejection_message: &'static str) -> Self {
        Self {
            file: None,
            rejection_message,
        }
    }

    /// Stages `file` if it is a PDF. A rejected pick clears the slot when
    /// `clear_on_reject` is set, matching the JD picker of the bulk view.
    pub fn select(&mut self, file: StagedFile, clear_on_reject: bool) -> Result<(), String> {
        if file.is_pdf() {
            self.file = Some(file);
            Ok(())
        } else {
            if clear_on_reject {
                self.file = None;
            }
            Err(self.rejection_message.to_string())
        }
    }

    pub fn file(&self) -> Option<&StagedFile> {
        self.file.as_ref()
    }

    pub fn clear(&mut self) {
        self.file = None;
    }
}
