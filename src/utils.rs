use anyhow::{Context, Result};
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";

/// MIME type derived from the file name, the way a browser file picker reports it
pub fn content_type_for(filename: &str) -> &'static str {
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

/// Cheap address check: anything with an `@` is accepted
pub fn is_plausible_email(email: &str) -> bool {
    !email.trim().is_empty() && email.contains('@')
}

/// Score in [0,1] rendered as a percentage with the given precision
pub fn format_percent(score: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, score * 100.0)
}

/// Case-insensitive substring match used by every local search box
pub fn matches_query(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Read a text file, naming the path on failure
pub async fn read_file_content(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Write a file, creating missing parent directories
pub async fn write_file_content(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
