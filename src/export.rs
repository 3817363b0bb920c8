// src/export.rs
//! CSV export of the bulk ranking as currently displayed

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::CandidateMatch;
use crate::utils::{format_percent, write_file_content};

pub const CSV_HEADERS: [&str; 7] = [
    "Rank",
    "Filename",
    "Overall Score (%)",
    "Skills Score (%)",
    "Experience Score (%)",
    "Education Score (%)",
    "Top Skills",
];

const TOP_SKILLS: usize = 5;

pub fn export_file_name(jd_file_name: &str) -> String {
    format!("TalentAlign_Analysis_{}.csv", jd_file_name)
}

/// Up to five skills from the comma-separated profile string, `; `-joined
pub fn top_skills_preview(candidate: &CandidateMatch) -> String {
    candidate
        .payload
        .extracted_profile
        .skill_tokens()
        .into_iter()
        .take(TOP_SKILLS)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Renders `displayed` in order; ranks follow the displayed order
pub fn candidates_to_csv(displayed: &[&CandidateMatch]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;

    for (index, candidate) in displayed.iter().enumerate() {
        let breakdown = &candidate.scores_breakdown;
        writer
            .write_record([
                (index + 1).to_string(),
                candidate.file_name().to_string(),
                format_percent(candidate.score, 1),
                format_percent(breakdown.skills, 1),
                format_percent(breakdown.experience, 1),
                format_percent(breakdown.education, 1),
                top_skills_preview(candidate),
            ])
            .with_context(|| format!("Failed to write CSV row for {}", candidate.file_name()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write the export into `dir` and return its path
pub async fn write_csv(
    dir: &Path,
    jd_file_name: &str,
    displayed: &[&CandidateMatch],
) -> Result<PathBuf> {
    let content = candidates_to_csv(displayed)?;
    let path = dir.join(export_file_name(jd_file_name));
    write_file_content(&path, &content).await?;

    info!("Exported {} candidates to {}", displayed.len(), path.display());
    Ok(path)
}
