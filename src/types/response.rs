use serde::{Deserialize, Serialize};

use crate::types::matches::{CandidateProfile, JobMatch, MissingSkill};

// ===== Service Response Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResumeResponse {
    pub candidate_profile: CandidateProfile,
    #[serde(default)]
    pub job_matches: Vec<JobMatch>,
    #[serde(default)]
    pub missing_skills_summary: Option<Vec<MissingSkill>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResultsRequest<'a> {
    pub email: &'a str,
    pub job_matches: &'a [JobMatch],
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendResultsResponse {
    #[serde(default)]
    pub email_sent: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingSkillsReport {
    #[serde(default)]
    pub resume_skills: String,
    #[serde(default)]
    pub job_skills: String,
    #[serde(default)]
    pub missing_skills: Vec<MissingSkill>,
    #[serde(default)]
    pub skill_match_percentage: f64,
    #[serde(default)]
    pub total_required_skills: usize,
    #[serde(default)]
    pub missing_skills_count: usize,
    #[serde(default)]
    pub matched_skills_count: usize,
}

/// `{ "error": "..." }` body returned on failures
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExistingJd {
    pub id: Option<String>,
    pub file_name: Option<String>,
    pub similarity_score: Option<f64>,
}

/// Body of the 409 returned by the JD upload endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DuplicateJdBody {
    pub message: Option<String>,
    pub existing_jd: Option<ExistingJd>,
}
