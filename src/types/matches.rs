// src/types/matches.rs
//! Match data as produced by the analysis service

use serde::{Deserialize, Deserializer, Serialize};

// ===== Profiles =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, deserialize_with = "deserialize_section")]
    pub skills: String,
    #[serde(default, deserialize_with = "deserialize_section")]
    pub experience: String,
    #[serde(default, deserialize_with = "deserialize_section")]
    pub education: String,
}

impl CandidateProfile {
    pub fn is_empty(&self) -> bool {
        self.skills.trim().is_empty()
            && self.experience.trim().is_empty()
            && self.education.trim().is_empty()
    }

    /// Comma-separated skills, trimmed, empties dropped
    pub fn skill_tokens(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// The extractor may hand back a section as text, a list or a nested object.
/// Everything is flattened to one line of text.
fn deserialize_section<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(flatten_value(&value))
}

fn flatten_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(flatten_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(map) => map
            .values()
            .map(flatten_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

// ===== Scores =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScores {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

/// Section weights applied by the scorer. A section the job description
/// lacks is left out and its weight folded into skills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionWeights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSkill {
    pub skill: String,
    #[serde(default)]
    pub importance: String,
    #[serde(default)]
    pub category: String,
}

// ===== Candidate view =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    /// Not always sent; see [`assign_missing_ids`]
    #[serde(default)]
    pub id: String,
    pub score: f64,
    pub payload: JobPayload,
    pub scores_breakdown: SectionScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights_used: Option<SectionWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_skills: Option<Vec<MissingSkill>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_skills: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_skills: Option<String>,
}

impl JobMatch {
    pub fn missing_skills(&self) -> &[MissingSkill] {
        self.missing_skills.as_deref().unwrap_or(&[])
    }
}

/// Give every match without an id a positional one (`job-1`, `job-2`, ...)
/// so expansion and skill disclosure stay per job
pub fn assign_missing_ids(matches: &mut [JobMatch]) {
    for (index, job) in matches.iter_mut().enumerate() {
        if job.id.trim().is_empty() {
            job.id = format!("job-{}", index + 1);
        }
    }
}

// ===== Bulk view =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePayload {
    pub file_name: String,
    #[serde(default)]
    pub extracted_profile: CandidateProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub score: f64,
    pub payload: CandidatePayload,
    pub scores_breakdown: SectionScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights_used: Option<SectionWeights>,
}

impl CandidateMatch {
    pub fn file_name(&self) -> &str {
        &self.payload.file_name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionPayload {
    pub file_name: String,
    #[serde(default)]
    pub extracted_data: CandidateProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAnalysisResult {
    pub job_description_payload: JobDescriptionPayload,
    #[serde(default)]
    pub candidate_matches: Vec<CandidateMatch>,
}

// ===== Admin view =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JdPayload {
    pub file_name: String,
    #[serde(default)]
    pub full_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JdRecord {
    pub id: String,
    pub payload: JdPayload,
}

impl JdRecord {
    pub fn file_name(&self) -> &str {
        &self.payload.file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalyzeResumeResponse;

    #[test]
    fn test_profile_accepts_lists_and_objects() {
        let profile: CandidateProfile = serde_json::from_value(serde_json::json!({
            "skills": ["Rust", "Python", ""],
            "experience": {"years": 5, "role": "Engineer"},
            "education": null
        }))
        .unwrap();

        assert_eq!(profile.skills, "Rust, Python");
        assert!(profile.experience.contains("Engineer"));
        assert!(profile.experience.contains('5'));
        assert_eq!(profile.education, "");
    }

    #[test]
    fn test_skill_tokens_trims_and_drops_empty() {
        let profile = CandidateProfile {
            skills: " Rust , ,SQL,Docker ".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.skill_tokens(), vec!["Rust", "SQL", "Docker"]);
    }

    #[test]
    fn test_job_match_without_optional_fields() {
        let job: JobMatch = serde_json::from_value(serde_json::json!({
            "id": "j1",
            "score": 0.72,
            "payload": {"title": "Backend Engineer"},
            "scores_breakdown": {"skills": 0.8, "experience": 0.7, "education": 0.5}
        }))
        .unwrap();

        assert!(job.missing_skills().is_empty());
        assert_eq!(job.payload.description, "");
        assert!(job.weights_used.is_none());
    }

    fn scored_job(title: &str, score: f64, weights: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "score": score,
            "payload": {"title": title, "description": "Full JD text"},
            "scores_breakdown": {"skills": 0.9, "experience": 0.0, "education": 0.0},
            "weights_used": weights,
            "missing_skills": [{"skill": "Kafka", "importance": "high", "category": "tools"}],
            "job_skills": "Rust, Kafka",
            "resume_skills": "Rust"
        })
    }

    #[test]
    fn test_analysis_reply_without_job_ids() {
        let response: AnalyzeResumeResponse = serde_json::from_value(serde_json::json!({
            "candidate_profile": {"skills": "Rust", "experience": "3 years", "education": "BSc"},
            "job_matches": [
                scored_job("Backend Engineer", 0.84, serde_json::json!({"skills": 0.9, "experience": 0.1})),
                scored_job("SRE", 0.71, serde_json::json!({"skills": 1.0}))
            ],
            "missing_skills_summary": [{"skill": "Kafka", "importance": "high", "category": "tools"}]
        }))
        .unwrap();

        let mut matches = response.job_matches;
        assert!(matches.iter().all(|job| job.id.is_empty()));

        assign_missing_ids(&mut matches);
        assert_eq!(matches[0].id, "job-1");
        assert_eq!(matches[1].id, "job-2");
        assert_eq!(matches[0].missing_skills().len(), 1);
    }

    #[test]
    fn test_existing_ids_are_kept() {
        let mut matches: Vec<JobMatch> = serde_json::from_value(serde_json::json!([
            {"id": "a", "score": 0.5, "payload": {"title": "A"},
             "scores_breakdown": {"skills": 0.5, "experience": 0.5, "education": 0.5}},
            {"score": 0.4, "payload": {"title": "B"},
             "scores_breakdown": {"skills": 0.4, "experience": 0.4, "education": 0.4}}
        ]))
        .unwrap();

        assign_missing_ids(&mut matches);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[1].id, "job-2");
    }

    #[test]
    fn test_partial_weights_are_accepted() {
        let job: JobMatch = serde_json::from_value(scored_job(
            "Backend Engineer",
            0.84,
            serde_json::json!({"skills": 0.9, "experience": 0.1}),
        ))
        .unwrap();

        let weights = job.weights_used.unwrap();
        assert_eq!(weights.skills, Some(0.9));
        assert_eq!(weights.experience, Some(0.1));
        assert_eq!(weights.education, None);

        let round = serde_json::to_value(weights).unwrap();
        assert_eq!(round, serde_json::json!({"skills": 0.9, "experience": 0.1}));
    }

    #[test]
    fn test_empty_hits_reply() {
        let response: AnalyzeResumeResponse = serde_json::from_value(serde_json::json!({
            "candidate_profile": {"skills": ["Rust"], "experience": "", "education": ""},
            "job_matches": []
        }))
        .unwrap();

        assert!(response.job_matches.is_empty());
        assert!(response.missing_skills_summary.is_none());
        assert_eq!(response.candidate_profile.skills, "Rust");
    }

    #[test]
    fn test_bulk_result_with_skills_only_weights() {
        let result: BulkAnalysisResult = serde_json::from_value(serde_json::json!({
            "job_description_payload": {
                "file_name": "jd.pdf",
                "extracted_data": {"skills": "Rust", "experience": "", "education": ""}
            },
            "candidate_matches": [{
                "score": 0.77,
                "payload": {
                    "file_name": "alice.pdf",
                    "extracted_profile": {"skills": "Rust", "experience": "4 years", "education": "MSc"}
                },
                "scores_breakdown": {"skills": 0.77, "experience": 0.0, "education": 0.0},
                "weights_used": {"skills": 1.0}
            }]
        }))
        .unwrap();

        let candidate = &result.candidate_matches[0];
        assert_eq!(candidate.file_name(), "alice.pdf");
        assert_eq!(
            candidate.weights_used,
            Some(SectionWeights {
                skills: Some(1.0),
                ..Default::default()
            })
        );
    }
}
