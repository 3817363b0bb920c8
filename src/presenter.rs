// src/presenter.rs
//! Derived views over server-computed matches. Nothing here mutates the
//! underlying lists.

use std::collections::HashSet;
use std::str::FromStr;

use crate::types::{CandidateMatch, JobMatch, SectionScores};
use crate::utils::matches_query;

/// Anything carrying an overall score and a breakdown
pub trait Scored {
    fn score(&self) -> f64;
    fn breakdown(&self) -> &SectionScores;
}

impl Scored for JobMatch {
    fn score(&self) -> f64 {
        self.score
    }

    fn breakdown(&self) -> &SectionScores {
        &self.scores_breakdown
    }
}

impl Scored for CandidateMatch {
    fn score(&self) -> f64 {
        self.score
    }

    fn breakdown(&self) -> &SectionScores {
        &self.scores_breakdown
    }
}

// ===== Threshold =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPreset {
    pub label: &'static str,
    pub value: f64,
}

pub const THRESHOLD_PRESETS: [ThresholdPreset; 4] = [
    ThresholdPreset { label: "All", value: 0.0 },
    ThresholdPreset { label: "Fair+", value: 0.4 },
    ThresholdPreset { label: "Good+", value: 0.6 },
    ThresholdPreset { label: "Excellent", value: 0.8 },
];

/// Clamp a user-provided threshold into [0,1]; NaN becomes 0
pub fn clamp_threshold(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Items with `score >= threshold`, in their original order
pub fn filter_by_threshold<T: Scored>(items: &[T], threshold: f64) -> Vec<&T> {
    items.iter().filter(|i| i.score() >= threshold).collect()
}

// ===== Sorting =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Score,
    Skills,
    Experience,
    Education,
}

impl SortKey {
    pub fn value_of<T: Scored>(&self, item: &T) -> f64 {
        match self {
            SortKey::Score => item.score(),
            SortKey::Skills => item.breakdown().skills,
            SortKey::Experience => item.breakdown().experience,
            SortKey::Education => item.breakdown().education,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Score => "Overall",
            SortKey::Skills => "Skills",
            SortKey::Experience => "Experience",
            SortKey::Education => "Education",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "score" | "overall" => Ok(SortKey::Score),
            "skills" => Ok(SortKey::Skills),
            "experience" => Ok(SortKey::Experience),
            "education" => Ok(SortKey::Education),
            other => Err(format!(
                "Unknown sort key: {}. Use score, skills, experience or education",
                other
            )),
        }
    }
}

/// Descending by `key`; ties keep their original relative order
pub fn sort_by_key<'a, T: Scored>(items: Vec<&'a T>, key: SortKey) -> Vec<&'a T> {
    let mut items = items;
    items.sort_by(|a, b| key.value_of(*b).total_cmp(&key.value_of(*a)));
    items
}

/// The ranked list the bulk view shows: name search, then stable sort
pub fn rank_candidates<'a>(
    matches: &'a [CandidateMatch],
    query: &str,
    key: SortKey,
) -> Vec<&'a CandidateMatch> {
    let filtered = matches
        .iter()
        .filter(|c| matches_query(c.file_name(), query))
        .collect();
    sort_by_key(filtered, key)
}

// ===== Match quality =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl MatchQuality {
    pub fn for_score(score: f64) -> Self {
        if score >= 0.8 {
            MatchQuality::Excellent
        } else if score >= 0.6 {
            MatchQuality::Good
        } else if score >= 0.4 {
            MatchQuality::Fair
        } else {
            MatchQuality::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchQuality::Excellent => "Excellent Match",
            MatchQuality::Good => "Good Match",
            MatchQuality::Fair => "Fair Match",
            MatchQuality::Poor => "Poor Match",
        }
    }
}

// ===== Expansion =====

/// At most one expanded item at a time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    expanded: Option<String>,
}

impl Expansion {
    /// Expands `id`, or collapses it if it is already the expanded one
    pub fn toggle(&mut self, id: &str) {
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.as_deref() == Some(id)
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }
}

/// Open/closed state of each job's missing-skills section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillDisclosure {
    open: HashSet<String>,
}

impl SkillDisclosure {
    /// Whether the section exists at all for this job
    pub fn is_visible(job: &JobMatch) -> bool {
        !job.missing_skills().is_empty()
    }

    pub fn toggle(&mut self, job_id: &str) {
        if !self.open.remove(job_id) {
            self.open.insert(job_id.to_string());
        }
    }

    pub fn is_open(&self, job_id: &str) -> bool {
        self.open.contains(job_id)
    }

    pub fn clear(&mut self) {
        self.open.clear();
    }
}
