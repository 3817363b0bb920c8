// src/types/mod.rs
pub mod matches;
pub mod response;

pub use matches::{
    assign_missing_ids, BulkAnalysisResult, CandidateMatch, CandidatePayload, CandidateProfile,
    JdPayload, JdRecord, JobDescriptionPayload, JobMatch, JobPayload, MissingSkill, SectionScores,
    SectionWeights,
};
pub use response::{
    AnalyzeResumeResponse, DuplicateJdBody, ErrorBody, MissingSkillsReport, SendResultsRequest,
    SendResultsResponse,
};
