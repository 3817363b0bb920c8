// src/candidate/mod.rs
//! Candidate self-service view: one resume in, ranked job matches out

pub mod email;

use std::time::Duration;
use tracing::{debug, error, info};

use crate::core::config_manager::UiConfig;
use crate::core::MatchingBackend;
use crate::error::ClientError;
use crate::presenter::{clamp_threshold, filter_by_threshold, Expansion, SkillDisclosure};
use crate::progress::{ProcessingSteps, StepScheduler};
use crate::types::{
    assign_missing_ids, AnalyzeResumeResponse, CandidateProfile, JobMatch, MissingSkill,
    MissingSkillsReport,
};
use crate::upload::{SingleFileSlot, StagedFile};
use crate::utils::is_plausible_email;

pub use email::{EmailNotice, EmailStatus};

const RESUME_REJECTED: &str = "Please upload a PDF file only.";

/// Where the analysis state machine currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    /// Waiting on the server with the given step active
    AwaitingServer(usize),
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveTab {
    #[default]
    Overview,
    Matches,
}

#[derive(Debug, Clone)]
pub struct CandidateTimings {
    pub step_delays: Vec<Duration>,
    pub final_step_delay: Duration,
    pub toast: Duration,
}

impl Default for CandidateTimings {
    fn default() -> Self {
        Self::from(&UiConfig::default())
    }
}

impl From<&UiConfig> for CandidateTimings {
    fn from(ui: &UiConfig) -> Self {
        Self {
            step_delays: ui.step_delays(),
            final_step_delay: ui.final_step_delay(),
            toast: ui.toast_duration(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidateState {
    timings: CandidateTimings,
    resume: SingleFileSlot,
    user_email: String,
    phase: Phase,
    steps: ProcessingSteps,
    profile: Option<CandidateProfile>,
    matches: Vec<JobMatch>,
    missing_skills_summary: Vec<MissingSkill>,
    skill_gap: Option<MissingSkillsReport>,
    expansion: Expansion,
    skill_disclosure: SkillDisclosure,
    error: Option<String>,
    threshold: f64,
    show_filters: bool,
    active_tab: ActiveTab,
    email_notice: EmailNotice,
    sending_email: bool,
}

impl Default for CandidateState {
    fn default() -> Self {
        Self::new(CandidateTimings::default())
    }
}

impl CandidateState {
    pub fn new(timings: CandidateTimings) -> Self {
        Self {
            resume: SingleFileSlot::new(RESUME_REJECTED),
            user_email: String::new(),
            phase: Phase::Idle,
            steps: ProcessingSteps::default(),
            profile: None,
            matches: Vec::new(),
            missing_skills_summary: Vec::new(),
            skill_gap: None,
            expansion: Expansion::default(),
            skill_disclosure: SkillDisclosure::default(),
            error: None,
            threshold: 0.0,
            show_filters: false,
            active_tab: ActiveTab::Overview,
            email_notice: EmailNotice::new(timings.toast),
            sending_email: false,
            timings,
        }
    }

    // ===== Inputs =====

    pub fn select_resume(&mut self, file: StagedFile) {
        match self.resume.select(file, false) {
            Ok(()) => self.error = None,
            Err(message) => self.error = Some(message),
        }
    }

    pub fn resume(&self) -> Option<&StagedFile> {
        self.resume.file()
    }

    pub fn set_user_email(&mut self, email: impl Into<String>) {
        self.user_email = email.into();
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = clamp_threshold(threshold);
    }

    pub fn toggle_filters(&mut self) {
        self.show_filters = !self.show_filters;
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
    }

    pub fn toggle_job(&mut self, job_id: &str) {
        self.expansion.toggle(job_id);
    }

    pub fn toggle_missing_skills(&mut self, job_id: &str) {
        self.skill_disclosure.toggle(job_id);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ===== Views =====

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, Phase::Uploading | Phase::AwaitingServer(_))
    }

    pub fn steps(&self) -> &ProcessingSteps {
        &self.steps
    }

    pub fn profile(&self) -> Option<&CandidateProfile> {
        self.profile.as_ref()
    }

    pub fn matches(&self) -> &[JobMatch] {
        &self.matches
    }

    /// Matches at or above the current threshold
    pub fn visible_matches(&self) -> Vec<&JobMatch> {
        filter_by_threshold(&self.matches, self.threshold)
    }

    pub fn missing_skills_summary(&self) -> &[MissingSkill] {
        &self.missing_skills_summary
    }

    pub fn skill_gap(&self) -> Option<&MissingSkillsReport> {
        self.skill_gap.as_ref()
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    pub fn skill_disclosure(&self) -> &SkillDisclosure {
        &self.skill_disclosure
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn filters_shown(&self) -> bool {
        self.show_filters
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn email_status(&self) -> EmailStatus {
        self.email_notice.status()
    }

    pub fn email_notice(&self) -> &EmailNotice {
        &self.email_notice
    }

    pub fn is_sending_email(&self) -> bool {
        self.sending_email
    }

    // ===== Operations =====

    /// Back to the initial state; the only way to start over
    pub fn reset(&mut self) {
        *self = Self::new(self.timings.clone());
    }

    pub async fn analyze(&mut self, backend: &dyn MatchingBackend) {
        self.analyze_with(backend, |_| {}).await
    }

    /// Run one analysis, calling `on_step` after every step transition
    pub async fn analyze_with<F>(&mut self, backend: &dyn MatchingBackend, mut on_step: F)
    where
        F: FnMut(&ProcessingSteps),
    {
        let Some(resume) = self.resume.file().cloned() else {
            self.error = Some("Please upload a resume file.".to_string());
            return;
        };

        self.phase = Phase::Uploading;
        self.error = None;
        self.profile = None;
        self.matches.clear();
        self.missing_skills_summary.clear();
        self.expansion.collapse();
        self.skill_disclosure.clear();
        self.active_tab = ActiveTab::Overview;
        self.email_notice.clear();

        self.steps = ProcessingSteps::candidate_analysis();
        self.steps.activate(1);
        self.phase = Phase::AwaitingServer(1);
        on_step(&self.steps);

        info!("Starting resume analysis for {}", resume.name);

        match self.run_analysis(backend, &resume, &mut on_step).await {
            Ok(mut response) => {
                self.steps.complete_all();
                on_step(&self.steps);

                info!(
                    "Resume analysis finished with {} job matches",
                    response.job_matches.len()
                );
                self.profile = Some(response.candidate_profile);
                assign_missing_ids(&mut response.job_matches);
                self.matches = response.job_matches;
                self.missing_skills_summary = response.missing_skills_summary.unwrap_or_default();
                self.active_tab = ActiveTab::Matches;
                self.phase = Phase::Done;
            }
            Err(err) => {
                let failed = self.steps.fail_active();
                on_step(&self.steps);

                error!("Resume analysis failed at step {:?}: {}", failed, err);
                self.error = Some(format!("Failed to analyze resume: {}", err));
                self.phase = Phase::Failed;
            }
        }
    }

    async fn run_analysis<F>(
        &mut self,
        backend: &dyn MatchingBackend,
        resume: &StagedFile,
        on_step: &mut F,
    ) -> Result<AnalyzeResumeResponse, ClientError>
    where
        F: FnMut(&ProcessingSteps),
    {
        let mut scheduler = StepScheduler::new(self.timings.step_delays.clone());
        let request = backend.analyze_resume(resume);
        tokio::pin!(request);

        // The early steps run on timers while the request is in flight. A
        // reply that lands early is held until the timeline reaches step 4.
        let mut early_reply = None;
        while !scheduler.is_finished() {
            tokio::select! {
                result = &mut request, if early_reply.is_none() => {
                    early_reply = Some(result?);
                }
                Some(index) = scheduler.tick() => {
                    self.advance_step(index + 1, &mut *on_step);
                }
                else => break,
            }
        }

        let reply = match early_reply {
            Some(reply) => reply,
            None => request.await?,
        };

        if !reply.is_success() {
            return Err(reply.server_error(|status| format!("Server error: {}", status)));
        }
        let last = self.timings.step_delays.len() + 1;
        self.advance_step(last, &mut *on_step);

        let response: AnalyzeResumeResponse = reply.json()?;
        tokio::time::sleep(self.timings.final_step_delay).await;
        Ok(response)
    }

    fn advance_step<F>(&mut self, id: usize, on_step: &mut F)
    where
        F: FnMut(&ProcessingSteps),
    {
        if self.steps.advance(id) {
            debug!("Analysis step {} completed", id);
            self.phase = Phase::AwaitingServer(id + 1);
            on_step(&self.steps);
        }
    }

    /// Email the current matches to `user_email`
    pub async fn send_results(&mut self, backend: &dyn MatchingBackend) {
        if !is_plausible_email(&self.user_email) {
            self.error = Some("Please enter a valid email address to send the results.".to_string());
            self.email_notice.set(EmailStatus::Error);
            return;
        }
        if self.profile.is_none() || self.matches.is_empty() {
            self.error = Some("Cannot send email: required analysis data is missing.".to_string());
            return;
        }

        self.sending_email = true;
        self.email_notice.clear();
        self.error = None;

        match email::deliver(backend, &self.user_email, &self.matches).await {
            Ok(()) => {
                info!("Results sent to {}", self.user_email);
                self.email_notice.set(EmailStatus::Success);
            }
            Err(err) => {
                self.email_notice.set(EmailStatus::Error);
                self.error = Some(err.to_string());
            }
        }

        self.sending_email = false;
    }

    /// Skill-gap analysis of the staged resume against a pasted JD
    pub async fn analyze_missing_skills(
        &mut self,
        backend: &dyn MatchingBackend,
        job_description: &str,
    ) {
        let Some(resume) = self.resume.file().cloned() else {
            self.error = Some("Please upload a resume file.".to_string());
            return;
        };
        if job_description.trim().is_empty() {
            self.error = Some("Please provide a job description.".to_string());
            return;
        }

        self.error = None;
        self.skill_gap = None;

        let outcome = match backend.analyze_missing_skills(&resume, job_description).await {
            Ok(reply) if reply.is_success() => reply.json::<MissingSkillsReport>(),
            Ok(reply) => Err(reply.server_error(|status| format!("Server error: {}", status))),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(report) => {
                info!(
                    "Skill gap: {} of {} required skills missing",
                    report.missing_skills_count, report.total_required_skills
                );
                self.skill_gap = Some(report);
            }
            Err(err) => {
                self.error = Some(format!("Failed to analyze missing skills: {}", err));
            }
        }
    }
}
