// src/progress.rs
//! Perceived progress of a long-running analysis request.
//!
//! The backend does all of its work behind a single call, so these steps are
//! a presentational timeline, not a progress signal.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
    Error,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Active => "active",
            StepStatus::Completed => "completed",
            StepStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStep {
    pub id: usize,
    pub message: String,
    pub status: StepStatus,
}

pub const CANDIDATE_STEPS: [&str; 5] = [
    "Extracting candidate profile from resume...",
    "Creating focused search query...",
    "Searching Qdrant database for relevant jobs...",
    "Analyzing job matches with OpenAI...",
    "Ranking and scoring results...",
];

/// Ordered step list. Transitions only move forward and an error halts the
/// sequence for good.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingSteps {
    steps: Vec<ProcessingStep>,
}

impl ProcessingSteps {
    pub fn new(messages: &[&str]) -> Self {
        let steps = messages
            .iter()
            .enumerate()
            .map(|(i, message)| ProcessingStep {
                id: i + 1,
                message: message.to_string(),
                status: StepStatus::Pending,
            })
            .collect();
        Self { steps }
    }

    pub fn candidate_analysis() -> Self {
        Self::new(&CANDIDATE_STEPS)
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn status(&self, id: usize) -> Option<StepStatus> {
        self.get(id).map(|s| s.status)
    }

    pub fn active(&self) -> Option<&ProcessingStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Active)
    }

    pub fn is_halted(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Error)
    }

    pub fn all_completed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    /// pending -> active. Refused once the sequence has errored or while an
    /// earlier step is still unfinished.
    pub fn activate(&mut self, id: usize) -> bool {
        if self.is_halted() {
            return false;
        }
        let earlier_done = self
            .steps
            .iter()
            .filter(|s| s.id < id)
            .all(|s| s.status == StepStatus::Completed);
        if !earlier_done {
            return false;
        }
        self.transition(id, StepStatus::Pending, StepStatus::Active)
    }

    /// active -> completed
    pub fn complete(&mut self, id: usize) -> bool {
        self.transition(id, StepStatus::Active, StepStatus::Completed)
    }

    /// Completes `id` and activates the step after it
    pub fn advance(&mut self, id: usize) -> bool {
        self.complete(id) && (self.get(id + 1).is_none() || self.activate(id + 1))
    }

    /// Flips whichever step is in flight to error. Earlier completed steps
    /// stay as they are. Returns the failed step id.
    pub fn fail_active(&mut self) -> Option<usize> {
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.status == StepStatus::Active)?;
        step.status = StepStatus::Error;
        debug!("Step {} failed: {}", step.id, step.message);
        Some(step.id)
    }

    /// Marks every remaining step completed; no-op on a halted sequence
    pub fn complete_all(&mut self) {
        if self.is_halted() {
            return;
        }
        for step in &mut self.steps {
            step.status = StepStatus::Completed;
        }
    }

    fn get(&self, id: usize) -> Option<&ProcessingStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    fn transition(&mut self, id: usize, from: StepStatus, to: StepStatus) -> bool {
        match self.steps.iter_mut().find(|s| s.id == id) {
            Some(step) if step.status == from => {
                debug!("Step {} {} -> {}", id, from.as_str(), to.as_str());
                step.status = to;
                true
            }
            _ => false,
        }
    }
}

/// Fires one tick per configured delay, strictly in sequence.
///
/// The deadline of the pending tick is kept across polls, so `tick` can sit
/// in a `select!` loop without restarting its timer. Dropping the scheduler
/// cancels whatever delay is outstanding.
#[derive(Debug)]
pub struct StepScheduler {
    delays: Vec<Duration>,
    index: usize,
    deadline: Option<Instant>,
}

impl StepScheduler {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self {
            delays,
            index: 0,
            deadline: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.delays.len()
    }

    /// Waits for the next delay and returns its index, or `None` when every
    /// delay has fired
    pub async fn tick(&mut self) -> Option<usize> {
        let delay = *self.delays.get(self.index)?;
        let deadline = *self.deadline.get_or_insert_with(|| Instant::now() + delay);
        tokio::time::sleep_until(deadline).await;

        let fired = self.index;
        self.index += 1;
        self.deadline = None;
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_sequence_starts_pending() {
        let steps = ProcessingSteps::candidate_analysis();
        assert_eq!(steps.steps().len(), 5);
        assert!(steps
            .steps()
            .iter()
            .all(|s| s.status == StepStatus::Pending));
        assert_eq!(steps.steps()[0].id, 1);
        assert_eq!(steps.steps()[4].message, "Ranking and scoring results...");
    }

    #[test]
    fn test_forward_only_transitions() {
        let mut steps = ProcessingSteps::candidate_analysis();
        assert!(!steps.complete(1), "pending cannot complete");
        assert!(steps.activate(1));
        assert!(!steps.activate(1), "already active");
        assert!(!steps.activate(3), "step 2 not done yet");
        assert!(steps.advance(1));
        assert_eq!(steps.status(1), Some(StepStatus::Completed));
        assert_eq!(steps.status(2), Some(StepStatus::Active));
    }

    #[test]
    fn test_error_halts_later_steps() {
        let mut steps = ProcessingSteps::candidate_analysis();
        steps.activate(1);
        steps.advance(1);
        assert_eq!(steps.fail_active(), Some(2));

        assert!(!steps.activate(3));
        steps.complete_all();
        assert_eq!(steps.status(1), Some(StepStatus::Completed));
        assert_eq!(steps.status(2), Some(StepStatus::Error));
        for id in 3..=5 {
            assert_eq!(steps.status(id), Some(StepStatus::Pending));
        }
        assert!(steps.is_halted());
    }

    #[test]
    fn test_no_step_after_error_ever_progresses() {
        for failing in 1..=5 {
            let mut steps = ProcessingSteps::candidate_analysis();
            steps.activate(1);
            for id in 1..failing {
                steps.advance(id);
            }
            steps.fail_active();

            for id in 1..=5 {
                steps.activate(id);
                steps.complete(id);
                steps.advance(id);
            }
            steps.complete_all();

            for step in steps.steps().iter().filter(|s| s.id > failing) {
                assert_eq!(step.status, StepStatus::Pending, "step {} after {}", step.id, failing);
            }
        }
    }

    #[test]
    fn test_advance_last_step() {
        let mut steps = ProcessingSteps::new(&["only"]);
        steps.activate(1);
        assert!(steps.advance(1));
        assert!(steps.all_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_fires_in_order() {
        let start = Instant::now();
        let mut scheduler = StepScheduler::new(vec![
            Duration::from_millis(300),
            Duration::from_millis(300),
            Duration::from_millis(500),
        ]);

        assert_eq!(scheduler.tick().await, Some(0));
        assert_eq!(start.elapsed(), Duration::from_millis(300));
        assert_eq!(scheduler.tick().await, Some(1));
        assert_eq!(scheduler.tick().await, Some(2));
        assert_eq!(start.elapsed(), Duration::from_millis(1100));
        assert!(scheduler.is_finished());
        assert_eq!(scheduler.tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_keeps_deadline_when_interrupted() {
        let start = Instant::now();
        let mut scheduler = StepScheduler::new(vec![Duration::from_millis(500)]);

        tokio::select! {
            _ = scheduler.tick() => panic!("tick should not fire first"),
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
        }

        assert_eq!(scheduler.tick().await, Some(0));
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }
}
