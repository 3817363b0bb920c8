// src/candidate/email.rs
//! "Send results by email" and its transient status toast

use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::core::MatchingBackend;
use crate::error::ClientError;
use crate::types::{JobMatch, SendResultsResponse};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmailStatus {
    #[default]
    Idle,
    Success,
    Error,
}

/// Email status that falls back to `Idle` once its time-to-live has passed
#[derive(Debug, Clone)]
pub struct EmailNotice {
    status: EmailStatus,
    set_at: Option<Instant>,
    ttl: Duration,
}

impl EmailNotice {
    pub fn new(ttl: Duration) -> Self {
        Self {
            status: EmailStatus::Idle,
            set_at: None,
            ttl,
        }
    }

    pub fn set(&mut self, status: EmailStatus) {
        self.status = status;
        self.set_at = Some(Instant::now());
    }

    pub fn clear(&mut self) {
        self.status = EmailStatus::Idle;
        self.set_at = None;
    }

    pub fn status(&self) -> EmailStatus {
        self.status_at(Instant::now())
    }

    pub fn status_at(&self, now: Instant) -> EmailStatus {
        match self.set_at {
            Some(set_at) if now.saturating_duration_since(set_at) >= self.ttl => EmailStatus::Idle,
            _ => self.status,
        }
    }

    /// Time left before the toast dismisses itself
    pub fn remaining(&self) -> Option<Duration> {
        let set_at = self.set_at?;
        if self.status == EmailStatus::Idle {
            return None;
        }
        self.ttl
            .checked_sub(Instant::now().saturating_duration_since(set_at))
            .filter(|d| !d.is_zero())
    }
}

/// Post the matches to the mailer and interpret its answer
pub async fn deliver(
    backend: &dyn MatchingBackend,
    email: &str,
    job_matches: &[JobMatch],
) -> Result<(), ClientError> {
    info!("Requesting results email for {} matches", job_matches.len());
    let reply = backend.send_results(email, job_matches).await?;

    if !reply.is_success() {
        return Err(reply.server_error(|_| "Server failed to send email.".to_string()));
    }

    let response: SendResultsResponse = reply.json()?;
    if response.email_sent {
        Ok(())
    } else {
        let message = response
            .error
            .unwrap_or_else(|| "An unknown error occurred while sending email.".to_string());
        warn!("Mailer reported failure: {}", message);
        Err(ClientError::Server {
            status: reply.status,
            message,
        })
    }
}
