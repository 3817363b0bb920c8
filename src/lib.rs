//! TalentAlign client: résumé/job matching views over the analysis service

pub mod admin;
pub mod app;
pub mod bulk;
pub mod candidate;
pub mod cli;
pub mod core;
pub mod error;
pub mod export;
pub mod presenter;
pub mod progress;
pub mod types;
pub mod upload;
pub mod utils;

pub use app::{App, Theme, ThemeStore, View};
pub use core::{ConfigManager, HttpReply, MatchingBackend, ServiceClient};
pub use error::ClientError;
