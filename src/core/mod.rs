// src/core/mod.rs
//! Core services shared by every view: configuration and the service transport

pub mod backend;
pub mod config_manager;
pub mod service_client;

pub use backend::{HttpReply, MatchingBackend};
pub use config_manager::ConfigManager;
pub use service_client::ServiceClient;
