// src/app.rs
//! Root composition: the three view scopes, the view switch and the theme

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::admin::AdminState;
use crate::bulk::BulkState;
use crate::candidate::{CandidateState, CandidateTimings};
use crate::core::ConfigManager;
use crate::utils::{read_file_content, write_file_content};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Candidate,
    Bulk,
    Admin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Terminal background from `COLORFGBG` ("fg;bg" or "fg;default;bg").
    /// Dark ANSI backgrounds are 0-6 and 8.
    pub fn from_colorfgbg(value: Option<&str>) -> Self {
        let background = value
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());

        match background {
            Some(0..=6) | Some(8) => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn system_preference() -> Self {
        Self::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}. Use light or dark", other)),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    theme: Option<Theme>,
}

/// Theme preference persisted in a small TOML file
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved theme, `None` when nothing valid has been saved yet
    pub async fn saved(&self) -> Result<Option<Theme>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = read_file_content(&self.path).await?;
        let prefs: Preferences = toml::from_str(&content)
            .with_context(|| format!("Failed to parse preferences: {}", self.path.display()))?;
        Ok(prefs.theme)
    }

    /// Saved theme, falling back to the terminal's preference
    pub async fn load(&self) -> Result<Theme> {
        match self.saved().await? {
            Some(theme) => Ok(theme),
            None => {
                let theme = Theme::system_preference();
                debug!("No saved theme, using system preference: {}", theme);
                Ok(theme)
            }
        }
    }

    pub async fn save(&self, theme: Theme) -> Result<()> {
        let prefs = Preferences { theme: Some(theme) };
        let content = toml::to_string(&prefs).context("Failed to serialize preferences")?;
        write_file_content(&self.path, &content).await
    }

    /// Flip the current theme and persist the result
    pub async fn toggle(&self) -> Result<Theme> {
        let theme = self.load().await?.toggled();
        self.save(theme).await?;
        info!("Theme switched to {}", theme);
        Ok(theme)
    }
}

/// Owns one independent state scope per view
#[derive(Debug, Clone)]
pub struct App {
    config: ConfigManager,
    view: View,
    theme: Theme,
    pub candidate: CandidateState,
    pub bulk: BulkState,
    pub admin: AdminState,
}

impl App {
    pub fn new(config: ConfigManager, theme: Theme) -> Self {
        Self {
            candidate: CandidateState::new(CandidateTimings::from(&config.ui)),
            bulk: BulkState::new(),
            admin: AdminState::new(config.ui.page_size),
            view: View::default(),
            theme,
            config,
        }
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Fresh scopes everywhere. The theme survives since it is persisted.
    pub fn reset_application(&mut self) {
        info!("Resetting application state");
        *self = Self::new(self.config.clone(), self.theme);
    }
}
