//! Layered settings: defaults, then TOML file, then environment, then CLI flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Spreadsheet-backed HTTP API (`/api/data`, `/api/update`)
    Sheet,
    /// Hosted document database
    Firestore,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheet" | "api" => Ok(Backend::Sheet),
            "firestore" => Ok(Backend::Firestore),
            other => Err(anyhow::anyhow!("unknown backend {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirestoreSettings {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub papers_collection: String,
    pub researcher_document: String,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for FirestoreSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://firestore.googleapis.com/v1".into(),
            project_id: String::new(),
            api_key: None,
            papers_collection: "papers".into(),
            researcher_document: "profile/researcher".into(),
            poll_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: Backend,
    /// Explicit API base; overrides origin-based resolution.
    pub api_base: Option<String>,
    /// Origin the dashboard is served from.
    pub origin: String,
    /// None means requests wait for as long as the store takes.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    pub paper_goal: usize,
    pub log_file: Option<PathBuf>,
    pub firestore: FirestoreSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::Sheet,
            api_base: None,
            origin: "http://localhost".into(),
            request_timeout: None,
            paper_goal: 50,
            log_file: None,
            firestore: FirestoreSettings::default(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paper-tracker").join("config.toml"))
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("paper-tracker").join("paper-tracker.log"))
}

pub fn parse_settings(raw: &str) -> Result<Settings> {
    toml::from_str(raw).context("parse settings TOML")
}

/// Load settings from `path` (or the default location) and the environment.
///
/// An explicitly given path must exist; the default location is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)
                .with_context(|| format!("read config {}", p.display()))?;
            parse_settings(&raw)?
        }
        None => match default_config_path() {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(&p)
                    .with_context(|| format!("read config {}", p.display()))?;
                parse_settings(&raw)?
            }
            _ => Settings::default(),
        },
    };
    apply_env(&mut settings, |k| std::env::var(k).ok())?;
    Ok(settings)
}

/// Apply `PAPER_TRACKER_*` overrides using `lookup` to read variables.
pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(v) = lookup("PAPER_TRACKER_BACKEND") {
        settings.backend = v.parse()?;
    }
    if let Some(v) = lookup("PAPER_TRACKER_API_BASE") {
        settings.api_base = Some(v);
    }
    if let Some(v) = lookup("PAPER_TRACKER_ORIGIN") {
        settings.origin = v;
    }
    if let Some(v) = lookup("PAPER_TRACKER_PAPER_GOAL") {
        settings.paper_goal = v
            .parse()
            .with_context(|| format!("PAPER_TRACKER_PAPER_GOAL={v:?} is not a number"))?;
    }
    if let Some(v) = lookup("PAPER_TRACKER_FIRESTORE_PROJECT") {
        settings.firestore.project_id = v;
    }
    if let Some(v) = lookup("PAPER_TRACKER_FIRESTORE_API_KEY") {
        settings.firestore.api_key = Some(v);
    }
    Ok(())
}
