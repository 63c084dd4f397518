use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One tracked publication as the remote store represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    // Hint colours computed by the store (e.g. spreadsheet cell fill / font colour).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,
    /// Columns this client does not know about; written back untouched on push.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Paper {
    pub fn new(id: u64, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: status.into(),
            color: None,
            font_color: None,
            highlight: None,
            extra: Map::new(),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.unwrap_or(false)
    }

    /// Case-insensitive substring match against title or status.
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.status.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credentials: String,
    #[serde(default)]
    pub guide: String,
    #[serde(default)]
    pub guide_credentials: String,
}

impl Default for ResearcherProfile {
    fn default() -> Self {
        // Placeholder shown until the first successful fetch.
        Self {
            name: "Dr. DHIBIN VIKASH K P".into(),
            credentials: "B.S., MBBS.".into(),
            guide: String::new(),
            guide_credentials: String::new(),
        }
    }
}

/// Full payload returned by a store fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub papers: Vec<Paper>,
    #[serde(default)]
    pub researcher: ResearcherProfile,
}

/// Body of the bulk update request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    pub papers: &'a [Paper],
}

/// Progress towards the publication goal shown in the header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub count: usize,
    pub goal: usize,
    /// Rounded percentage, may exceed 100.
    pub percent: u64,
    /// Fill ratio for gauges, clamped to 0.0..=1.0.
    pub ratio: f64,
}

impl Progress {
    pub fn new(count: usize, goal: usize) -> Self {
        let raw = if goal == 0 {
            1.0
        } else {
            count as f64 / goal as f64
        };
        Self {
            count,
            goal,
            percent: (raw * 100.0).round() as u64,
            ratio: raw.clamp(0.0, 1.0),
        }
    }
}

/// Commands emitted by UI layers to drive the controller.
#[derive(Debug, Clone)]
pub enum UiCommand {
    Refresh,
    OpenAddForm,
    BeginEdit { id: u64 },
    CancelForms,
    Add { title: String, status: String },
    Edit { id: u64, title: String, status: String },
    Delete { id: u64 },
    Quit,
}

/// Events emitted by the orchestrator and consumed by presentation layers.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Snapshot(DashboardData),
    Info(String),
}
