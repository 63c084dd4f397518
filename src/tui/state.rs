use crate::dashboard::DashboardState;
use crate::model::{DashboardEvent, Paper, Progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(u64),
}

/// Text buffers for the add/edit modal.
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: FormMode,
    pub title: String,
    pub status: String,
    pub field: FormField,
}

impl FormState {
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            title: String::new(),
            status: String::new(),
            field: FormField::Title,
        }
    }

    pub fn edit(p: &Paper) -> Self {
        Self {
            mode: FormMode::Edit(p.id),
            title: p.title.clone(),
            status: p.status.clone(),
            field: FormField::Title,
        }
    }

    pub fn active_buffer(&mut self) -> &mut String {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Status => &mut self.status,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Status,
            FormField::Status => FormField::Title,
        };
    }
}

pub struct UiState {
    pub tab: usize,
    /// Read-only mirror of the controller's state, refreshed from snapshots.
    /// Only `search` is edited locally.
    pub view: DashboardState,
    pub paper_goal: usize,
    pub selected: usize, // Index into the visible (filtered) rows
    pub search_editing: bool,
    pub form: Option<FormState>,
    pub info: String,
    pub last_synced: Option<String>,
    /// Sync commands sent but not yet answered.
    pub pending: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            view: DashboardState::default(),
            paper_goal: 50,
            selected: 0,
            search_editing: false,
            form: None,
            info: String::new(),
            last_synced: None,
            // The initial load is already in flight when the UI starts.
            pending: 1,
        }
    }
}

fn clock() -> String {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    now.format(time::macros::format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

impl UiState {
    pub fn progress(&self) -> Progress {
        Progress::new(self.view.papers.len(), self.paper_goal)
    }

    pub fn visible(&self) -> Vec<&Paper> {
        self.view.visible_papers()
    }

    pub fn selected_paper(&self) -> Option<&Paper> {
        self.visible().get(self.selected).copied()
    }

    pub fn clamp_selection(&mut self) {
        let n = self.visible().len();
        if n == 0 {
            self.selected = 0;
        } else if self.selected >= n {
            self.selected = n - 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        let n = self.visible().len();
        if self.selected + 1 < n {
            self.selected += 1;
        }
    }

    pub fn set_search(&mut self, term: String) {
        self.view.search = term;
        self.clamp_selection();
    }

    pub fn apply_event(&mut self, ev: DashboardEvent) {
        match ev {
            DashboardEvent::Snapshot(data) => {
                self.view.papers = data.papers;
                self.view.researcher = data.researcher;
                self.last_synced = Some(clock());
                self.clamp_selection();
            }
            DashboardEvent::Info(msg) => {
                self.pending = self.pending.saturating_sub(1);
                self.info = msg;
            }
        }
    }
}
