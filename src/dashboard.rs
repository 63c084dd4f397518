//! Publication list state and the operations that mutate it.
//!
//! Every mutation follows the same two-step protocol: apply locally, push the
//! whole collection to the store, then re-fetch so store-derived fields
//! (colours) replace the optimistic copy. Nothing here returns an error to the
//! caller; failures are logged and reported as a [`MutationOutcome`].

use crate::model::{DashboardData, Paper, Progress, ResearcherProfile};
use crate::store::PaperStore;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperDraft {
    pub title: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Pushed to the store and reconciled.
    Synced,
    /// Applied locally but the store rejected the push; no refresh was made.
    PushFailed,
    /// Validation failed (empty title); nothing changed.
    Rejected,
    /// No paper with that id; nothing changed.
    NoMatch,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub papers: Vec<Paper>,
    pub researcher: ResearcherProfile,
    pub search: String,
    /// Draft copy of the paper being edited.
    pub editing: Option<Paper>,
    pub adding: bool,
    pub add_draft: PaperDraft,
}

impl DashboardState {
    pub fn next_id(&self) -> u64 {
        self.papers.iter().map(|p| p.id).max().map_or(1, |m| m + 1)
    }

    /// Papers whose title or status contains `term`, case-insensitively, in
    /// collection order.
    pub fn search<'a>(&'a self, term: &str) -> Vec<&'a Paper> {
        let needle = term.to_lowercase();
        self.papers
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .collect()
    }

    pub fn visible_papers(&self) -> Vec<&Paper> {
        self.search(&self.search)
    }

    pub fn snapshot(&self) -> DashboardData {
        DashboardData {
            papers: self.papers.clone(),
            researcher: self.researcher.clone(),
        }
    }
}

pub struct PublicationController<S> {
    store: S,
    state: DashboardState,
    paper_goal: usize,
}

impl<S: PaperStore> PublicationController<S> {
    pub fn new(store: S, paper_goal: usize) -> Self {
        Self {
            store,
            state: DashboardState::default(),
            paper_goal,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.state.papers.len(), self.paper_goal)
    }

    /// Replace local state with the store's copy. On failure the previous
    /// state is kept and `false` is returned.
    pub async fn refresh(&mut self) -> bool {
        match self.store.fetch().await {
            Ok(data) => {
                debug!(papers = data.papers.len(), "refreshed from store");
                self.state.papers = data.papers;
                self.state.researcher = data.researcher;
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch data");
                false
            }
        }
    }

    /// Push the current collection, then reconcile with the store.
    async fn sync(&mut self) -> MutationOutcome {
        if let Err(e) = self.store.push(&self.state.papers).await {
            warn!(error = %e, "failed to save data");
            return MutationOutcome::PushFailed;
        }
        self.refresh().await;
        MutationOutcome::Synced
    }

    pub async fn add(&mut self, title: &str, status: &str) -> MutationOutcome {
        if title.trim().is_empty() {
            return MutationOutcome::Rejected;
        }
        let paper = Paper::new(self.state.next_id(), title, status);
        debug!(id = paper.id, "adding paper");
        self.state.papers.push(paper);
        let outcome = self.sync().await;
        self.state.add_draft = PaperDraft::default();
        self.state.adding = false;
        outcome
    }

    pub async fn edit(&mut self, id: u64, title: &str, status: &str) -> MutationOutcome {
        let Some(paper) = self.state.papers.iter_mut().find(|p| p.id == id) else {
            self.state.editing = None;
            return MutationOutcome::NoMatch;
        };
        paper.title = title.to_string();
        paper.status = status.to_string();
        let outcome = self.sync().await;
        self.state.editing = None;
        outcome
    }

    pub async fn delete(&mut self, id: u64) -> MutationOutcome {
        let before = self.state.papers.len();
        self.state.papers.retain(|p| p.id != id);
        if self.state.papers.len() == before {
            return MutationOutcome::NoMatch;
        }
        self.sync().await
    }

    pub fn search(&self, term: &str) -> Vec<&Paper> {
        self.state.search(term)
    }

    /// Papers matching the current search term.
    pub fn visible_papers(&self) -> Vec<&Paper> {
        self.search(&self.state.search)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search = term.into();
    }

    pub fn open_add_form(&mut self) {
        self.state.editing = None;
        self.state.adding = true;
    }

    pub fn set_add_draft(&mut self, title: impl Into<String>, status: impl Into<String>) {
        self.state.add_draft = PaperDraft {
            title: title.into(),
            status: status.into(),
        };
    }

    /// Enter edit mode with a draft copy of `id`. Returns false if absent.
    pub fn begin_edit(&mut self, id: u64) -> bool {
        let found = self.state.papers.iter().find(|p| p.id == id).cloned();
        let started = found.is_some();
        if started {
            self.state.adding = false;
        }
        self.state.editing = found;
        started
    }

    pub fn set_edit_draft(&mut self, title: impl Into<String>, status: impl Into<String>) {
        if let Some(draft) = self.state.editing.as_mut() {
            draft.title = title.into();
            draft.status = status.into();
        }
    }

    pub fn cancel_forms(&mut self) {
        self.state.adding = false;
        self.state.editing = None;
    }

    pub async fn save_add_draft(&mut self) -> MutationOutcome {
        let PaperDraft { title, status } = self.state.add_draft.clone();
        self.add(&title, &status).await
    }

    pub async fn save_edit_draft(&mut self) -> MutationOutcome {
        match self.state.editing.clone() {
            Some(draft) => self.edit(draft.id, &draft.title, &draft.status).await,
            None => MutationOutcome::NoMatch,
        }
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
