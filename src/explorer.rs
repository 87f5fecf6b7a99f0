//! UI state for the explorer, kept free of Yew so it can be tested natively.
//!
//! Every load request gets a new generation number. A result that comes back
//! for an older generation is dropped, so a slow strategy cannot overwrite
//! the result of a newer one. A failed load keeps the list that is already
//! on screen.
//!
//! The selected strategy is always `All` or `AllSettled`. The worker is a
//! one-shot action: it loads once and leaves the selection alone, so refresh
//! keeps using the selected strategy.

use log::{debug, error};
use std::rc::Rc;

use crate::error::LoadError;
use crate::fetch::LoadOutcome;
use crate::model::{Strategy, User};

/// What the status line under the list should say.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    None,
    Loaded(LoadOutcome),
    Failed(LoadError),
}

/// A load the view layer should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u32,
    pub strategy: Strategy,
    /// Drop the cache before loading.
    pub refresh: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerState {
    pub users: Rc<Vec<User>>,
    pub loading: bool,
    pub selected: Strategy,
    pub notice: Notice,
    generation: u32,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            users: Rc::new(Vec::new()),
            loading: false,
            selected: Strategy::All,
            notice: Notice::None,
            generation: 0,
        }
    }
}

impl ExplorerState {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self, strategy: Strategy, refresh: bool) -> LoadRequest {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        LoadRequest {
            generation: self.generation,
            strategy,
            refresh,
        }
    }

    /// First load on mount.
    pub fn start(&mut self) -> LoadRequest {
        self.begin(self.selected, false)
    }

    /// Returns `None` when `strategy` is already selected.
    pub fn select(&mut self, strategy: Strategy) -> Option<LoadRequest> {
        if strategy == Strategy::Worker {
            return Some(self.run_worker());
        }
        if strategy == self.selected {
            return None;
        }
        self.selected = strategy;
        Some(self.begin(strategy, false))
    }

    pub fn run_worker(&mut self) -> LoadRequest {
        self.begin(Strategy::Worker, false)
    }

    pub fn refresh(&mut self) -> LoadRequest {
        self.begin(self.selected, true)
    }

    /// Apply a finished load. Returns `false` if the result was stale.
    pub fn finish(&mut self, generation: u32, result: Result<LoadOutcome, LoadError>) -> bool {
        if generation != self.generation {
            debug!("Discarding stale response (generation {})", generation);
            return false;
        }
        self.loading = false;
        match result {
            Ok(outcome) => {
                self.users = Rc::new(outcome.users.clone());
                self.notice = Notice::Loaded(outcome);
            }
            Err(e) => {
                error!("Gagal mengambil data: {}", e);
                self.notice = Notice::Failed(e);
            }
        }
        true
    }
}
