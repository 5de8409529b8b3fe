use commentdesk::overlay::Repository;
use commentdesk::view::ViewModel;
use commentdesk::{CommentField, CommitOutcome, Dashboard, Dataset, FetchError, LoadState};
use log::debug;
use ratatui::style::Color;
use std::time::{Duration, Instant};

use crate::actions::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Editing,
}

pub struct StatusMessage {
    pub msg: String,
    pub color: Color,
    time: Instant,
}

/// What the event loop should do after an action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Start a fetch tagged with this generation.
    Fetch(u64),
}

pub struct App {
    pub dashboard: Dashboard<Repository>,
    pub mode: Mode,
    pub selection: usize,
    pub status: Option<StatusMessage>,
    pub api_base: String,
    repo: Repository,
    generation: u64,
}

impl App {
    pub fn new(repo: Repository, api_base: String) -> Self {
        Self {
            dashboard: Dashboard::new(repo.clone()),
            mode: Mode::Normal,
            selection: 0,
            status: None,
            api_base,
            repo,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Throws away all view state and the fetched data; the overlay is read
    /// again once the new fetch lands.
    pub fn reload(&mut self) -> u64 {
        self.generation += 1;
        self.dashboard = Dashboard::new(self.repo.clone());
        self.mode = Mode::Normal;
        self.selection = 0;
        self.generation
    }

    /// Results from a superseded fetch are dropped.
    pub fn apply_fetch(&mut self, generation: u64, result: Result<Dataset, FetchError>) {
        if generation != self.generation {
            debug!("dropping stale fetch result (generation {generation}, current {})", self.generation);
            return;
        }
        self.dashboard.apply_fetch(result);
    }

    pub fn view(&self) -> ViewModel {
        self.dashboard.view()
    }

    pub fn tick(&mut self) {
        if let Some(status) = &self.status {
            if status.time.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
    }

    pub fn set_status(&mut self, msg: String, color: Color) {
        self.status = Some(StatusMessage { msg, color, time: Instant::now() });
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.view().rows.get(self.selection).map(|row| row.comment.id)
    }

    pub fn handle(&mut self, action: Action) -> Effect {
        match self.dashboard.state() {
            LoadState::Ready => {}
            LoadState::Loading | LoadState::Failed(_) => {
                return match action {
                    Action::Quit => Effect::Quit,
                    Action::Reload => Effect::Fetch(self.reload()),
                    _ => Effect::None,
                };
            }
        }
        match action {
            Action::Quit => return Effect::Quit,
            Action::Reload => return Effect::Fetch(self.reload()),
            Action::FocusSearch => self.mode = Mode::Search,
            Action::ClearSearch => {
                self.dashboard.set_search("");
                self.selection = 0;
            }
            Action::LeaveInput => self.mode = Mode::Normal,
            Action::SelectNext => {
                let rows = self.view().rows.len();
                if rows > 0 {
                    self.selection = (self.selection + 1).min(rows - 1);
                }
            }
            Action::SelectPrev => self.selection = self.selection.saturating_sub(1),
            Action::NextPage => self.turn_page(|d| d.next_page()),
            Action::PrevPage => self.turn_page(|d| d.prev_page()),
            Action::FirstPage => self.turn_page(|d| d.first_page()),
            Action::LastPage => self.turn_page(|d| d.last_page()),
            Action::JumpWindow(slot) => {
                if let Some(page) = self.view().page_window.get(slot).copied() {
                    self.turn_page(|d| d.go_to_page(page));
                }
            }
            Action::EditName => self.start_edit(CommentField::Name),
            Action::EditBody => self.start_edit(CommentField::Body),
            Action::Commit => self.commit_edit(),
            Action::Cancel => {
                self.dashboard.cancel_edit();
                self.mode = Mode::Normal;
            }
            Action::Input(c) => match self.mode {
                Mode::Search => {
                    self.dashboard.push_search_char(c);
                    self.selection = 0;
                }
                Mode::Editing => {
                    if let Some(draft) = self.dashboard.draft_mut() {
                        draft.push(c);
                    }
                }
                Mode::Normal => {}
            },
            Action::Backspace => match self.mode {
                Mode::Search => {
                    self.dashboard.pop_search_char();
                    self.selection = 0;
                }
                Mode::Editing => {
                    if let Some(draft) = self.dashboard.draft_mut() {
                        draft.pop();
                    }
                }
                Mode::Normal => {}
            },
            Action::None => {}
        }
        Effect::None
    }

    fn turn_page(&mut self, f: impl FnOnce(&mut Dashboard<Repository>)) {
        let before = self.dashboard.page();
        f(&mut self.dashboard);
        if self.dashboard.page() != before {
            self.selection = 0;
        }
    }

    fn start_edit(&mut self, field: CommentField) {
        if let Some(id) = self.selected_id() {
            if self.dashboard.start_edit(id, field) {
                self.mode = Mode::Editing;
            }
        }
    }

    fn commit_edit(&mut self) {
        match self.dashboard.commit_edit() {
            Ok(CommitOutcome::Saved { id, field, .. }) => {
                self.mode = Mode::Normal;
                let rows = self.view().rows.len();
                self.selection = self.selection.min(rows.saturating_sub(1));
                self.set_status(format!("Saved {field} of comment #{id}"), Color::Green);
            }
            // Blank drafts are refused silently and stay open.
            Ok(CommitOutcome::Rejected) => {}
            Ok(CommitOutcome::NoEdit) => self.mode = Mode::Normal,
            Err(e) => self.set_status(format!("Error: {e}"), Color::Red),
        }
    }
}
