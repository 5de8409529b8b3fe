//! View state and user intents for the comment dashboard.
//!
//! `Dashboard` holds the fetched data, the overlay store and the ephemeral
//! view state (search term, page, in-progress edit). The visible page is
//! always recomputed from that state by [`Dashboard::view`].

use log::{debug, info};

use crate::fetcher::FetchError;
use crate::model::{Comment, CommentField, Dataset};
use crate::overlay::{OverlayRepository, OverlayStore, SaveOutcome, StorageError};
use crate::view::{self, PostIndex, ViewModel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub id: u64,
    pub field: CommentField,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Saved { id: u64, field: CommentField, value: String },
    /// Blank draft; edit mode stays open with the draft untouched.
    Rejected,
    NoEdit,
}

pub struct Dashboard<R> {
    repo: Option<R>,
    overlay: Option<OverlayStore<R>>,
    state: LoadState,
    comments: Vec<Comment>,
    merged: Vec<Comment>,
    posts: PostIndex,
    search: String,
    page: usize,
    edit: Option<EditDraft>,
}

impl<R: OverlayRepository> Dashboard<R> {
    /// Starts in the loading state. The overlay is read from `repo` once the
    /// fetch completes.
    pub fn new(repo: R) -> Self {
        Self {
            repo: Some(repo),
            overlay: None,
            state: LoadState::Loading,
            comments: Vec::new(),
            merged: Vec::new(),
            posts: PostIndex::default(),
            search: String::new(),
            page: 1,
            edit: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Feeds the result of the startup fetch. Any error puts the dashboard in
    /// the failed state; there is no partial success.
    pub fn apply_fetch(&mut self, result: Result<Dataset, FetchError>) {
        match result {
            Ok(dataset) => {
                if let Some(repo) = self.repo.take() {
                    self.overlay = Some(OverlayStore::load(repo));
                }
                self.posts = PostIndex::new(&dataset.posts);
                self.comments = dataset.comments;
                self.merged = match &self.overlay {
                    Some(store) => store.merge(&self.comments),
                    None => self.comments.clone(),
                };
                self.state = LoadState::Ready;
                info!("dashboard ready: {} comments, {} posts", self.merged.len(), self.posts.len());
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
            }
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.merged
    }

    pub fn comment(&self, id: u64) -> Option<&Comment> {
        self.merged.iter().find(|c| c.id == id)
    }

    pub fn overlay(&self) -> Option<&OverlayStore<R>> {
        self.overlay.as_ref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn edit(&self) -> Option<&EditDraft> {
        self.edit.as_ref()
    }

    pub fn view(&self) -> ViewModel {
        view::derive(&self.merged, &self.posts, &self.search, self.page)
    }

    fn total_pages(&self) -> usize {
        view::total_pages(view::filter_comments(&self.merged, &self.search).len())
    }

    /// Replaces the search term and resets to the first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut term = std::mem::take(&mut self.search);
        term.push(c);
        self.set_search(term);
    }

    pub fn pop_search_char(&mut self) {
        let mut term = std::mem::take(&mut self.search);
        term.pop();
        self.set_search(term);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = view::clamp_page(page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn first_page(&mut self) {
        self.page = 1;
    }

    pub fn last_page(&mut self) {
        self.page = self.total_pages().max(1);
    }

    /// Opens an edit seeded with the current value. Any unsaved draft for a
    /// previous edit is discarded.
    pub fn start_edit(&mut self, id: u64, field: CommentField) -> bool {
        let Some(current) = self.comment(id).map(|c| c.field(field).to_string()) else {
            return false;
        };
        if let Some(previous) = self.edit.take() {
            debug!("discarding draft for comment {} ({})", previous.id, previous.field);
        }
        self.edit = Some(EditDraft { id, field, draft: current });
        true
    }

    pub fn draft_mut(&mut self) -> Option<&mut String> {
        self.edit.as_mut().map(|e| &mut e.draft)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Saves the open draft through the overlay store. A rejected or failed
    /// save keeps the edit open.
    pub fn commit_edit(&mut self) -> Result<CommitOutcome, StorageError> {
        let Some(edit) = self.edit.as_ref() else {
            return Ok(CommitOutcome::NoEdit);
        };
        let Some(store) = self.overlay.as_mut() else {
            return Ok(CommitOutcome::NoEdit);
        };
        let (id, field) = (edit.id, edit.field);
        match store.save(id, field, &edit.draft)? {
            SaveOutcome::Rejected => Ok(CommitOutcome::Rejected),
            SaveOutcome::Saved(value) => {
                if let Some(comment) = self.merged.iter_mut().find(|c| c.id == id) {
                    match field {
                        CommentField::Name => comment.name = value.clone(),
                        CommentField::Body => comment.body = value.clone(),
                    }
                }
                self.edit = None;
                // The edited comment may no longer match the search.
                self.page = view::clamp_page(self.page, self.total_pages());
                Ok(CommitOutcome::Saved { id, field, value })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::overlay::MemoryRepository;
    use std::sync::Arc;

    fn dataset(n: u64) -> Dataset {
        let comments = (1..=n)
            .map(|i| Comment {
                id: i,
                post_id: (i - 1) / 5 + 1,
                name: format!("name {i}"),
                email: format!("user{i}@example.com"),
                body: format!("body {i}"),
            })
            .collect();
        let posts = (1..=n / 5).map(|i| Post { id: i, title: format!("post {i}") }).collect();
        Dataset { comments, posts }
    }

    fn ready(n: u64) -> (Dashboard<Arc<MemoryRepository>>, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        let mut dash = Dashboard::new(repo.clone());
        dash.apply_fetch(Ok(dataset(n)));
        (dash, repo)
    }

    fn failure() -> FetchError {
        FetchError::Status { endpoint: "http://api/comments".into(), status: 500 }
    }

    #[test]
    fn starts_loading_and_fails_on_error() {
        let mut dash = Dashboard::new(MemoryRepository::new());
        assert_eq!(dash.state(), &LoadState::Loading);
        dash.apply_fetch(Err(failure()));
        assert!(matches!(dash.state(), LoadState::Failed(msg) if msg.contains("500")));
        assert!(dash.comments().is_empty());
    }

    #[test]
    fn overlay_is_merged_before_first_view() {
        let repo = MemoryRepository::with_document(r#"{"2":{"name":"Renamed"}}"#);
        let mut dash = Dashboard::new(repo);
        dash.apply_fetch(Ok(dataset(3)));
        let view = dash.view();
        assert_eq!(view.rows[1].comment.name, "Renamed");
        assert_eq!(view.rows[1].comment.body, "body 2");
    }

    #[test]
    fn search_change_resets_page() {
        let (mut dash, _) = ready(60);
        dash.go_to_page(5);
        assert_eq!(dash.page(), 5);
        dash.set_search("example");
        assert_eq!(dash.page(), 1);
        dash.go_to_page(5);
        dash.push_search_char('x');
        assert_eq!(dash.page(), 1);
    }

    #[test]
    fn navigation_is_clamped() {
        let (mut dash, _) = ready(25);
        dash.go_to_page(99);
        assert_eq!(dash.page(), 3);
        dash.next_page();
        assert_eq!(dash.page(), 3);
        dash.go_to_page(0);
        assert_eq!(dash.page(), 1);
        dash.prev_page();
        assert_eq!(dash.page(), 1);
        dash.last_page();
        assert_eq!(dash.page(), 3);
    }

    #[test]
    fn empty_search_result_shows_empty_state() {
        let (mut dash, _) = ready(25);
        dash.set_search("nothing matches this");
        let view = dash.view();
        assert!(view.is_empty());
        dash.go_to_page(4);
        assert_eq!(dash.page(), 1);
    }

    #[test]
    fn commit_saves_trimmed_value_and_closes_edit() {
        let (mut dash, repo) = ready(10);
        assert!(dash.start_edit(7, CommentField::Name));
        assert_eq!(dash.edit().unwrap().draft, "name 7");
        *dash.draft_mut().unwrap() = "  Bob  ".into();
        let outcome = dash.commit_edit().unwrap();
        assert_eq!(outcome, CommitOutcome::Saved { id: 7, field: CommentField::Name, value: "Bob".into() });
        assert!(dash.edit().is_none());
        assert_eq!(dash.comment(7).unwrap().name, "Bob");
        assert_eq!(repo.document().unwrap(), br#"{"7":{"name":"Bob"}}"#.to_vec());
    }

    #[test]
    fn blank_commit_keeps_edit_mode() {
        let (mut dash, repo) = ready(10);
        dash.start_edit(3, CommentField::Body);
        *dash.draft_mut().unwrap() = "   ".into();
        assert_eq!(dash.commit_edit().unwrap(), CommitOutcome::Rejected);
        assert_eq!(dash.edit().unwrap().draft, "   ");
        assert_eq!(dash.comment(3).unwrap().body, "body 3");
        assert_eq!(repo.writes(), 0);
    }

    #[test]
    fn starting_new_edit_discards_previous_draft() {
        let (mut dash, repo) = ready(10);
        dash.start_edit(1, CommentField::Name);
        dash.draft_mut().unwrap().push_str(" changed");
        dash.start_edit(2, CommentField::Body);
        let edit = dash.edit().unwrap();
        assert_eq!((edit.id, edit.field), (2, CommentField::Body));
        assert_eq!(dash.comment(1).unwrap().name, "name 1");
        assert_eq!(repo.writes(), 0);
    }

    #[test]
    fn cancel_discards_draft() {
        let (mut dash, _) = ready(10);
        dash.start_edit(4, CommentField::Name);
        dash.draft_mut().unwrap().clear();
        dash.cancel_edit();
        assert!(dash.edit().is_none());
        assert_eq!(dash.commit_edit().unwrap(), CommitOutcome::NoEdit);
    }

    #[test]
    fn start_edit_for_unknown_comment_is_refused() {
        let (mut dash, _) = ready(3);
        assert!(!dash.start_edit(99, CommentField::Name));
        assert!(dash.edit().is_none());
    }

    #[test]
    fn save_that_leaves_the_search_keeps_page_in_range() {
        let (mut dash, _) = ready(11);
        dash.set_search("body");
        dash.go_to_page(2);
        assert_eq!(dash.page(), 2);
        assert!(dash.start_edit(11, CommentField::Body));
        *dash.draft_mut().unwrap() = "unrelated".into();
        dash.commit_edit().unwrap();
        let view = dash.view();
        assert_eq!(view.filtered_count, 10);
        assert_eq!(dash.page(), 1);
        assert_eq!(view.page, dash.page());
    }

    #[test]
    fn saved_edit_is_searchable() {
        let (mut dash, _) = ready(30);
        dash.start_edit(22, CommentField::Body);
        *dash.draft_mut().unwrap() = "Needle in a haystack".into();
        dash.commit_edit().unwrap();
        dash.set_search("NEEDLE");
        let view = dash.view();
        assert_eq!(view.filtered_count, 1);
        assert_eq!(view.rows[0].comment.id, 22);
        assert_eq!(view.rows[0].post_title, "post 5");
    }
}
