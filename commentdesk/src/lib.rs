//! Core of the comment dashboard: fetches comments and posts from a remote
//! JSON API, layers locally persisted edits on top of them and derives the
//! filtered, paginated view shown to the user.

pub mod config;
pub mod dashboard;
pub mod fetcher;
pub mod model;
pub mod overlay;
pub mod view;

pub use dashboard::{CommitOutcome, Dashboard, EditDraft, LoadState};
pub use fetcher::{Endpoints, FetchError, HttpFetcher};
pub use model::{Comment, CommentField, Dataset, Overlay, OverlayEntry, Post};
