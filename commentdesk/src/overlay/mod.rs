//! Edit overlay: persisted field-level overrides layered on top of freshly
//! fetched comments.
//!
//! The overlay is loaded once at startup and merged onto the fetched data
//! (overlay wins). Each accepted edit rewrites the whole persisted mapping.
//! Entries are never removed.

pub mod storage;

use log::{info, warn};

use crate::model::{Comment, CommentField, Overlay, OverlayEntry};
pub use storage::{FileRepository, MemoryRepository, OverlayRepository, Repository, StorageError};
#[cfg(feature = "sled-store")]
pub use storage::SledRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The trimmed value that was stored.
    Saved(String),
    /// Blank value; nothing was changed or written.
    Rejected,
}

pub struct OverlayStore<R> {
    repo: R,
    overlay: Overlay,
}

impl<R: OverlayRepository> OverlayStore<R> {
    /// Reads the persisted overlay. Missing or malformed data yields an empty
    /// overlay rather than an error.
    pub fn load(repo: R) -> Self {
        let overlay = match repo.load() {
            Ok(overlay) => {
                info!("loaded {} overlay entries", overlay.len());
                overlay
            }
            Err(e) => {
                warn!("ignoring persisted overlay: {e}");
                Overlay::new()
            }
        };
        Self { repo, overlay }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn entry(&self, id: u64) -> Option<&OverlayEntry> {
        self.overlay.get(&id)
    }

    pub fn len(&self) -> usize {
        self.overlay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn merge(&self, comments: &[Comment]) -> Vec<Comment> {
        merge(comments, &self.overlay)
    }

    /// Stores `value` (trimmed) as the override for `field` of comment `id`,
    /// keeping the entry's other field, then persists the full mapping.
    ///
    /// On a failed write the in-memory overlay is left as it was.
    pub fn save(&mut self, id: u64, field: CommentField, value: &str) -> Result<SaveOutcome, StorageError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(SaveOutcome::Rejected);
        }
        let mut next = self.overlay.clone();
        next.entry(id).or_default().set(field, trimmed.to_string());
        self.repo.save_all(&next)?;
        self.overlay = next;
        info!("saved {field} override for comment {id}");
        Ok(SaveOutcome::Saved(trimmed.to_string()))
    }
}

/// Returns a copy of `comments` with every overlay entry applied.
pub fn merge(comments: &[Comment], overlay: &Overlay) -> Vec<Comment> {
    comments
        .iter()
        .map(|comment| {
            let mut merged = comment.clone();
            if let Some(entry) = overlay.get(&comment.id) {
                entry.apply_to(&mut merged);
            }
            merged
        })
        .collect()
}
