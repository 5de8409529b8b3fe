use crate::model::Overlay;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Key under which the overlay document is stored in key-value backends.
pub const OVERLAY_KEY: &str = "commentEdits";

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("overlay storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("persisted overlay is malformed: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("could not encode overlay: {0}")]
    Encode(#[source] serde_json::Error),
    #[cfg(feature = "sled-store")]
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("{0} storage requires the {0}-store feature")]
    BackendUnavailable(&'static str),
    #[error("internal error")]
    Internal,
}

/// Persistence seam for the edit overlay: the whole mapping is read at once
/// and written back at once.
pub trait OverlayRepository {
    fn load(&self) -> Result<Overlay, StorageError>;
    fn save_all(&self, overlay: &Overlay) -> Result<(), StorageError>;
}

pub type Repository = Arc<dyn OverlayRepository + Send + Sync + 'static>;

impl<R: OverlayRepository + ?Sized> OverlayRepository for Arc<R> {
    fn load(&self) -> Result<Overlay, StorageError> {
        (**self).load()
    }

    fn save_all(&self, overlay: &Overlay) -> Result<(), StorageError> {
        (**self).save_all(overlay)
    }
}

/// Parses a persisted document. Empty entries are dropped since they are
/// equivalent to absence.
pub fn decode(bytes: &[u8]) -> Result<Overlay, StorageError> {
    let mut overlay: Overlay = serde_json::from_slice(bytes).map_err(StorageError::Corrupt)?;
    overlay.retain(|_, entry| !entry.is_empty());
    Ok(overlay)
}

pub fn encode(overlay: &Overlay) -> Result<Vec<u8>, StorageError> {
    let persisted: Overlay = overlay.iter().filter(|(_, e)| !e.is_empty()).map(|(id, e)| (*id, e.clone())).collect();
    serde_json::to_vec(&persisted).map_err(StorageError::Encode)
}

/// In-process document, mainly for tests. Holds the raw bytes so malformed
/// documents can be seeded.
#[derive(Default)]
pub struct MemoryRepository {
    document: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(raw: impl Into<Vec<u8>>) -> Self {
        Self { document: Mutex::new(Some(raw.into())), writes: AtomicUsize::new(0) }
    }

    pub fn document(&self) -> Option<Vec<u8>> {
        self.document.lock().ok().and_then(|doc| doc.clone())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl OverlayRepository for MemoryRepository {
    fn load(&self) -> Result<Overlay, StorageError> {
        match self.document.lock().map_err(|_| StorageError::Internal)?.as_deref() {
            Some(bytes) => decode(bytes),
            None => Ok(Overlay::new()),
        }
    }

    fn save_all(&self, overlay: &Overlay) -> Result<(), StorageError> {
        let bytes = encode(overlay)?;
        *self.document.lock().map_err(|_| StorageError::Internal)? = Some(bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// JSON document on disk. Writes go to a sibling temp file which then
/// replaces the document, so readers never observe a partial write.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| OVERLAY_KEY.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl OverlayRepository for FileRepository {
    fn load(&self) -> Result<Overlay, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => decode(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Overlay::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save_all(&self, overlay: &Overlay) -> Result<(), StorageError> {
        let bytes = encode(overlay)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        debug!("overlay written to {} ({} entries)", self.path.display(), overlay.len());
        Ok(())
    }
}

// ================= sled backend =================
#[cfg(feature = "sled-store")]
pub struct SledRepository {
    db: sled::Db,
}

#[cfg(feature = "sled-store")]
impl SledRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self { db: sled::open(path)? })
    }
}

#[cfg(feature = "sled-store")]
impl OverlayRepository for SledRepository {
    fn load(&self) -> Result<Overlay, StorageError> {
        match self.db.get(OVERLAY_KEY)? {
            Some(bytes) => decode(bytes.as_ref()),
            None => Ok(Overlay::new()),
        }
    }

    fn save_all(&self, overlay: &Overlay) -> Result<(), StorageError> {
        let bytes = encode(overlay)?;
        self.db.insert(OVERLAY_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }
}
