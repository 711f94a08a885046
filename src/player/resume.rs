use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

/// Resume offsets keyed by content id. `get` and `put` run on the UI
/// thread against memory only; `persist` does the I/O and belongs on the
/// background worker.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    fn get(&self, content_id: &str) -> Option<Duration>;

    /// Record a position. Visible to `get` at once; zero clears the entry.
    fn put(&self, content_id: &str, position: Duration);

    /// Write everything recorded so far to backing storage.
    async fn persist(&self) -> Result<()>;

    async fn save(&self, content_id: &str, position: Duration) -> Result<()> {
        self.put(content_id, position);
        self.persist().await
    }
}

#[derive(Debug, Default)]
pub struct MemoryResumeStore {
    offsets: RwLock<HashMap<String, u64>>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    fn get(&self, content_id: &str) -> Option<Duration> {
        read_offset(&self.offsets, content_id)
    }

    fn put(&self, content_id: &str, position: Duration) {
        write_offset(&self.offsets, content_id, position);
    }

    async fn persist(&self) -> Result<()> {
        Ok(())
    }
}

/// JSON file of `{ content_id: millis }`, cached in memory after open.
#[derive(Debug)]
pub struct FileResumeStore {
    path: PathBuf,
    offsets: RwLock<HashMap<String, u64>>,
}

impl FileResumeStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let offsets = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read resume store")?;
            match serde_json::from_str(&contents) {
                Ok(offsets) => offsets,
                Err(e) => {
                    warn!("Resume store at {:?} is corrupt, starting empty: {}", path, e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        debug!("Opened resume store {:?} with {} entries", path, offsets.len());

        Ok(Self {
            path,
            offsets: RwLock::new(offsets),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResumeStore for FileResumeStore {
    fn get(&self, content_id: &str) -> Option<Duration> {
        read_offset(&self.offsets, content_id)
    }

    fn put(&self, content_id: &str, position: Duration) {
        write_offset(&self.offsets, content_id, position);
    }

    async fn persist(&self) -> Result<()> {
        let contents = {
            let offsets = self
                .offsets
                .read()
                .map_err(|_| anyhow::anyhow!("resume store lock poisoned"))?;
            serde_json::to_string_pretty(&*offsets).context("Failed to serialize resume store")?
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create resume store directory")?;
        }
        tokio::fs::write(&self.path, contents)
            .await
            .context("Failed to write resume store")?;

        debug!("Wrote resume store {:?}", self.path);
        Ok(())
    }
}

fn read_offset(offsets: &RwLock<HashMap<String, u64>>, content_id: &str) -> Option<Duration> {
    let offsets = offsets.read().ok()?;
    offsets.get(content_id).copied().map(Duration::from_millis)
}

// A zero position means "start over", so it clears the entry.
fn write_offset(offsets: &RwLock<HashMap<String, u64>>, content_id: &str, position: Duration) {
    if let Ok(mut offsets) = offsets.write() {
        if position.is_zero() {
            offsets.remove(content_id);
        } else {
            offsets.insert(content_id.to_string(), position.as_millis() as u64);
        }
    }
}
