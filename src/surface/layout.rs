use std::collections::HashMap;
use tracing::trace;

use super::{HostId, SurfaceId};

/// The host's view hierarchy, as far as surface placement is concerned.
/// Inflation, measuring and drawing stay with the host.
pub trait HostLayout {
    fn create_surface(&mut self) -> SurfaceId;
    fn child_count(&self, host: HostId) -> usize;
    /// Insert at `index` (already clamped by the caller) or append.
    fn insert(&mut self, host: HostId, surface: SurfaceId, index: Option<usize>);
    fn remove(&mut self, host: HostId, surface: SurfaceId);
    fn parent_of(&self, surface: SurfaceId) -> Option<HostId>;
}

/// In-memory hierarchy for headless hosts, the demo and tests.
#[derive(Debug, Default)]
pub struct MemoryLayout {
    next_id: u64,
    children: HashMap<HostId, Vec<SurfaceId>>,
    parents: HashMap<SurfaceId, HostId>,
}

impl MemoryLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_host(&mut self) -> HostId {
        let host = HostId::new(self.allocate());
        self.children.insert(host, Vec::new());
        host
    }

    /// Append an unrelated child view, e.g. a title or thumbnail.
    pub fn add_sibling(&mut self, host: HostId) -> SurfaceId {
        let surface = SurfaceId::new(self.allocate());
        self.insert(host, surface, None);
        surface
    }

    pub fn children(&self, host: HostId) -> &[SurfaceId] {
        self.children.get(&host).map(Vec::as_slice).unwrap_or(&[])
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl HostLayout for MemoryLayout {
    fn create_surface(&mut self) -> SurfaceId {
        SurfaceId::new(self.allocate())
    }

    fn child_count(&self, host: HostId) -> usize {
        self.children(host).len()
    }

    fn insert(&mut self, host: HostId, surface: SurfaceId, index: Option<usize>) {
        if let Some(previous) = self.parents.get(&surface).copied() {
            self.remove(previous, surface);
        }
        let children = self.children.entry(host).or_default();
        let index = index.unwrap_or(children.len()).min(children.len());
        children.insert(index, surface);
        self.parents.insert(surface, host);
        trace!("Inserted {} into {} at {}", surface, host, index);
    }

    fn remove(&mut self, host: HostId, surface: SurfaceId) {
        if let Some(children) = self.children.get_mut(&host) {
            children.retain(|s| *s != surface);
        }
        if self.parents.get(&surface) == Some(&host) {
            self.parents.remove(&surface);
        }
    }

    fn parent_of(&self, surface: SurfaceId) -> Option<HostId> {
        self.parents.get(&surface).copied()
    }
}
