use super::error::LayoutError;
use super::pipeline::{Layout, LayoutOptions};
use crate::model::BranchHistory;
use log::{debug, warn};
use scc::HashMap;
use std::sync::Arc;

/// Memoizes layouts by a fingerprint of their inputs.
/// Entries are whole layouts; nothing is patched incrementally.
pub struct LayoutCache {
    layouts: HashMap<String, Arc<Layout>>,
    capacity: usize,
}

impl std::fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutCache")
            .field("entries", &self.layouts.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(16)
    }
}

/// md5 over the serialized inputs, `None` if they cannot be serialized
pub fn fingerprint(histories: &[BranchHistory], options: &LayoutOptions) -> Option<String> {
    match serde_json::to_vec(&(histories, options)) {
        Ok(bytes) => Some(format!("{:x}", md5::compute(bytes))),
        Err(e) => {
            warn!("Could not fingerprint layout input: {e}");
            None
        }
    }
}

impl LayoutCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            layouts: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn clear(&self) {
        self.layouts.clear();
    }

    /// Return the cached layout for identical input, computing it on a miss
    pub fn get_or_compute(
        &self,
        histories: &[BranchHistory],
        options: &LayoutOptions,
    ) -> Result<Arc<Layout>, LayoutError> {
        let Some(key) = fingerprint(histories, options) else {
            return Layout::compute(histories, options).map(Arc::new);
        };

        if let Some(layout) = self.layouts.read(&key, |_, v| Arc::clone(v)) {
            debug!("Layout cache hit for {key}");
            return Ok(layout);
        }

        let layout = Arc::new(Layout::compute(histories, options)?);
        if self.layouts.len() >= self.capacity {
            debug!("Layout cache full ({} entries), clearing", self.capacity);
            self.layouts.clear();
        }
        let _ = self.layouts.insert(key, Arc::clone(&layout));
        Ok(layout)
    }
}
