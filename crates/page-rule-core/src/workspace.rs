//! Multi-buffer workspace.
//!
//! Owns one [`Document`] per open buffer, each with independent mode and fold state, and
//! applies the shared [`PageRuleConfig`] to buffers as they are opened (buffers whose
//! language is listed in `enabled_languages` get the mode switched on automatically).

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::PageRuleConfig;
use crate::document::Document;
use crate::error::PageRuleError;
use crate::folding::ToggleOutcome;

/// Opaque identifier for an open buffer in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(u64);

impl BufferId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A set of open buffers sharing one configuration.
#[derive(Debug)]
pub struct Workspace {
    config: PageRuleConfig,
    next_buffer_id: u64,
    buffers: BTreeMap<BufferId, Document>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new(config: PageRuleConfig) -> Self {
        Self {
            config,
            next_buffer_id: 1,
            buffers: BTreeMap::new(),
        }
    }

    /// The shared configuration.
    pub fn config(&self) -> &PageRuleConfig {
        &self.config
    }

    /// Open a buffer. The mode is enabled right away when the language is configured for it;
    /// a failure there is logged and leaves the buffer open with the mode off.
    pub fn open_buffer(&mut self, text: &str, language_id: Option<&str>) -> BufferId {
        let id = BufferId(self.next_buffer_id);
        self.next_buffer_id += 1;

        let mut document = Document::new(text, self.config.clone());
        if let Some(language_id) = language_id {
            document.set_language(language_id);
            if self.config.enables_language(language_id)
                && let Err(err) = document.enable_mode()
            {
                warn!(buffer = id.get(), error = %err, "could not enable page rule mode");
            }
        }

        debug!(buffer = id.get(), language = ?language_id, "buffer opened");
        self.buffers.insert(id, document);
        id
    }

    /// Close a buffer, returning its document.
    pub fn close_buffer(&mut self, id: BufferId) -> Option<Document> {
        self.buffers.remove(&id)
    }

    /// Ids of all open buffers.
    pub fn buffer_ids(&self) -> Vec<BufferId> {
        self.buffers.keys().copied().collect()
    }

    /// Look up a buffer.
    pub fn document(&self, id: BufferId) -> Option<&Document> {
        self.buffers.get(&id)
    }

    /// Look up a buffer for editing.
    pub fn document_mut(&mut self, id: BufferId) -> Option<&mut Document> {
        self.buffers.get_mut(&id)
    }

    /// Turn the mode on for one buffer.
    pub fn enable_mode(&mut self, id: BufferId) -> Result<(), PageRuleError> {
        self.with_document(id, Document::enable_mode)
    }

    /// Turn the mode off for one buffer.
    pub fn disable_mode(&mut self, id: BufferId) -> Result<(), PageRuleError> {
        self.with_document(id, |document| {
            document.disable_mode();
            Ok(())
        })
    }

    /// Fold or unfold the section at `pos` in one buffer.
    pub fn toggle_section_at(
        &mut self,
        id: BufferId,
        pos: usize,
    ) -> Result<ToggleOutcome, PageRuleError> {
        self.with_document(id, |document| document.toggle_section_at(pos))
    }

    /// Fold every section (except the cursor's) in one buffer.
    pub fn hide_all_sections(&mut self, id: BufferId) -> Result<usize, PageRuleError> {
        self.with_document(id, Document::hide_all_sections)
    }

    /// Unfold every section in one buffer.
    pub fn show_all_sections(&mut self, id: BufferId) -> Result<(), PageRuleError> {
        self.with_document(id, |document| {
            document.show_all_sections();
            Ok(())
        })
    }

    fn with_document<T>(
        &mut self,
        id: BufferId,
        f: impl FnOnce(&mut Document) -> Result<T, PageRuleError>,
    ) -> Result<T, PageRuleError> {
        let document = self
            .buffers
            .get_mut(&id)
            .ok_or(PageRuleError::UnknownBuffer(id))?;
        f(document).inspect_err(|err| {
            if matches!(err, PageRuleError::Host(_)) {
                warn!(buffer = id.get(), error = %err, "page rule mode disabled for buffer");
            }
        })
    }
}
