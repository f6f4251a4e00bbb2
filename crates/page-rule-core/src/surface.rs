//! In-memory [`DisplaySurface`] used by [`Document`](crate::Document) and tests.
//!
//! Stores overrides and invisible ranges as markers that follow text edits, and can render
//! the buffer the way a host would display it.

use std::ops::Range;

use crate::edit::TextEdit;
use crate::error::HostError;
use crate::host::{DisplaySurface, MarkerId, SurfaceCapability};
use crate::markers::{Marker, MarkerTree};
use crate::overrides::DisplayOverride;

/// A headless rendering surface.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    capability: SurfaceCapability,
    viewport_width: usize,
    next_id: u64,
    overrides: MarkerTree<DisplayOverride>,
    invisible: MarkerTree<()>,
    override_limit: Option<usize>,
    invisibility_supported: bool,
}

impl MemorySurface {
    /// Create an empty surface.
    pub fn new(capability: SurfaceCapability, viewport_width: usize) -> Self {
        Self {
            capability,
            viewport_width,
            next_id: 1,
            overrides: MarkerTree::new(),
            invisible: MarkerTree::new(),
            override_limit: None,
            invisibility_supported: true,
        }
    }

    /// Change the viewport width (e.g. the window was resized).
    pub fn set_viewport_width(&mut self, width: usize) {
        self.viewport_width = width;
    }

    /// Reject overrides once `limit` are installed (`None`: unlimited).
    pub fn set_override_limit(&mut self, limit: Option<usize>) {
        self.override_limit = limit;
    }

    /// Make [`DisplaySurface::hide_text`] fail when `false`.
    pub fn set_invisibility_supported(&mut self, supported: bool) {
        self.invisibility_supported = supported;
    }

    /// Move markers to follow a text edit.
    pub fn apply_edit(&mut self, edit: &TextEdit) {
        self.overrides.apply_edit(edit);
        self.invisible.apply_edit(edit);
    }

    /// Number of installed overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Number of invisible ranges.
    pub fn invisible_count(&self) -> usize {
        self.invisible.len()
    }

    /// Installed overrides in position order.
    pub fn overrides(&self) -> impl Iterator<Item = (Range<usize>, &DisplayOverride)> {
        self.overrides.iter().map(|m| (m.start..m.end, &m.value))
    }

    /// Invisible ranges in position order.
    pub fn invisible_ranges(&self) -> Vec<Range<usize>> {
        self.invisible.iter().map(|m| m.start..m.end).collect()
    }

    /// Render `text` as displayed: invisible ranges dropped, overrides replaced by their
    /// rule text.
    pub fn render(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut skip_until = 0usize;

        for (pos, ch) in text.chars().enumerate() {
            if pos < skip_until || self.is_invisible(pos) {
                continue;
            }
            if let Some(marker) = self.overrides.query_point(pos).next() {
                out.push_str(&marker.value.rule_text);
                skip_until = marker.end;
                continue;
            }
            out.push(ch);
        }

        out
    }

    fn allocate_id(&mut self) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl DisplaySurface for MemorySurface {
    fn capability(&self) -> SurfaceCapability {
        self.capability
    }

    fn viewport_width(&self) -> usize {
        self.viewport_width
    }

    fn install_override(
        &mut self,
        range: Range<usize>,
        display: &DisplayOverride,
    ) -> Result<MarkerId, HostError> {
        if self
            .override_limit
            .is_some_and(|limit| self.overrides.len() >= limit)
        {
            return Err(HostError::OverrideUnavailable(format!(
                "surface accepts at most {} overrides",
                self.overrides.len()
            )));
        }

        let id = self.allocate_id();
        self.overrides.insert(Marker {
            id,
            start: range.start,
            end: range.end,
            value: display.clone(),
        });
        Ok(id)
    }

    fn remove_override(&mut self, id: MarkerId) {
        self.overrides.remove(id);
    }

    fn hide_text(&mut self, range: Range<usize>) -> Result<MarkerId, HostError> {
        if !self.invisibility_supported {
            return Err(HostError::InvisibilityUnavailable(
                "surface cannot hide text".to_string(),
            ));
        }

        let id = self.allocate_id();
        self.invisible.insert(Marker {
            id,
            start: range.start,
            end: range.end,
            value: (),
        });
        Ok(id)
    }

    fn reveal_text(&mut self, id: MarkerId) {
        self.invisible.remove(id);
    }

    fn is_invisible(&self, pos: usize) -> bool {
        self.invisible.query_point(pos).next().is_some()
    }
}
