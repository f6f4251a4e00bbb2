//! Reference host: one buffer with its surface and its own page rule mode.

use std::ops::Range;

use page_rule_lang::CommentConfig;
use ropey::Rope;

use crate::config::PageRuleConfig;
use crate::edit::TextEdit;
use crate::error::PageRuleError;
use crate::folding::ToggleOutcome;
use crate::host::{BufferView, SurfaceCapability};
use crate::mode::PageRuleMode;
use crate::overrides::CursorMotion;
use crate::surface::MemorySurface;

/// Default viewport width for documents created without an explicit surface.
pub const DEFAULT_VIEWPORT_WIDTH: usize = 80;

/// A text buffer wired to a [`PageRuleMode`].
///
/// Every edit is applied to the text, then to the surface markers, then delivered to the
/// mode before the edit method returns.
#[derive(Debug)]
pub struct Document {
    rope: Rope,
    cursor: usize,
    language_id: Option<String>,
    comments: CommentConfig,
    surface: MemorySurface,
    mode: PageRuleMode,
}

impl Document {
    /// Create a document on a graphical surface [`DEFAULT_VIEWPORT_WIDTH`] cells wide.
    pub fn new(text: &str, config: PageRuleConfig) -> Self {
        Self::with_surface(
            text,
            config,
            MemorySurface::new(SurfaceCapability::Graphical, DEFAULT_VIEWPORT_WIDTH),
        )
    }

    /// Create a document rendering onto `surface`.
    pub fn with_surface(text: &str, config: PageRuleConfig, surface: MemorySurface) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: 0,
            language_id: None,
            comments: CommentConfig::default(),
            surface,
            mode: PageRuleMode::new(config),
        }
    }

    /// Set the language id, picking up its built-in comment syntax when known.
    pub fn set_language(&mut self, language_id: &str) {
        if let Some(comments) = CommentConfig::for_language(language_id) {
            self.comments = comments;
        }
        self.language_id = Some(language_id.to_string());
    }

    /// Override the comment syntax used for section titles.
    pub fn set_comments(&mut self, comments: CommentConfig) {
        self.comments = comments;
    }

    /// The language id, if set.
    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    /// Full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Cursor character offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to `pos` and return where it ended up.
    pub fn move_cursor(&mut self, pos: usize, motion: CursorMotion) -> usize {
        let next = pos.min(self.char_count());
        self.cursor = self
            .mode
            .adjust_cursor(self.cursor, next, motion)
            .min(self.char_count());
        self.cursor
    }

    /// Insert `text` at `pos`.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<(), PageRuleError> {
        let pos = pos.min(self.char_count());
        self.replace(pos..pos, text)
    }

    /// Delete the characters in `range`.
    pub fn delete(&mut self, range: Range<usize>) -> Result<(), PageRuleError> {
        self.replace(range, "")
    }

    /// Replace the characters in `range` with `text`.
    ///
    /// The text change is always applied. An `Err` only reports that the surface failed
    /// while the mode resynced, after which the mode is off; do not retry the edit.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), PageRuleError> {
        let len = self.char_count();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        let edit = TextEdit::replace(start..end, text.chars().count());
        if edit.is_noop() {
            return Ok(());
        }

        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.cursor = edit.map_position(self.cursor);
        self.surface.apply_edit(&edit);

        let snapshot = self.rope.to_string();
        let view = BufferView::new(&snapshot, self.cursor, &self.comments);
        self.mode.handle_edit(view, Some(&edit), &mut self.surface)
    }

    /// Turn the mode on for this buffer.
    pub fn enable_mode(&mut self) -> Result<(), PageRuleError> {
        let snapshot = self.rope.to_string();
        let view = BufferView::new(&snapshot, self.cursor, &self.comments);
        self.mode.enable(view, &mut self.surface)
    }

    /// Turn the mode off for this buffer.
    pub fn disable_mode(&mut self) {
        self.mode.disable(&mut self.surface);
    }

    /// Fold or unfold the section at `pos`.
    pub fn toggle_section_at(&mut self, pos: usize) -> Result<ToggleOutcome, PageRuleError> {
        let snapshot = self.rope.to_string();
        let view = BufferView::new(&snapshot, self.cursor, &self.comments);
        self.mode.toggle_section_at(view, pos, &mut self.surface)
    }

    /// Fold every section except the cursor's.
    pub fn hide_all_sections(&mut self) -> Result<usize, PageRuleError> {
        let snapshot = self.rope.to_string();
        let view = BufferView::new(&snapshot, self.cursor, &self.comments);
        self.mode.hide_all_sections(view, &mut self.surface)
    }

    /// Unfold every section.
    pub fn show_all_sections(&mut self) {
        self.mode.show_all_sections(&mut self.surface);
    }

    /// Unfold the section starting at `outer_start`.
    pub fn show_section(&mut self, outer_start: usize) -> bool {
        self.mode.show_section(outer_start, &mut self.surface)
    }

    /// Change the viewport width and redraw rules.
    pub fn resize_viewport(&mut self, width: usize) -> Result<(), PageRuleError> {
        self.surface.set_viewport_width(width);
        self.mode.on_viewport_resized(&mut self.surface)
    }

    /// The buffer's mode.
    pub fn mode(&self) -> &PageRuleMode {
        &self.mode
    }

    /// The buffer's surface.
    pub fn surface(&self) -> &MemorySurface {
        &self.surface
    }

    /// Mutable access to the surface (e.g. to simulate host failures).
    pub fn surface_mut(&mut self) -> &mut MemorySurface {
        &mut self.surface
    }

    /// The text as the surface would display it.
    pub fn rendered(&self) -> String {
        self.surface.render(&self.text())
    }
}
