//! Capability interfaces the host environment implements.
//!
//! The core never assumes a rendering pipeline. It only needs to attach/remove a rule
//! override and an invisibility marker on a character range, plus a few probes.

use std::ops::Range;

use page_rule_lang::CommentConfig;

use crate::error::HostError;
use crate::overrides::DisplayOverride;

/// Handle to a marker (override or invisible range) installed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

impl MarkerId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What the rendering surface can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceCapability {
    /// Pixel-based surface (GUI window).
    #[default]
    Graphical,
    /// Character-cell terminal.
    TextOnly,
}

/// Display primitives supplied by the host for one buffer.
///
/// Markers are owned by the surface once installed: the surface keeps their positions in
/// step with its own text. The core only holds the returned [`MarkerId`]s.
pub trait DisplaySurface {
    /// Graphical vs text-only rendering.
    fn capability(&self) -> SurfaceCapability;

    /// Current width of the text area in cells.
    fn viewport_width(&self) -> usize;

    /// Render `range` with `display` instead of its literal characters.
    fn install_override(
        &mut self,
        range: Range<usize>,
        display: &DisplayOverride,
    ) -> Result<MarkerId, HostError>;

    /// Remove a previously installed override. Unknown ids are ignored.
    fn remove_override(&mut self, id: MarkerId);

    /// Stop rendering the text in `range`.
    fn hide_text(&mut self, range: Range<usize>) -> Result<MarkerId, HostError>;

    /// Render a previously hidden range again. Unknown ids are ignored.
    fn reveal_text(&mut self, id: MarkerId);

    /// Returns `true` if `pos` falls inside an invisible range.
    fn is_invisible(&self, pos: usize) -> bool;
}

/// The language mode's "line starts a comment" test, used to find section titles.
pub trait CommentPredicate {
    /// `line` excludes its terminator.
    fn is_comment_line(&self, line: &str) -> bool;
}

impl CommentPredicate for CommentConfig {
    fn is_comment_line(&self, line: &str) -> bool {
        CommentConfig::is_comment_line(self, line)
    }
}

impl<F> CommentPredicate for F
where
    F: Fn(&str) -> bool,
{
    fn is_comment_line(&self, line: &str) -> bool {
        self(line)
    }
}

/// Read-only view of a buffer handed to the mode for one operation.
#[derive(Clone, Copy)]
pub struct BufferView<'a> {
    /// Full buffer text.
    pub text: &'a str,
    /// Cursor (edit point) character offset.
    pub cursor: usize,
    /// Header detection for section folding.
    pub comments: &'a dyn CommentPredicate,
}

impl<'a> BufferView<'a> {
    /// Create a view over `text`.
    pub fn new(text: &'a str, cursor: usize, comments: &'a dyn CommentPredicate) -> Self {
        Self {
            text,
            cursor,
            comments,
        }
    }
}

impl std::fmt::Debug for BufferView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferView")
            .field("len", &self.text.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
