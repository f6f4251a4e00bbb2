//! Section fold controller.
//!
//! A *section* runs from one delimiter to the line before the next delimiter (or the end of
//! the buffer). Folding a section hides its body but keeps the delimiter line and any
//! comment lines right after it visible, so the comments act as the section's title.
//!
//! Only hidden sections are stored. A [`FoldRange`] exists exactly while its body is
//! invisible; showing a section destroys the range. Any edit touching
//! `[outer_start, end]` destroys the range immediately, so hidden text can never go stale
//! relative to the buffer.

use tracing::{debug, trace, warn};

use crate::edit::TextEdit;
use crate::error::{HostError, PageRuleError};
use crate::host::{BufferView, CommentPredicate, DisplaySurface, MarkerId};
use crate::scanner::{DelimiterPattern, DelimiterSpan, scan_back};
use crate::text::Lines;

/// Geometry of one section, computed from a fresh scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Start of the delimiter (0 for the text before the first delimiter).
    pub outer_start: usize,
    /// Start of the hideable body, after the title line and header comments.
    pub inner_start: usize,
    /// End of the hideable body (exclusive): the newline before the next delimiter's line,
    /// or the buffer end.
    pub end: usize,
    /// Start of the next delimiter, or the buffer end.
    pub extent_end: usize,
}

impl Section {
    /// Returns `true` if there is any text to hide.
    pub fn has_body(&self) -> bool {
        self.inner_start < self.end
    }

    /// Returns `true` if `pos` lies in the closed extent `[outer_start, extent_end]`.
    ///
    /// A position on the boundary between two sections belongs to both.
    pub fn contains(&self, pos: usize) -> bool {
        self.outer_start <= pos && pos <= self.extent_end
    }
}

/// A hidden section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRange {
    /// Start of the delimiter that opens the section.
    pub outer_start: usize,
    /// Start of the hidden text. `[outer_start, inner_start)` stays visible.
    pub inner_start: usize,
    /// End of the hidden text (exclusive).
    pub end: usize,
    marker: MarkerId,
}

impl FoldRange {
    /// The invisible part of the section.
    pub fn hidden_range(&self) -> std::ops::Range<usize> {
        self.inner_start..self.end
    }

    /// Returns `true` if `pos` lies in the closed span `[outer_start, end]`.
    pub fn contains(&self, pos: usize) -> bool {
        self.outer_start <= pos && pos <= self.end
    }

    fn matches(&self, section: &Section) -> bool {
        self.outer_start == section.outer_start
            && self.inner_start == section.inner_start
            && self.end == section.end
    }
}

/// Result of [`FoldController::toggle_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A new range was created.
    Hidden(FoldRange),
    /// The range containing the position was destroyed.
    Shown(FoldRange),
    /// The section has no body to hide.
    Unchanged,
}

/// Compute the section opened by `delimiter` (`None`: the text before the first delimiter).
fn section_for(
    lines: &Lines<'_>,
    pattern: &DelimiterPattern,
    delimiter: Option<DelimiterSpan>,
    comments: &dyn CommentPredicate,
) -> Section {
    let (outer_start, search_from) = delimiter.map_or((0, 0), |span| (span.start, span.end));
    // The title is the line holding the delimiter's last character (or the first line).
    let title_end = lines.line_end(delimiter.map_or(0, |span| span.end.max(span.start + 1) - 1));

    let next = pattern.find_from(lines.text(), lines.index(), search_from);
    let extent_end = next.map_or(lines.char_count(), |span| span.start);
    let end = next
        .map_or(lines.char_count(), |span| {
            lines.line_start(span.start).saturating_sub(1)
        })
        .max(title_end);

    let mut inner_start = title_end;
    while let Some(line) = lines.next_line_start(inner_start) {
        if line >= end || !comments.is_comment_line(lines.line_text(line)) {
            break;
        }
        inner_start = lines.line_end(line);
    }

    Section {
        outer_start,
        inner_start: inner_start.min(end),
        end,
        extent_end,
    }
}

/// Owns the hidden sections of one buffer.
#[derive(Debug, Clone)]
pub struct FoldController {
    pattern: DelimiterPattern,
    /// Sorted by `outer_start`, pairwise disjoint.
    ranges: Vec<FoldRange>,
}

impl FoldController {
    /// Create a controller with no hidden sections.
    pub fn new(pattern: DelimiterPattern) -> Self {
        Self {
            pattern,
            ranges: Vec::new(),
        }
    }

    /// Hidden sections in position order.
    pub fn ranges(&self) -> &[FoldRange] {
        &self.ranges
    }

    /// Number of hidden sections.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if nothing is hidden.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The hidden section whose `[outer_start, end]` contains `pos`.
    pub fn range_at(&self, pos: usize) -> Option<&FoldRange> {
        self.index_at(pos).map(|idx| &self.ranges[idx])
    }

    /// Returns `true` if the character at `pos` is currently hidden.
    pub fn is_hidden(&self, pos: usize) -> bool {
        self.range_at(pos)
            .is_some_and(|range| range.hidden_range().contains(&pos))
    }

    /// The section containing `pos`, from a fresh scan of `text`.
    ///
    /// Searches backward for the nearest delimiter starting at or before `pos`; without one,
    /// the section is the text before the first delimiter and its first line is the title.
    pub fn section_at(&self, text: &str, pos: usize, comments: &dyn CommentPredicate) -> Section {
        let delimiter = scan_back(text, &self.pattern, pos);
        section_for(&Lines::new(text), &self.pattern, delimiter, comments)
    }

    /// Hide every delimited section except the one(s) containing the cursor.
    ///
    /// Existing ranges are dropped first, so calling this twice yields the same ranges.
    /// Returns the number of hidden sections.
    pub fn hide_all(
        &mut self,
        view: BufferView<'_>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<usize, HostError> {
        self.show_all(surface);

        let lines = Lines::new(view.text);
        let mut sections = Vec::new();
        let mut from = 0;
        while let Some(span) = self.pattern.find_from(view.text, lines.index(), from) {
            sections.push(section_for(&lines, &self.pattern, Some(span), view.comments));
            from = span.end;
        }

        for section in sections {
            if section.contains(view.cursor) || !section.has_body() {
                continue;
            }
            self.insert_hidden(section, surface)?;
        }

        debug!(hidden = self.ranges.len(), cursor = view.cursor, "sections hidden");
        Ok(self.ranges.len())
    }

    /// Show every hidden section. Idempotent.
    pub fn show_all(&mut self, surface: &mut dyn DisplaySurface) {
        if self.ranges.is_empty() {
            return;
        }
        let count = self.ranges.len();
        for range in self.ranges.drain(..) {
            surface.reveal_text(range.marker);
        }
        debug!(shown = count, "sections shown");
    }

    /// Show the section hidden at `pos`, or hide the section containing `pos`.
    pub fn toggle_at(
        &mut self,
        view: BufferView<'_>,
        pos: usize,
        surface: &mut dyn DisplaySurface,
    ) -> Result<ToggleOutcome, HostError> {
        if let Some(idx) = self.index_at(pos) {
            let range = self.ranges.remove(idx);
            surface.reveal_text(range.marker);
            return Ok(ToggleOutcome::Shown(range));
        }

        let section = self.section_at(view.text, pos, view.comments);
        if !section.has_body() {
            return Ok(ToggleOutcome::Unchanged);
        }
        let range = self.insert_hidden(section, surface)?;
        Ok(ToggleOutcome::Hidden(range))
    }

    /// Show the section starting at `outer_start`. Returns `false` if it was not hidden.
    pub fn show(&mut self, outer_start: usize, surface: &mut dyn DisplaySurface) -> bool {
        let Some(idx) = self.ranges.iter().position(|r| r.outer_start == outer_start) else {
            return false;
        };
        let range = self.ranges.remove(idx);
        surface.reveal_text(range.marker);
        true
    }

    /// Resynchronize after a text change; `view.text` is the post-edit buffer.
    ///
    /// Ranges touched by `edit` are destroyed, the rest move with the text and are then
    /// checked against a fresh scan. Without an edit range every hidden section is shown.
    pub fn on_edit(
        &mut self,
        view: BufferView<'_>,
        edit: Option<&TextEdit>,
        surface: &mut dyn DisplaySurface,
    ) {
        if self.ranges.is_empty() {
            return;
        }
        let Some(edit) = edit else {
            self.show_all(surface);
            return;
        };

        let before = self.ranges.len();
        self.ranges.retain_mut(|range| {
            if edit.touches(range.outer_start, range.end) {
                surface.reveal_text(range.marker);
                return false;
            }
            range.outer_start = edit.map_position(range.outer_start);
            range.inner_start = edit.map_position(range.inner_start);
            range.end = edit.map_position(range.end);
            true
        });

        let invalidated = before - self.ranges.len();
        if invalidated > 0 {
            trace!(invalidated, start = edit.start, "edit revealed hidden sections");
        }

        self.reconcile(view, surface);
    }

    fn index_at(&self, pos: usize) -> Option<usize> {
        let idx = self.ranges.partition_point(|r| r.outer_start <= pos);
        let idx = idx.checked_sub(1)?;
        self.ranges[idx].contains(pos).then_some(idx)
    }

    fn insert_hidden(
        &mut self,
        section: Section,
        surface: &mut dyn DisplaySurface,
    ) -> Result<FoldRange, HostError> {
        let marker = surface.hide_text(section.inner_start..section.end)?;
        let range = FoldRange {
            outer_start: section.outer_start,
            inner_start: section.inner_start,
            end: section.end,
            marker,
        };

        let mut idx = 0;
        while idx < self.ranges.len() {
            let other = &self.ranges[idx];
            if other.outer_start <= range.end && range.outer_start <= other.end {
                let other = self.ranges.remove(idx);
                Self::discard(other, surface);
            } else {
                idx += 1;
            }
        }

        let pos = self
            .ranges
            .partition_point(|r| r.outer_start < range.outer_start);
        self.ranges.insert(pos, range.clone());
        Ok(range)
    }

    /// Drop ranges that no longer describe a section of `view.text`.
    fn reconcile(&mut self, view: BufferView<'_>, surface: &mut dyn DisplaySurface) {
        let lines = Lines::new(view.text);
        let mut kept: Vec<FoldRange> = Vec::with_capacity(self.ranges.len());

        for range in std::mem::take(&mut self.ranges) {
            let delimiter = self
                .pattern
                .find_from(view.text, lines.index(), range.outer_start)
                .filter(|span| span.start == range.outer_start);
            let section = match delimiter {
                Some(span) => Some(section_for(&lines, &self.pattern, Some(span), view.comments)),
                None if range.outer_start == 0 => {
                    Some(section_for(&lines, &self.pattern, None, view.comments))
                }
                None => None,
            };

            let overlaps = kept
                .last()
                .is_some_and(|prev| prev.end >= range.outer_start);
            if overlaps || !section.is_some_and(|section| range.matches(&section)) {
                Self::discard(range, surface);
                continue;
            }
            kept.push(range);
        }

        self.ranges = kept;
    }

    fn discard(range: FoldRange, surface: &mut dyn DisplaySurface) {
        let err = PageRuleError::InconsistentRangeState {
            outer_start: range.outer_start,
        };
        warn!(error = %err, "discarding fold range");
        surface.reveal_text(range.marker);
    }
}
