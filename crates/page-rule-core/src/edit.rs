//! Edit descriptors delivered by the host.
//!
//! Every text mutation reaches the core as one [`TextEdit`], expressed in **character
//! offsets** (Unicode scalar values) against the document as it was *before* the edit.
//! Derived state (overrides, fold ranges, surface markers) uses [`TextEdit::map_position`]
//! to move its anchors into the post-edit coordinate space.

use std::ops::Range;

/// A single text mutation: `deleted_len` characters at `start` were replaced by
/// `inserted_len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// Start character offset of the edit (pre-edit coordinates).
    pub start: usize,
    /// Number of characters removed at `start`.
    pub deleted_len: usize,
    /// Number of characters inserted at `start`.
    pub inserted_len: usize,
}

impl TextEdit {
    /// Pure insertion of `len` characters at `start`.
    pub fn insert(start: usize, len: usize) -> Self {
        Self {
            start,
            deleted_len: 0,
            inserted_len: len,
        }
    }

    /// Pure deletion of the pre-edit range `range`.
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            deleted_len: range.end.saturating_sub(range.start),
            inserted_len: 0,
        }
    }

    /// Replacement of the pre-edit range `range` by `inserted_len` characters.
    pub fn replace(range: Range<usize>, inserted_len: usize) -> Self {
        Self {
            start: range.start,
            deleted_len: range.end.saturating_sub(range.start),
            inserted_len,
        }
    }

    /// Exclusive end character offset in the pre-edit document.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len)
    }

    /// Exclusive end of the inserted text in the post-edit document.
    pub fn inserted_end(&self) -> usize {
        self.start.saturating_add(self.inserted_len)
    }

    /// Returns `true` if the edit changes nothing.
    pub fn is_noop(&self) -> bool {
        self.deleted_len == 0 && self.inserted_len == 0
    }

    /// Returns `true` if the edit touches the closed pre-edit span `[start, end]`.
    ///
    /// Insertions exactly at either boundary count as touching.
    pub fn touches(&self, start: usize, end: usize) -> bool {
        self.start <= end && self.end() >= start
    }

    /// Map a pre-edit position into post-edit coordinates.
    ///
    /// Positions inside the deleted range collapse onto the edit start; positions at or after
    /// the deleted range shift by the net length change.
    pub fn map_position(&self, pos: usize) -> usize {
        if pos < self.start {
            pos
        } else if pos < self.end() {
            self.start
        } else {
            pos - self.deleted_len + self.inserted_len
        }
    }
}
