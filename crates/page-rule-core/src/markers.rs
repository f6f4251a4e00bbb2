//! Position-keyed marker storage for host surfaces.
//!
//! Markers are kept sorted by start offset next to a running maximum of their end offsets,
//! so a point query is two binary searches plus a scan over the candidates. Each marker
//! carries an id so its owner can remove it after edits have moved it.

use crate::edit::TextEdit;
use crate::host::MarkerId;

/// A half-open `[start, end)` character range tagged with an id and a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<T> {
    /// Id handed back to the marker's owner.
    pub id: MarkerId,
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Payload.
    pub value: T,
}

impl<T> Marker<T> {
    /// Check if the marker contains a specific position.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Markers kept sorted by start position.
#[derive(Debug, Clone)]
pub struct MarkerTree<T> {
    markers: Vec<Marker<T>>,
    /// `reach[i]` is the furthest end among `markers[..=i]`; non-decreasing.
    reach: Vec<usize>,
}

impl<T> MarkerTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            reach: Vec::new(),
        }
    }

    /// Insert a marker after any marker with the same start.
    pub fn insert(&mut self, marker: Marker<T>) {
        let idx = self.markers.partition_point(|m| m.start <= marker.start);
        self.markers.insert(idx, marker);
        self.refresh_reach(idx);
    }

    /// Remove the marker with `id`, returning it if present.
    pub fn remove(&mut self, id: MarkerId) -> Option<Marker<T>> {
        let idx = self.markers.iter().position(|m| m.id == id)?;
        let marker = self.markers.remove(idx);
        self.refresh_reach(idx);
        Some(marker)
    }

    /// Markers containing `pos`, in start order.
    pub fn query_point(&self, pos: usize) -> impl Iterator<Item = &Marker<T>> {
        let upper = self.markers.partition_point(|m| m.start <= pos);
        let lower = self.reach.partition_point(|&end| end <= pos).min(upper);
        self.markers[lower..upper]
            .iter()
            .filter(move |m| m.contains(pos))
    }

    /// Iterate markers in start order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker<T>> {
        self.markers.iter()
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Move markers to follow `edit`.
    ///
    /// Markers lying entirely inside the deleted range are dropped. Text inserted at a
    /// marker's start lands before it; text inserted strictly inside it widens it.
    pub fn apply_edit(&mut self, edit: &TextEdit) {
        let (del_start, del_end) = (edit.start, edit.end());
        let clamp = |pos: usize| {
            if pos <= del_start {
                pos
            } else if pos >= del_end {
                pos - edit.deleted_len
            } else {
                del_start
            }
        };

        self.markers.retain_mut(|marker| {
            if edit.deleted_len > 0 && del_start <= marker.start && marker.end <= del_end {
                return false;
            }
            marker.start = clamp(marker.start);
            marker.end = clamp(marker.end);
            if marker.start >= del_start {
                marker.start += edit.inserted_len;
            }
            if marker.end > del_start {
                marker.end += edit.inserted_len;
            }
            true
        });
        self.refresh_reach(0);
    }

    fn refresh_reach(&mut self, from: usize) {
        self.reach.truncate(from);
        let mut furthest = self.reach.last().copied().unwrap_or(0);
        for marker in &self.markers[from..] {
            furthest = furthest.max(marker.end);
            self.reach.push(furthest);
        }
    }
}

impl<T> Default for MarkerTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: u64, start: usize, end: usize) -> Marker<()> {
        Marker {
            id: MarkerId(id),
            start,
            end,
            value: (),
        }
    }

    fn bounds(tree: &MarkerTree<()>) -> Vec<(u64, usize, usize)> {
        tree.iter().map(|m| (m.id.get(), m.start, m.end)).collect()
    }

    fn ids_at(tree: &MarkerTree<()>, pos: usize) -> Vec<u64> {
        tree.query_point(pos).map(|m| m.id.get()).collect()
    }

    #[test]
    fn test_query_point_with_nested_markers() {
        let mut tree = MarkerTree::new();
        tree.insert(marker(1, 0, 40));
        tree.insert(marker(2, 10, 20));
        tree.insert(marker(3, 25, 30));

        assert_eq!(ids_at(&tree, 12), vec![1, 2]);
        assert_eq!(ids_at(&tree, 22), vec![1]);
        assert_eq!(ids_at(&tree, 27), vec![1, 3]);
        assert!(ids_at(&tree, 40).is_empty());
    }

    #[test]
    fn test_remove_by_id_after_shift() {
        let mut tree = MarkerTree::new();
        tree.insert(marker(1, 10, 20));
        tree.insert(marker(2, 30, 40));

        tree.apply_edit(&TextEdit::insert(0, 5));
        assert_eq!(bounds(&tree), vec![(1, 15, 25), (2, 35, 45)]);

        assert!(tree.remove(MarkerId(1)).is_some());
        assert!(tree.remove(MarkerId(1)).is_none());
        assert_eq!(tree.len(), 1);
        assert_eq!(ids_at(&tree, 36), vec![2]);
        assert!(ids_at(&tree, 25).is_empty());
    }

    #[test]
    fn test_deletion_drops_swallowed_markers() {
        let mut tree = MarkerTree::new();
        tree.insert(marker(1, 10, 20));
        tree.insert(marker(2, 30, 40));
        tree.insert(marker(3, 50, 60));

        tree.apply_edit(&TextEdit::delete(25..45));
        assert_eq!(bounds(&tree), vec![(1, 10, 20), (3, 30, 40)]);
    }

    #[test]
    fn test_partial_deletion_clamps() {
        let mut tree = MarkerTree::new();
        tree.insert(marker(1, 10, 20));
        tree.insert(marker(2, 30, 40));

        tree.apply_edit(&TextEdit::delete(15..35));
        assert_eq!(bounds(&tree), vec![(1, 10, 15), (2, 15, 20)]);
    }

    #[test]
    fn test_insertion_at_edges() {
        let mut tree = MarkerTree::new();
        tree.insert(marker(1, 10, 20));

        tree.apply_edit(&TextEdit::insert(15, 5));
        assert_eq!(bounds(&tree), vec![(1, 10, 25)]);
        tree.apply_edit(&TextEdit::insert(25, 1));
        assert_eq!(bounds(&tree), vec![(1, 10, 25)]);
        tree.apply_edit(&TextEdit::insert(10, 2));
        assert_eq!(bounds(&tree), vec![(1, 12, 27)]);
    }
}
