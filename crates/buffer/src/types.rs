// Chunk: docs/chunks/style_runs - Run and damaged-range value types

use std::ops::Range;

use crate::attribute_map::AttributeMap;

/// A maximal span of characters sharing one style, as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRun {
    pub start: usize,
    pub limit: usize,
    pub style: AttributeMap,
}

impl StyleRun {
    pub fn new(start: usize, limit: usize, style: AttributeMap) -> Self {
        Self { start, limit, style }
    }

    pub fn len(&self) -> usize {
        self.limit - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.limit
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.limit
    }
}

/// The span of text whose characters or styles changed since the last reset.
///
/// Used by the layout layer to decide what to re-measure. An empty range has
/// `start == usize::MAX` and `limit == 0`, so the first widening replaces it.
/// A collapsed range (`start == limit`) is still damage: text was deleted at
/// `start` and layout must reflow from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamagedRange {
    start: usize,
    limit: usize,
}

impl DamagedRange {
    pub fn new(start: usize, limit: usize) -> Self {
        Self { start, limit }
    }

    /// The identity element for [`merge`](Self::merge).
    pub fn empty() -> Self {
        Self {
            start: usize::MAX,
            limit: 0,
        }
    }

    /// Returns true if nothing is damaged.
    pub fn is_empty(&self) -> bool {
        self.start > self.limit
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the damaged span, or `None` if nothing changed.
    ///
    /// After a pure deletion the span may be empty (`start..start`).
    pub fn range(&self) -> Option<Range<usize>> {
        if self.is_empty() {
            None
        } else {
            Some(self.start..self.limit)
        }
    }

    /// Lowers the start to cover `pos`.
    pub(crate) fn extend_start(&mut self, pos: usize) {
        self.start = self.start.min(pos);
    }

    /// Raises the limit to cover everything before `pos`.
    pub(crate) fn extend_limit(&mut self, pos: usize) {
        self.limit = self.limit.max(pos);
    }

    /// Merges another damaged range into this one, producing the smallest
    /// range that covers both.
    pub fn merge(&mut self, other: DamagedRange) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }
        self.start = self.start.min(other.start);
        self.limit = self.limit.max(other.limit);
    }

    /// Accounts for replacing `[delete_start, delete_limit)` with
    /// `insert_len` characters.
    ///
    /// A limit at or past the deleted span moves with the length change;
    /// otherwise the range now ends where the insertion does.
    pub fn update(&mut self, delete_start: usize, delete_limit: usize, insert_len: usize) {
        self.start = self.start.min(delete_start);
        if self.limit >= delete_limit {
            self.limit = self.limit - (delete_limit - delete_start) + insert_len;
        } else {
            self.limit = delete_start + insert_len;
        }
    }
}

impl Default for DamagedRange {
    fn default() -> Self {
        Self::empty()
    }
}
