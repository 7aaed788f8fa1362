// Chunk: docs/chunks/run_array - Dual-region run boundary table

//! Run boundary table for the style buffer.
//!
//! Records are `(start, style)` pairs kept in one array with a gap in the
//! middle, the run-table analogue of the character gap buffer:
//!
//! ```text
//! [ positive region | gap | negative region ]
//!   0 .. pos_len            neg_start .. capacity
//! ```
//!
//! Positive entries hold run starts as offsets from the beginning of the text.
//! Negative entries hold run starts relative to the current end of the text,
//! so inserting or deleting characters at the gap only adjusts `text_len` and
//! never rewrites a boundary. Moving the edit point moves records across the
//! gap, converting them between the two encodings.
//!
//! Boundary and style live in the same record, so the style table is
//! index-parallel with the boundaries by construction.

use crate::attribute_map::AttributeMap;
use crate::error::{inconsistent, Result};
use crate::types::StyleRun;

/// One slot of the run table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Run {
    /// Raw run start: absolute in the positive region, `offset - text_len`
    /// in the negative region.
    pub(crate) start: isize,
    pub(crate) style: AttributeMap,
}

impl Run {
    pub(crate) fn new(start: isize, style: AttributeMap) -> Self {
        Self { start, style }
    }

    /// Filler for slots inside the gap.
    fn vacant() -> Self {
        Self::new(0, AttributeMap::empty())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RunArray {
    slots: Vec<Run>,
    /// Number of records in the positive region.
    pos_len: usize,
    /// First slot of the negative region; equals `slots.len()` when it is empty.
    neg_start: usize,
    /// The length negative entries are relative to.
    text_len: usize,
}

impl RunArray {
    /// Creates a table with a single run starting at 0.
    pub(crate) fn new(capacity: usize, text_len: usize, style: AttributeMap) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.push(Run::new(0, style));
        slots.resize_with(capacity, Run::vacant);
        Self {
            slots,
            pos_len: 1,
            neg_start: capacity,
            text_len,
        }
    }

    // ==================== Accessors ====================

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn text_len(&self) -> usize {
        self.text_len
    }

    pub(crate) fn pos_len(&self) -> usize {
        self.pos_len
    }

    pub(crate) fn neg_start(&self) -> usize {
        self.neg_start
    }

    /// Returns true if the negative region holds no records.
    pub(crate) fn negative_is_empty(&self) -> bool {
        self.neg_start == self.slots.len()
    }

    /// The last positive record. Empty only while a paste at offset 0 is
    /// refilling the positive region.
    pub(crate) fn last_positive(&self) -> Option<&Run> {
        self.pos_len.checked_sub(1).map(|i| &self.slots[i])
    }

    pub(crate) fn last_positive_mut(&mut self) -> Option<&mut Run> {
        self.pos_len.checked_sub(1).map(|i| &mut self.slots[i])
    }

    /// The first negative record, if any.
    pub(crate) fn first_negative(&self) -> Option<&Run> {
        self.slots.get(self.neg_start)
    }

    pub(crate) fn slot(&self, index: usize) -> &Run {
        &self.slots[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Run {
        &mut self.slots[index]
    }

    /// Logical offset where the text covered by the negative region begins,
    /// i.e. the end of the run at the top of the positive region.
    pub(crate) fn end_of_gap(&self) -> usize {
        match self.first_negative() {
            Some(run) => self.to_logical(run.start),
            None => self.text_len,
        }
    }

    fn to_logical(&self, raw_negative: isize) -> usize {
        self.text_len.saturating_add_signed(raw_negative)
    }

    fn to_raw_negative(&self, offset: usize) -> isize {
        offset as isize - self.text_len as isize
    }

    // ==================== Gap Movement ====================

    /// Moves records across the gap so the top of the positive region is the
    /// greatest boundary strictly below `pos`.
    ///
    /// Cost is proportional to the number of boundaries crossed.
    pub(crate) fn shift_table_to(&mut self, pos: usize) {
        let pos = pos as isize;
        let len = self.text_len as isize;
        let mut moved_down = 0usize;
        let mut moved_up = 0usize;

        while self.pos_len > 0 && self.slots[self.pos_len - 1].start >= pos {
            self.pos_len -= 1;
            self.neg_start -= 1;
            self.slots.swap(self.pos_len, self.neg_start);
            self.slots[self.neg_start].start -= len;
            moved_down += 1;
        }

        while self.neg_start < self.slots.len() && self.slots[self.neg_start].start < pos - len {
            self.slots[self.neg_start].start += len;
            self.slots.swap(self.neg_start, self.pos_len);
            self.pos_len += 1;
            self.neg_start += 1;
            moved_up += 1;
        }

        if moved_down + moved_up > 0 {
            tracing::trace!(pos, moved_down, moved_up, "shifted run table");
        }
    }

    /// Returns the physical index of the run whose span contains `pos`.
    pub(crate) fn find_run_containing(&self, pos: usize) -> Option<usize> {
        let relative = self.to_raw_negative(pos);
        match self.first_negative() {
            Some(first) if relative >= first.start => {
                let found = self.slots[self.neg_start..].partition_point(|run| run.start <= relative);
                Some(self.neg_start + found - 1)
            }
            _ => {
                let pos = pos as isize;
                let found = self.slots[..self.pos_len].partition_point(|run| run.start <= pos);
                found.checked_sub(1)
            }
        }
    }

    /// Converts the raw start at physical `index` to a logical offset.
    ///
    /// `index == capacity` stands for the end of the text.
    pub(crate) fn logical_start(&self, index: usize) -> Result<usize> {
        if index == self.slots.len() {
            Ok(self.text_len)
        } else if index < self.pos_len {
            usize::try_from(self.slots[index].start)
                .map_err(|_| inconsistent("negative start in positive region"))
        } else if index >= self.neg_start {
            Ok(self.to_logical(self.slots[index].start))
        } else {
            Err(inconsistent("run index inside the gap"))
        }
    }

    /// Adjusts the length negative entries are relative to.
    pub(crate) fn add_to_text_len(&mut self, delta: isize) {
        self.text_len = self.text_len.saturating_add_signed(delta);
    }

    // ==================== Record Edits ====================

    /// Appends a record to the positive region, growing if needed.
    pub(crate) fn push_positive(&mut self, run: Run) {
        self.expand_if_full();
        self.slots[self.pos_len] = run;
        self.pos_len += 1;
    }

    /// Prepends a record with logical start `offset` to the negative region.
    pub(crate) fn push_negative(&mut self, offset: usize, style: AttributeMap) {
        self.expand_if_full();
        self.neg_start -= 1;
        let start = self.to_raw_negative(offset);
        self.slots[self.neg_start] = Run::new(start, style);
    }

    /// Drops the first negative record, merging its span into the run before it.
    pub(crate) fn pop_negative(&mut self) -> Option<Run> {
        if self.negative_is_empty() {
            return None;
        }
        let run = std::mem::replace(&mut self.slots[self.neg_start], Run::vacant());
        self.neg_start += 1;
        Some(run)
    }

    /// Makes physical `index` the first negative record, dropping the ones before it.
    pub(crate) fn set_neg_start(&mut self, index: usize) {
        self.neg_start = index.min(self.slots.len());
    }

    /// Drops the whole negative region.
    pub(crate) fn clear_negative(&mut self) {
        self.neg_start = self.slots.len();
    }

    /// Empties the positive region; the caller refills it before returning.
    pub(crate) fn clear_positive(&mut self) {
        self.pos_len = 0;
    }

    // ==================== Capacity ====================

    pub(crate) fn expand_if_full(&mut self) {
        if self.pos_len == self.neg_start {
            self.expand();
        }
    }

    /// Doubles capacity, keeping both regions at their ends.
    pub(crate) fn expand(&mut self) {
        let new_capacity = (self.slots.len() * 2).max(1);
        self.resize(new_capacity);
        tracing::debug!(new_capacity, "run table expanded");
    }

    /// Shrinks to exactly the number of live records (at least one slot).
    pub(crate) fn compress(&mut self) {
        let live = self.run_count().max(1);
        if live != self.slots.len() {
            self.resize(live);
            tracing::debug!(capacity = live, "run table compressed");
        }
    }

    fn resize(&mut self, new_capacity: usize) {
        let old = std::mem::take(&mut self.slots);
        let negative = old.len() - self.neg_start;
        let gap = self.neg_start - self.pos_len;

        let mut slots = Vec::with_capacity(new_capacity);
        let mut records = old.into_iter();
        slots.extend(records.by_ref().take(self.pos_len));
        slots.resize_with(new_capacity - negative, Run::vacant);
        slots.extend(records.skip(gap));

        self.neg_start = new_capacity - negative;
        self.slots = slots;
    }

    // ==================== Logical View ====================

    /// Number of runs.
    pub(crate) fn run_count(&self) -> usize {
        self.pos_len + self.slots.len() - self.neg_start
    }

    /// Maps a logical run number to its slot. `run_count()` maps to `capacity`.
    pub(crate) fn physical_index(&self, k: usize) -> usize {
        if k < self.pos_len {
            k
        } else {
            self.neg_start + (k - self.pos_len)
        }
    }

    /// Maps a slot back to its logical run number.
    pub(crate) fn logical_index(&self, index: usize) -> usize {
        if index < self.pos_len {
            index
        } else {
            index - self.neg_start + self.pos_len
        }
    }

    /// Returns the `k`th run with logical bounds.
    pub(crate) fn run(&self, k: usize) -> Option<StyleRun> {
        if k >= self.run_count() {
            return None;
        }
        let index = self.physical_index(k);
        let start = self.logical_start(index).ok()?;
        let limit = self.logical_start(self.physical_index(k + 1)).ok()?;
        Some(StyleRun::new(start, limit, self.slots[index].style.clone()))
    }

    /// Verifies ordering, the leading zero boundary and the no-adjacent-duplicates rule.
    pub(crate) fn check_invariants(&self) -> Result<()> {
        if self.pos_len == 0 {
            return Err(inconsistent("positive region is empty"));
        }
        if self.slots[0].start != 0 {
            return Err(inconsistent("first run does not start at 0"));
        }

        let mut previous: Option<(usize, &AttributeMap)> = None;
        for k in 0..self.run_count() {
            let index = self.physical_index(k);
            let start = self.logical_start(index)?;
            let style = &self.slots[index].style;
            if let Some((prev_start, prev_style)) = previous {
                if start <= prev_start {
                    return Err(inconsistent("run starts are not strictly increasing"));
                }
                if prev_style == style {
                    return Err(inconsistent("adjacent runs share a style"));
                }
            }
            if start > self.text_len || (start == self.text_len && self.text_len > 0) {
                return Err(inconsistent("run starts at or past the end of text"));
            }
            previous = Some((start, style));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeKey;
    use crate::error::StorageError;

    fn style(weight: i64) -> AttributeMap {
        AttributeMap::new(AttributeKey::Weight, weight)
    }

    /// Builds a table for text of length `len` with runs at the given starts.
    fn table(len: usize, starts: &[(usize, i64)]) -> RunArray {
        let mut runs = RunArray::new(2, len, style(starts[0].1));
        for &(start, weight) in &starts[1..] {
            runs.push_positive(Run::new(start as isize, style(weight)));
        }
        runs
    }

    fn bounds(runs: &RunArray) -> Vec<(usize, usize)> {
        (0..runs.run_count())
            .filter_map(|k| runs.run(k))
            .map(|run| (run.start, run.limit))
            .collect()
    }

    #[test]
    fn test_new_has_single_run() {
        let runs = RunArray::new(10, 5, style(400));
        assert_eq!(runs.run_count(), 1);
        assert_eq!(runs.capacity(), 10);
        assert_eq!(bounds(&runs), vec![(0, 5)]);
        assert!(runs.check_invariants().is_ok());
    }

    #[test]
    fn test_push_positive_expands() {
        let runs = table(30, &[(0, 1), (10, 2), (20, 3)]);
        assert!(runs.capacity() >= 3);
        assert_eq!(bounds(&runs), vec![(0, 10), (10, 20), (20, 30)]);
    }

    #[test]
    fn test_shift_moves_records_into_negative_region() {
        let mut runs = table(30, &[(0, 1), (10, 2), (20, 3)]);
        runs.shift_table_to(10);
        assert_eq!(runs.pos_len(), 1);
        assert_eq!(runs.run_count(), 3);
        assert_eq!(runs.first_negative().map(|r| r.start), Some(-20));
        assert_eq!(runs.end_of_gap(), 10);
        // the logical view is unaffected by where the gap sits
        assert_eq!(bounds(&runs), vec![(0, 10), (10, 20), (20, 30)]);
    }

    #[test]
    fn test_shift_back_restores_positive_region() {
        let mut runs = table(30, &[(0, 1), (10, 2), (20, 3)]);
        runs.shift_table_to(1);
        assert_eq!(runs.pos_len(), 1);
        runs.shift_table_to(25);
        assert_eq!(runs.pos_len(), 3);
        assert!(runs.negative_is_empty());
        assert_eq!(bounds(&runs), vec![(0, 10), (10, 20), (20, 30)]);
    }

    #[test]
    fn test_negative_entries_follow_text_len() {
        let mut runs = table(30, &[(0, 1), (10, 2), (20, 3)]);
        runs.shift_table_to(5);
        runs.add_to_text_len(4);
        assert_eq!(bounds(&runs), vec![(0, 14), (14, 24), (24, 34)]);
    }

    #[test]
    fn test_find_run_containing_both_regions() {
        let mut runs = table(30, &[(0, 1), (10, 2), (20, 3)]);
        runs.shift_table_to(15);
        assert_eq!(runs.find_run_containing(0), Some(0));
        assert_eq!(runs.find_run_containing(9), Some(0));
        assert_eq!(runs.find_run_containing(10), Some(1));
        let third = runs.find_run_containing(20).unwrap();
        assert!(third >= runs.neg_start());
        assert_eq!(runs.logical_start(third), Ok(20));
        assert_eq!(runs.find_run_containing(30), Some(third));
    }

    #[test]
    fn test_logical_start_end_of_text() {
        let runs = table(30, &[(0, 1), (10, 2)]);
        assert_eq!(runs.logical_start(runs.capacity()), Ok(30));
    }

    #[test]
    fn test_logical_start_in_gap_is_inconsistent() {
        let runs = RunArray::new(4, 8, style(1));
        assert!(matches!(runs.logical_start(2), Err(StorageError::Inconsistent(_))));
    }

    #[test]
    fn test_expand_keeps_both_regions() {
        let mut runs = table(30, &[(0, 1), (10, 2), (20, 3)]);
        runs.shift_table_to(10);
        let before = bounds(&runs);
        runs.expand();
        assert_eq!(bounds(&runs), before);
        assert_eq!(runs.neg_start(), runs.capacity() - 2);
    }

    #[test]
    fn test_compress_to_live_records() {
        let mut runs = table(30, &[(0, 1), (10, 2), (20, 3)]);
        runs.shift_table_to(10);
        runs.expand();
        runs.compress();
        assert_eq!(runs.capacity(), 3);
        assert_eq!(bounds(&runs), vec![(0, 10), (10, 20), (20, 30)]);
    }

    #[test]
    fn test_check_invariants_flags_duplicates() {
        let mut runs = RunArray::new(4, 10, style(1));
        runs.push_positive(Run::new(5, style(1)));
        assert!(runs.check_invariants().is_err());
    }
}
