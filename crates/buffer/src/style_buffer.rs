// Chunk: docs/chunks/style_buffer - Character style runs over a run boundary table

//! Style buffer: the run-oriented view of character styles.
//!
//! A `StyleBuffer` does not hold characters. It tracks a text length and a
//! sequence of maximal runs, each carrying one [`AttributeMap`]. The caller
//! mirrors every character edit into it with the same range, either through
//! [`insert_text`](StyleBuffer::insert_text) / [`delete_text`](StyleBuffer::delete_text)
//! or through [`replace`](StyleBuffer::replace) when pasting styled text.
//!
//! Every entry point starts by moving the run table's gap to the edit offset,
//! performs the edit on records adjacent to the gap, and leaves the table in a
//! consistent state: boundaries strictly increasing, the first run starting at
//! 0, and no two neighbouring runs with equal styles.

use std::fmt;

use crate::attribute_map::AttributeMap;
use crate::config::StorageConfig;
use crate::error::{check_offset, check_range, inconsistent, Result, StorageError};
use crate::run_array::{Run, RunArray};
use crate::style_modifier::ModifyStyle;
use crate::types::{DamagedRange, StyleRun};

/// Run-length encoded character styles.
#[derive(Clone)]
pub struct StyleBuffer {
    runs: RunArray,
    /// Mutation counter for sampling debug assertions (debug builds only).
    #[cfg(debug_assertions)]
    debug_mutation_count: u64,
}

impl StyleBuffer {
    /// Creates a buffer with one run of `style` covering `[0, len)`.
    pub fn new(len: usize, style: AttributeMap) -> Self {
        Self::with_config(len, style, StorageConfig::default())
    }

    pub fn with_config(len: usize, style: AttributeMap, config: StorageConfig) -> Self {
        Self {
            runs: RunArray::new(config.initial_run_capacity(), len, style),
            #[cfg(debug_assertions)]
            debug_mutation_count: 0,
        }
    }

    // ==================== Accessors ====================

    /// Returns the length of the text the runs cover.
    pub fn len(&self) -> usize {
        self.runs.text_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of style runs. An empty text still has one run,
    /// which supplies the style for text inserted into it.
    pub fn run_count(&self) -> usize {
        self.runs.run_count()
    }

    fn find_run(&self, pos: usize) -> Result<usize> {
        self.runs
            .find_run_containing(pos)
            .ok_or_else(|| inconsistent("no run contains offset"))
    }

    /// Returns the style of the character at `pos`.
    ///
    /// `pos == len()` is allowed and yields the style of the last run.
    pub fn style_at(&self, pos: usize) -> Result<AttributeMap> {
        check_offset(pos, self.len())?;
        let run = self.find_run(pos)?;
        Ok(self.runs.slot(run).style.clone())
    }

    /// Returns the start of the run containing `pos`.
    pub fn style_start(&self, pos: usize) -> Result<usize> {
        check_offset(pos, self.len())?;
        if pos == self.len() {
            return Ok(pos);
        }
        let run = self.find_run(pos)?;
        self.runs.logical_start(run)
    }

    /// Returns the limit of the run containing `pos`.
    pub fn style_limit(&self, pos: usize) -> Result<usize> {
        check_offset(pos, self.len())?;
        if pos == self.len() {
            return Ok(pos);
        }
        let run = self.find_run(pos)?;
        let next = if run + 1 == self.runs.pos_len() {
            self.runs.neg_start()
        } else {
            run + 1
        };
        self.runs.logical_start(next)
    }

    /// Returns the runs overlapping `[start, limit)`, clipped to the range.
    pub fn runs(&self, start: usize, limit: usize) -> Result<StyleRuns<'_>> {
        check_range(start, limit, self.len())?;
        if start == limit {
            return Ok(StyleRuns::new(&self.runs, start, limit, 0, 0));
        }
        let first = self.runs.logical_index(self.find_run(start)?);
        let last = self.runs.logical_index(self.find_run(limit - 1)?);
        Ok(StyleRuns::new(&self.runs, start, limit, first, last + 1))
    }

    /// Returns every run of the text. Empty text yields nothing.
    pub fn all_runs(&self) -> StyleRuns<'_> {
        let back = if self.is_empty() { 0 } else { self.run_count() };
        StyleRuns::new(&self.runs, 0, self.len(), 0, back)
    }

    // ==================== Mutations ====================

    /// Moves the run table's gap so the edit point sits right after it.
    /// Offset 0 is treated as 1 so the first run never leaves the positive region.
    fn shift_table_to(&mut self, pos: usize) {
        self.runs.shift_table_to(pos.max(1));
    }

    /// Returns true if the runs on both sides of the gap carry the same style.
    fn gap_styles_match(&self) -> bool {
        match (self.runs.last_positive(), self.runs.first_negative()) {
            (Some(before), Some(after)) => before.style == after.style,
            _ => false,
        }
    }

    /// Records that `limit - start` characters were inserted at `start`.
    ///
    /// The run the insertion point lies in (the one containing `start - 1`,
    /// or the first run when `start == 0`) absorbs the new characters.
    pub fn insert_text(&mut self, start: usize, limit: usize) -> Result<()> {
        check_offset(start, self.len())?;
        if limit < start {
            return Err(StorageError::InvertedRange { start, limit });
        }
        if start == limit {
            return Ok(());
        }
        self.shift_table_to(start);
        self.runs.add_to_text_len((limit - start) as isize);
        self.assert_runs_consistent();
        Ok(())
    }

    /// Records that `[start, limit)` was deleted.
    ///
    /// Runs entirely inside the range disappear; when a whole run was removed
    /// and the survivors on either side share a style, they merge.
    pub fn delete_text(&mut self, start: usize, limit: usize) -> Result<()> {
        check_range(start, limit, self.len())?;
        if start == limit {
            return Ok(());
        }
        self.delete_runs(start, limit)?;
        self.assert_runs_consistent();
        Ok(())
    }

    /// Deletes a validated range. Always leaves the gap at `start`, even for
    /// an empty range.
    fn delete_runs(&mut self, start: usize, limit: usize) -> Result<()> {
        self.shift_table_to(start);
        let text_len = self.runs.text_len();
        let first_run_limit = self.runs.end_of_gap();
        let mut whole_run_deleted = false;

        if limit == text_len {
            self.runs.clear_negative();
        } else if limit >= first_run_limit {
            let end = self.find_run(limit)?;
            if end + 1 != self.runs.pos_len() {
                self.runs.slot_mut(end).start = limit as isize - text_len as isize;
                self.runs.set_neg_start(end);
                whole_run_deleted = true;
            }
        }

        if !self.runs.negative_is_empty() {
            if start == 0 && limit >= first_run_limit {
                // The first run is gone; the run after the deletion moves to offset 0.
                if let Some(first) = self.runs.pop_negative() {
                    self.runs.slot_mut(0).style = first.style;
                }
            } else if whole_run_deleted && self.gap_styles_match() {
                self.runs.pop_negative();
            }
        }

        self.runs.add_to_text_len(-((limit - start) as isize));
        Ok(())
    }

    /// Applies `modifier` to the style of every character in `[start, limit)`.
    ///
    /// Runs are split at `start` and `limit` where needed and merged with
    /// neighbours whose style becomes equal. `damaged` is widened to cover
    /// every offset whose style actually changed. Returns whether anything
    /// changed; an empty range or an identity transform returns `false`.
    pub fn modify_styles<M>(
        &mut self,
        start: usize,
        limit: usize,
        modifier: &M,
        damaged: &mut DamagedRange,
    ) -> Result<bool>
    where
        M: ModifyStyle + ?Sized,
    {
        check_range(start, limit, self.len())?;
        if start == limit {
            return Ok(false);
        }

        self.shift_table_to(start);
        let mut current_run_start = start;
        let mut merge_style = self
            .runs
            .last_positive()
            .map(|run| run.style.clone())
            .ok_or_else(|| inconsistent("positive region is empty"))?;

        // A run may begin exactly at `start`; it is consumed into the loop.
        let mut old_style = if !self.runs.negative_is_empty() && self.runs.end_of_gap() == start {
            match self.runs.pop_negative() {
                Some(run) => run.style,
                None => merge_style.clone(),
            }
        } else {
            merge_style.clone()
        };

        let mut modified_anywhere = false;
        loop {
            let new_style = modifier.modify_style(&old_style);
            let modified = new_style != old_style;
            if modified {
                modified_anywhere = true;
                damaged.extend_start(current_run_start);
            }

            if new_style != merge_style {
                if current_run_start == 0 {
                    if let Some(first) = self.runs.last_positive_mut() {
                        first.style = new_style.clone();
                    }
                } else {
                    self.runs
                        .push_positive(Run::new(current_run_start as isize, new_style.clone()));
                }
            }
            merge_style = new_style;

            let next_run_start = self.runs.logical_start(self.runs.neg_start())?;
            if limit > next_run_start {
                old_style = self
                    .runs
                    .pop_negative()
                    .map(|run| run.style)
                    .ok_or_else(|| inconsistent("negative region ended before the text"))?;
                current_run_start = next_run_start;
                if modified {
                    damaged.extend_limit(current_run_start);
                }
            } else {
                if limit < next_run_start && old_style != merge_style {
                    // Split: the tail of the old run keeps its style.
                    self.runs.push_positive(Run::new(limit as isize, old_style));
                }
                if modified {
                    damaged.extend_limit(limit);
                }
                break;
            }
        }

        if self.gap_styles_match() {
            self.runs.pop_negative();
        }

        self.assert_runs_consistent();
        Ok(modified_anywhere)
    }

    /// Replaces the styles of `[start, limit)` with those of
    /// `src[src_start, src_limit)`. The text length changes accordingly.
    pub fn replace(
        &mut self,
        start: usize,
        limit: usize,
        src: &StyleBuffer,
        src_start: usize,
        src_limit: usize,
    ) -> Result<()> {
        let runs: Vec<StyleRun> = src.runs(src_start, src_limit)?.collect();
        self.replace_with_runs(start, limit, &runs)
    }

    /// Replaces the styles of `[start, limit)` with the given runs, laid out
    /// one after another from `start`. Only each run's length and style are
    /// used; empty runs are skipped.
    pub fn replace_with_runs(&mut self, start: usize, limit: usize, runs: &[StyleRun]) -> Result<()> {
        check_range(start, limit, self.len())?;
        let inserted: usize = runs.iter().map(StyleRun::len).sum();
        if start == limit && inserted == 0 {
            return Ok(());
        }

        self.delete_runs(start, limit)?;
        if inserted == 0 {
            self.assert_runs_consistent();
            return Ok(());
        }

        self.prepare_style_insert(start)?;
        let mut offset = start;
        for run in runs.iter().filter(|run| !run.is_empty()) {
            let continues = self
                .runs
                .last_positive()
                .is_some_and(|last| last.style == run.style);
            if !continues {
                self.runs.push_positive(Run::new(offset as isize, run.style.clone()));
            }
            offset += run.len();
        }
        self.runs.add_to_text_len(inserted as isize);

        if self.gap_styles_match() {
            self.runs.pop_negative();
        }

        self.assert_runs_consistent();
        Ok(())
    }

    /// Opens a boundary at `start` so pasted runs can be appended to the
    /// positive region. The gap must already sit at `start`.
    fn prepare_style_insert(&mut self, start: usize) -> Result<()> {
        if start == 0 {
            let text_len = self.runs.text_len();
            if text_len > 0 {
                // The existing first run now begins after the pasted text.
                let style = self.runs.slot(0).style.clone();
                self.runs.push_negative(0, style);
            }
            self.runs.clear_positive();
            return Ok(());
        }

        let top = self
            .runs
            .last_positive()
            .ok_or_else(|| inconsistent("positive region is empty"))?;
        if top.start >= start as isize {
            return Err(inconsistent("insertion point precedes the gap"));
        }
        let top_style = top.style.clone();

        let end_of_gap = self.runs.end_of_gap();
        if end_of_gap < start {
            return Err(inconsistent("insertion point lies past the gap"));
        }
        if end_of_gap != start {
            self.runs.push_negative(start, top_style);
        }
        Ok(())
    }

    /// Releases spare run table capacity.
    pub fn compress(&mut self) {
        self.runs.compress();
    }

    /// Verifies the run table invariants. Only sampled in debug builds;
    /// exposed for callers that want to check after bulk operations.
    pub fn check_consistency(&self) -> Result<()> {
        self.runs.check_invariants()
    }

    /// Checks the run table every 64th mutation. Compiled out in release builds.
    #[cfg(debug_assertions)]
    fn assert_runs_consistent(&mut self) {
        self.debug_mutation_count += 1;
        if self.debug_mutation_count % 64 != 0 {
            return;
        }
        let check = self.runs.check_invariants();
        assert!(
            check.is_ok(),
            "run table drift detected after {} mutations: {:?}\n  runs: {:?}",
            self.debug_mutation_count,
            check,
            self.all_runs().collect::<Vec<_>>(),
        );
    }

    #[cfg(not(debug_assertions))]
    fn assert_runs_consistent(&mut self) {}
}

impl fmt::Debug for StyleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleBuffer")
            .field("len", &self.len())
            .field("runs", &self.all_runs().collect::<Vec<_>>())
            .finish()
    }
}

impl PartialEq for StyleBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.all_runs().eq(other.all_runs())
    }
}

impl Eq for StyleBuffer {}

// =============================================================================
// StyleRuns
// =============================================================================

/// Iterator over the style runs of a range, produced by [`StyleBuffer::runs`].
///
/// Runs are clipped to the requested range, so the first and last may be
/// shorter than the runs stored in the buffer.
#[derive(Debug, Clone)]
pub struct StyleRuns<'a> {
    table: &'a RunArray,
    start: usize,
    limit: usize,
    /// Next logical run from the front.
    front: usize,
    /// One past the next logical run from the back.
    back: usize,
}

impl<'a> StyleRuns<'a> {
    fn new(table: &'a RunArray, start: usize, limit: usize, front: usize, back: usize) -> Self {
        Self {
            table,
            start,
            limit,
            front,
            back,
        }
    }

    fn clipped(&self, k: usize) -> Option<StyleRun> {
        let mut run = self.table.run(k)?;
        run.start = run.start.max(self.start);
        run.limit = run.limit.min(self.limit);
        Some(run)
    }
}

impl Iterator for StyleRuns<'_> {
    type Item = StyleRun;

    fn next(&mut self) -> Option<StyleRun> {
        if self.front >= self.back {
            return None;
        }
        let run = self.clipped(self.front)?;
        self.front += 1;
        Some(run)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for StyleRuns<'_> {
    fn next_back(&mut self) -> Option<StyleRun> {
        if self.front >= self.back {
            return None;
        }
        let run = self.clipped(self.back - 1)?;
        self.back -= 1;
        Some(run)
    }
}

impl ExactSizeIterator for StyleRuns<'_> {}
