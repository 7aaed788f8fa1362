// Chunk: docs/chunks/styled_text - Characters and character styles edited together

//! Styled text: a character buffer and a style buffer kept in step.
//!
//! Every edit that changes the character count is applied to the
//! [`CharBuffer`] first and then mirrored into the [`StyleBuffer`] with the
//! same range. Style-only edits go straight to the style buffer. Both paths
//! widen a [`DamagedRange`] the layout layer can poll and reset, and bump a
//! time stamp so caches can tell whether the text changed.

use std::fmt;

use crate::attribute_map::AttributeMap;
use crate::char_buffer::{CharBuffer, CharCursor};
use crate::config::StorageConfig;
use crate::error::{check_range, Result};
use crate::style_buffer::{StyleBuffer, StyleRuns};
use crate::style_modifier::{ModifyStyle, StyleModifier};
use crate::types::{DamagedRange, StyleRun};

/// Characters with run-length encoded character styles.
#[derive(Clone)]
pub struct StyledText {
    chars: CharBuffer,
    styles: StyleBuffer,
    config: StorageConfig,
    damaged: DamagedRange,
    time_stamp: u64,
}

impl StyledText {
    /// Creates an empty text whose first insertion takes the empty style.
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            chars: CharBuffer::with_config(config),
            styles: StyleBuffer::with_config(0, AttributeMap::empty(), config),
            config,
            damaged: DamagedRange::empty(),
            time_stamp: 0,
        }
    }

    /// Creates a text holding `text`, all in `style`.
    pub fn from_str(text: &str, style: AttributeMap) -> Self {
        let chars = CharBuffer::from_str(text);
        let styles = StyleBuffer::new(chars.len(), style);
        Self {
            chars,
            styles,
            config: StorageConfig::default(),
            damaged: DamagedRange::empty(),
            time_stamp: 0,
        }
    }

    /// Creates a text holding a copy of `src[start, limit)` with its styles.
    pub fn from_range(src: &StyledText, start: usize, limit: usize) -> Result<Self> {
        let mut text = Self::with_config(src.config);
        text.replace(0, 0, src, start, limit)?;
        text.damaged = DamagedRange::empty();
        text.time_stamp = 0;
        Ok(text)
    }

    // ==================== Accessors ====================

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Returns the character at `pos`.
    pub fn at(&self, pos: usize) -> Result<char> {
        self.chars.at(pos)
    }

    /// Copies the characters of `[start, limit)` into the front of `dst`.
    pub fn copy_chars(&self, start: usize, limit: usize, dst: &mut [char]) -> Result<()> {
        self.chars.copy_range(start, limit, dst)
    }

    pub fn slice(&self, start: usize, limit: usize) -> Result<String> {
        self.chars.slice(start, limit)
    }

    /// Returns the full text content.
    pub fn content(&self) -> String {
        self.chars.to_string()
    }

    /// The character storage. Cursors read through it.
    pub fn char_buffer(&self) -> &CharBuffer {
        &self.chars
    }

    pub fn style_buffer(&self) -> &StyleBuffer {
        &self.styles
    }

    /// Creates a cursor over `[start, limit)`. It goes stale on the next edit.
    pub fn cursor(&self, start: usize, limit: usize) -> Result<CharCursor> {
        self.chars.cursor(start, limit)
    }

    pub fn character_style_at(&self, pos: usize) -> Result<AttributeMap> {
        self.styles.style_at(pos)
    }

    pub fn character_style_start(&self, pos: usize) -> Result<usize> {
        self.styles.style_start(pos)
    }

    pub fn character_style_limit(&self, pos: usize) -> Result<usize> {
        self.styles.style_limit(pos)
    }

    /// Returns the style runs overlapping `[start, limit)`.
    pub fn runs(&self, start: usize, limit: usize) -> Result<StyleRuns<'_>> {
        self.styles.runs(start, limit)
    }

    /// Returns the span changed since the last [`reset_damaged_range`](Self::reset_damaged_range).
    pub fn damaged_range(&self) -> DamagedRange {
        self.damaged
    }

    pub fn reset_damaged_range(&mut self) {
        self.damaged = DamagedRange::empty();
    }

    /// Incremented on every change to characters or styles.
    pub fn time_stamp(&self) -> u64 {
        self.time_stamp
    }

    // ==================== Mutations ====================

    /// Replaces `[start, limit)` with the characters and styles of
    /// `src[src_start, src_limit)`. `src` is not modified.
    ///
    /// To paste from the text itself, pass a clone or an [`extract`](Self::extract)ed copy.
    pub fn replace(
        &mut self,
        start: usize,
        limit: usize,
        src: &StyledText,
        src_start: usize,
        src_limit: usize,
    ) -> Result<()> {
        check_range(start, limit, self.len())?;
        check_range(src_start, src_limit, src.len())?;
        if start == limit && src_start == src_limit {
            return Ok(());
        }

        let inserted = src_limit - src_start;
        let mut chars = vec!['\0'; inserted];
        src.chars.copy_range(src_start, src_limit, &mut chars)?;
        let runs: Vec<StyleRun> = src.styles.runs(src_start, src_limit)?.collect();

        tracing::trace!(start, limit, inserted, runs = runs.len(), "styled replace");
        self.damaged.update(start, limit, inserted);
        self.chars.replace(start, limit, &chars)?;
        self.styles.replace_with_runs(start, limit, &runs)?;
        self.time_stamp += 1;
        Ok(())
    }

    /// Replaces `[start, limit)` with `chars`, all in `style`.
    pub fn replace_chars(
        &mut self,
        start: usize,
        limit: usize,
        chars: &[char],
        style: AttributeMap,
    ) -> Result<()> {
        check_range(start, limit, self.len())?;
        if start == limit && chars.is_empty() {
            return Ok(());
        }

        self.damaged.update(start, limit, chars.len());
        self.chars.replace(start, limit, chars)?;
        self.replace_char_styles_with(start, limit, start + chars.len(), style)?;
        self.time_stamp += 1;
        Ok(())
    }

    /// Replaces `[start, limit)` with the characters of `text`, all in `style`.
    pub fn replace_str(
        &mut self,
        start: usize,
        limit: usize,
        text: &str,
        style: AttributeMap,
    ) -> Result<()> {
        let chars: Vec<char> = text.chars().collect();
        self.replace_chars(start, limit, &chars, style)
    }

    /// Replaces `[start, limit)` with a single character in `style`.
    pub fn replace_char(&mut self, start: usize, limit: usize, ch: char, style: AttributeMap) -> Result<()> {
        self.replace_chars(start, limit, &[ch], style)
    }

    /// Mirrors a plain-character replace into the style buffer: the old
    /// range's runs go away and the new characters get exactly `style`.
    fn replace_char_styles_with(
        &mut self,
        start: usize,
        old_limit: usize,
        new_limit: usize,
        style: AttributeMap,
    ) -> Result<()> {
        if start < old_limit {
            self.styles.delete_text(start, old_limit)?;
        }
        if start < new_limit {
            self.styles.insert_text(start, new_limit)?;
            // Already covered by the character update.
            let mut scratch = DamagedRange::empty();
            self.styles
                .modify_styles(start, new_limit, &StyleModifier::replace(style), &mut scratch)?;
        }
        Ok(())
    }

    /// Inserts all of `src` at `pos`.
    pub fn insert(&mut self, pos: usize, src: &StyledText) -> Result<()> {
        self.replace(pos, pos, src, 0, src.len())
    }

    /// Appends all of `src`.
    pub fn append(&mut self, src: &StyledText) -> Result<()> {
        let end = self.len();
        self.replace(end, end, src, 0, src.len())
    }

    /// Replaces the whole text with all of `src`.
    pub fn replace_all(&mut self, src: &StyledText) -> Result<()> {
        let end = self.len();
        self.replace(0, end, src, 0, src.len())
    }

    /// Deletes `[start, limit)`.
    pub fn remove(&mut self, start: usize, limit: usize) -> Result<()> {
        self.replace_chars(start, limit, &[], AttributeMap::empty())
    }

    /// Drops all characters and styles, releasing storage.
    pub fn clear(&mut self) {
        self.chars = CharBuffer::with_config(self.config);
        self.styles = StyleBuffer::with_config(0, AttributeMap::empty(), self.config);
        self.time_stamp += 1;
        self.damaged = DamagedRange::new(0, 0);
    }

    /// Returns a copy of `[start, limit)` with its styles.
    pub fn extract(&self, start: usize, limit: usize) -> Result<StyledText> {
        Self::from_range(self, start, limit)
    }

    /// Applies `modifier` to the styles of `[start, limit)`.
    ///
    /// Returns whether any style changed; only then is the time stamp bumped.
    pub fn modify_character_styles<M>(&mut self, start: usize, limit: usize, modifier: &M) -> Result<bool>
    where
        M: ModifyStyle + ?Sized,
    {
        let changed = self
            .styles
            .modify_styles(start, limit, modifier, &mut self.damaged)?;
        if changed {
            self.time_stamp += 1;
        }
        Ok(changed)
    }

    /// Resets every character to the empty style.
    pub fn remove_character_styles(&mut self) {
        self.styles = StyleBuffer::with_config(self.len(), AttributeMap::empty(), self.config);
        self.time_stamp += 1;
        self.damaged = DamagedRange::new(0, self.len());
    }

    /// Releases spare capacity in both buffers.
    pub fn compress(&mut self) {
        self.chars.compress();
        self.styles.compress();
    }
}

impl Default for StyledText {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.chars, f)
    }
}

impl fmt::Debug for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyledText")
            .field("content", &self.content())
            .field("runs", &self.styles.all_runs().collect::<Vec<_>>())
            .field("time_stamp", &self.time_stamp)
            .finish()
    }
}

/// Texts are equal when they hold the same characters with the same runs.
impl PartialEq for StyledText {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.chars.chars().eq(other.chars.chars()) && self.styles == other.styles
    }
}

impl Eq for StyledText {}
