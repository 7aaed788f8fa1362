// Chunk: docs/chunks/char_buffer - Character gap buffer with generation-checked cursors

//! Gap buffer for the character sequence.
//!
//! The buffer stores characters with a "gap" - an empty region that moves to
//! wherever the last edit happened. Replacing at the gap is O(edit size);
//! replacing elsewhere first moves the span between the gap and the edit
//! point. When the result no longer fits, the array is reallocated using the
//! doubling policy of [`StorageConfig`].
//!
//! Every mutation bumps a generation counter. A [`CharCursor`] records the
//! generation it was created at and refuses to read once it changes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::StorageConfig;
use crate::error::{check_offset, check_range, Result, StorageError};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

fn next_buffer_id() -> u64 {
    NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)
}

/// A gap buffer of `char`s.
#[derive(Debug)]
pub struct CharBuffer {
    /// The underlying storage. Contains [pre-gap content | gap | post-gap content].
    data: Vec<char>,
    /// Index where the gap starts (first unused position).
    gap_start: usize,
    /// Index where the gap ends (first used position after gap).
    gap_end: usize,
    /// Bumped on every mutation; cursors compare against it.
    generation: u64,
    /// Distinguishes buffers so a cursor cannot be used on the wrong one.
    id: u64,
    config: StorageConfig,
}

impl CharBuffer {
    /// Creates a new empty buffer. No storage is allocated until the first insert.
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            data: Vec::new(),
            gap_start: 0,
            gap_end: 0,
            generation: 0,
            id: next_buffer_id(),
            config,
        }
    }

    /// Creates a buffer initialized with the given text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut buffer = Self::new();
        buffer.data = vec!['\0'; buffer.config.char_allocation(chars.len())];
        buffer.data[..chars.len()].copy_from_slice(&chars);
        buffer.gap_start = chars.len();
        buffer.gap_end = buffer.data.len();
        buffer
    }

    /// Returns the logical length of the buffer (excluding the gap).
    pub fn len(&self) -> usize {
        self.data.len() - self.gap_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the size of the backing array, gap included.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// Returns the current gap position in logical coordinates.
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// Returns the mutation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn physical(&self, pos: usize) -> usize {
        if pos < self.gap_start {
            pos
        } else {
            pos + self.gap_len()
        }
    }

    // ==================== Mutation ====================

    /// Replaces `[start, limit)` with `src`.
    ///
    /// This is the core mutator; insertion is `replace(pos, pos, chars)` and
    /// deletion is `replace(start, limit, &[])`. The gap ends up right after
    /// the inserted characters.
    pub fn replace(&mut self, start: usize, limit: usize, src: &[char]) -> Result<()> {
        let len = self.len();
        check_range(start, limit, len)?;
        if start == limit && src.is_empty() {
            return Ok(());
        }
        self.generation += 1;

        let new_len = len - (limit - start) + src.len();
        let new_gap_start = start + src.len();

        if new_len > self.data.len() {
            let mut grown = vec!['\0'; self.config.char_allocation(new_len)];
            self.copy_unchecked(0, start, &mut grown[..start]);
            grown[start..new_gap_start].copy_from_slice(src);
            let tail_at = grown.len() - (len - limit);
            self.copy_unchecked(limit, len, &mut grown[tail_at..]);

            tracing::debug!(
                old_capacity = self.data.len(),
                new_capacity = grown.len(),
                "char buffer grew"
            );
            self.data = grown;
            self.gap_start = new_gap_start;
            self.gap_end = tail_at;
            return Ok(());
        }

        let capacity = self.data.len();
        let new_gap_end = capacity - new_len + new_gap_start;
        if start > self.gap_start {
            // Pull [gap_start, start) out of the suffix into the prefix.
            let shift = start - self.gap_start;
            self.data
                .copy_within(self.gap_end..self.gap_end + shift, self.gap_start);
        }
        if limit < self.gap_start {
            // Push [limit, gap_start) into the suffix.
            self.data.copy_within(limit..self.gap_start, new_gap_end);
        }
        self.data[start..new_gap_start].copy_from_slice(src);

        self.gap_start = new_gap_start;
        self.gap_end = new_gap_end;
        Ok(())
    }

    /// Replaces `[start, limit)` with the characters of `text`.
    pub fn replace_str(&mut self, start: usize, limit: usize, text: &str) -> Result<()> {
        let chars: Vec<char> = text.chars().collect();
        self.replace(start, limit, &chars)
    }

    /// Moves the gap to `start` and guarantees room for `additional` chars
    /// there without reallocating.
    pub fn reserve_capacity(&mut self, start: usize, additional: usize) -> Result<()> {
        check_offset(start, self.len())?;
        self.generation += 1;

        if self.gap_len() >= additional {
            self.move_gap_to(start);
            return Ok(());
        }

        let len = self.len();
        let mut grown = vec!['\0'; self.config.char_allocation(len + additional)];
        self.copy_unchecked(0, start, &mut grown[..start]);
        let tail_at = grown.len() - (len - start);
        self.copy_unchecked(start, len, &mut grown[tail_at..]);

        tracing::debug!(
            old_capacity = self.data.len(),
            new_capacity = grown.len(),
            "char buffer reserved capacity"
        );
        self.data = grown;
        self.gap_start = start;
        self.gap_end = tail_at;
        Ok(())
    }

    /// Moves the gap to the specified logical position.
    ///
    /// This is O(distance) where distance is the absolute difference between
    /// the current gap position and the target position.
    fn move_gap_to(&mut self, pos: usize) {
        tracing::trace!(from = self.gap_start, to = pos, "moving char gap");
        if pos < self.gap_start {
            let shift = self.gap_start - pos;
            self.data
                .copy_within(pos..self.gap_start, self.gap_end - shift);
            self.gap_start = pos;
            self.gap_end -= shift;
        } else if pos > self.gap_start {
            let shift = pos - self.gap_start;
            self.data
                .copy_within(self.gap_end..self.gap_end + shift, self.gap_start);
            self.gap_start += shift;
            self.gap_end += shift;
        }
    }

    /// Releases the gap: afterwards the capacity equals the logical length.
    pub fn compress(&mut self) {
        let len = self.len();
        if len == self.data.len() {
            return;
        }
        self.generation += 1;

        let mut compact = vec!['\0'; len];
        self.copy_unchecked(0, len, &mut compact);
        tracing::debug!(old_capacity = self.data.len(), len, "char buffer compressed");
        self.data = compact;
        self.gap_start = len;
        self.gap_end = len;
    }

    // ==================== Access ====================

    /// Returns the character at the given logical position.
    pub fn at(&self, pos: usize) -> Result<char> {
        let len = self.len();
        if pos >= len {
            return Err(StorageError::OutOfBounds { offset: pos, len });
        }
        Ok(self.data[self.physical(pos)])
    }

    /// Copies `[start, limit)` into the front of `dst`.
    pub fn copy_range(&self, start: usize, limit: usize, dst: &mut [char]) -> Result<()> {
        check_range(start, limit, self.len())?;
        let count = limit - start;
        if dst.len() < count {
            return Err(StorageError::OutOfBounds {
                offset: count,
                len: dst.len(),
            });
        }
        self.copy_unchecked(start, limit, &mut dst[..count]);
        Ok(())
    }

    /// Copies a validated range; splits into two copies when it straddles the gap.
    fn copy_unchecked(&self, start: usize, limit: usize, dst: &mut [char]) {
        if limit <= self.gap_start {
            dst.copy_from_slice(&self.data[start..limit]);
        } else if start >= self.gap_start {
            let from = self.physical(start);
            dst.copy_from_slice(&self.data[from..from + (limit - start)]);
        } else {
            let before = self.gap_start - start;
            dst[..before].copy_from_slice(&self.data[start..self.gap_start]);
            dst[before..].copy_from_slice(&self.data[self.gap_end..self.gap_end + (limit - self.gap_start)]);
        }
    }

    /// Returns an iterator over all characters in the buffer.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.data[..self.gap_start]
            .iter()
            .chain(self.data[self.gap_end..].iter())
            .copied()
    }

    /// Returns the content of a range as a String.
    pub fn slice(&self, start: usize, limit: usize) -> Result<String> {
        check_range(start, limit, self.len())?;
        Ok(self.chars().skip(start).take(limit - start).collect())
    }

    /// Creates a cursor over `[start, limit)`, positioned at `start`.
    pub fn cursor(&self, start: usize, limit: usize) -> Result<CharCursor> {
        check_range(start, limit, self.len())?;
        Ok(CharCursor {
            owner: self.id,
            generation: self.generation,
            start,
            limit,
            current: start,
        })
    }
}

impl Default for CharBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CharBuffer {
    /// The clone is a distinct buffer: cursors of the original do not apply to it.
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            gap_start: self.gap_start,
            gap_end: self.gap_end,
            generation: 0,
            id: next_buffer_id(),
            config: self.config,
        }
    }
}

impl fmt::Display for CharBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.chars() {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

// =============================================================================
// CharCursor
// =============================================================================

/// A restartable, bidirectional cursor over a range of a [`CharBuffer`].
///
/// The cursor does not borrow the buffer; every access takes it as an argument
/// and fails with [`StorageError::StaleIterator`] if the buffer was mutated
/// since the cursor was created. Reads outside `[begin_index, end_index)`
/// return `Ok(None)`.
///
/// ```
/// use styled_text_buffer::CharBuffer;
///
/// let buffer = CharBuffer::from_str("abc");
/// let mut cursor = buffer.cursor(0, 3).unwrap();
/// assert_eq!(cursor.current(&buffer), Ok(Some('a')));
/// assert_eq!(cursor.next(&buffer), Ok(Some('b')));
/// assert_eq!(cursor.last(&buffer), Ok(Some('c')));
/// assert_eq!(cursor.next(&buffer), Ok(None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharCursor {
    owner: u64,
    generation: u64,
    start: usize,
    limit: usize,
    current: usize,
}

impl CharCursor {
    fn check(&self, buffer: &CharBuffer) -> Result<()> {
        if self.owner != buffer.id || self.generation != buffer.generation {
            return Err(StorageError::StaleIterator);
        }
        Ok(())
    }

    fn read(&self, buffer: &CharBuffer) -> Option<char> {
        if self.current < self.start || self.current >= self.limit {
            return None;
        }
        Some(buffer.data[buffer.physical(self.current)])
    }

    pub fn begin_index(&self) -> usize {
        self.start
    }

    pub fn end_index(&self) -> usize {
        self.limit
    }

    pub fn index(&self) -> usize {
        self.current
    }

    /// Returns true if the cursor can still read from `buffer`.
    pub fn is_valid_for(&self, buffer: &CharBuffer) -> bool {
        self.check(buffer).is_ok()
    }

    /// Returns the character at the current index.
    pub fn current(&self, buffer: &CharBuffer) -> Result<Option<char>> {
        self.check(buffer)?;
        Ok(self.read(buffer))
    }

    /// Moves to `begin_index` and returns the character there.
    pub fn first(&mut self, buffer: &CharBuffer) -> Result<Option<char>> {
        self.set_index(buffer, self.start)
    }

    /// Moves to the last character of the range. An empty range leaves the
    /// cursor at `end_index`.
    pub fn last(&mut self, buffer: &CharBuffer) -> Result<Option<char>> {
        if self.start == self.limit {
            return self.set_index(buffer, self.limit);
        }
        self.set_index(buffer, self.limit - 1)
    }

    /// Advances one character. Stops at `end_index`.
    pub fn next(&mut self, buffer: &CharBuffer) -> Result<Option<char>> {
        self.check(buffer)?;
        if self.current + 1 >= self.limit {
            self.current = self.limit;
            return Ok(None);
        }
        self.current += 1;
        Ok(self.read(buffer))
    }

    /// Steps back one character. Stops at `begin_index`.
    pub fn previous(&mut self, buffer: &CharBuffer) -> Result<Option<char>> {
        self.check(buffer)?;
        if self.current <= self.start {
            self.current = self.start;
            return Ok(None);
        }
        self.current -= 1;
        Ok(self.read(buffer))
    }

    /// Moves to `index`, which must lie in `[begin_index, end_index]`.
    pub fn set_index(&mut self, buffer: &CharBuffer, index: usize) -> Result<Option<char>> {
        self.check(buffer)?;
        if index < self.start || index > self.limit {
            return Err(StorageError::OutOfBounds {
                offset: index,
                len: self.limit,
            });
        }
        self.current = index;
        Ok(self.read(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_new_empty() {
        let buf = CharBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn test_from_str() {
        let buf = CharBuffer::from_str("hello");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.to_string(), "hello");
        assert_eq!(buf.gap_position(), 5);
    }

    #[test]
    fn test_insert_into_empty() {
        let mut buf = CharBuffer::new();
        buf.replace(0, 0, &chars("abc")).unwrap();
        assert_eq!(buf.to_string(), "abc");
        assert_eq!(buf.capacity(), 128);
        assert_eq!(buf.gap_position(), 3);
    }

    #[test]
    fn test_insert_at_middle() {
        let mut buf = CharBuffer::from_str("ac");
        buf.replace(1, 1, &['b']).unwrap();
        assert_eq!(buf.to_string(), "abc");
        assert_eq!(buf.gap_position(), 2);
    }

    #[test]
    fn test_typing_at_gap_does_not_reallocate() {
        let mut buf = CharBuffer::from_str("hello");
        let capacity = buf.capacity();
        for (i, ch) in " world".chars().enumerate() {
            buf.replace(5 + i, 5 + i, &[ch]).unwrap();
        }
        assert_eq!(buf.to_string(), "hello world");
        assert_eq!(buf.capacity(), capacity);
    }

    #[test]
    fn test_delete_left_of_gap() {
        let mut buf = CharBuffer::from_str("abcdef");
        buf.replace(1, 3, &[]).unwrap();
        assert_eq!(buf.to_string(), "adef");
        assert_eq!(buf.gap_position(), 1);
    }

    #[test]
    fn test_delete_right_of_gap() {
        let mut buf = CharBuffer::from_str("abcdef");
        buf.replace(0, 0, &['x']).unwrap();
        assert_eq!(buf.gap_position(), 1);
        // edit to the right of the gap
        buf.replace(4, 7, &[]).unwrap();
        assert_eq!(buf.to_string(), "xabc");
        assert_eq!(buf.gap_position(), 4);
    }

    #[test]
    fn test_replace_straddling_gap() {
        let mut buf = CharBuffer::from_str("abcdef");
        buf.replace(2, 3, &['X']).unwrap();
        assert_eq!(buf.to_string(), "abXdef");
        assert_eq!(buf.gap_position(), 3);
        buf.replace(1, 5, &chars("12")).unwrap();
        assert_eq!(buf.to_string(), "a12f");
    }

    #[test]
    fn test_growth_preserves_both_sides() {
        let config = StorageConfig::new(4, 10).unwrap();
        let mut buf = CharBuffer::with_config(config);
        buf.replace(0, 0, &chars("abcd")).unwrap();
        buf.replace(2, 2, &chars("XYZ")).unwrap();
        assert_eq!(buf.to_string(), "abXYZcd");
        assert!(buf.capacity() >= 7);
        assert_eq!(buf.capacity() % 4, 0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut buf = CharBuffer::from_str("abc");
        assert_eq!(
            buf.replace(2, 1, &[]),
            Err(StorageError::InvertedRange { start: 2, limit: 1 })
        );
        assert_eq!(buf.to_string(), "abc");
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        let mut buf = CharBuffer::from_str("abc");
        assert_eq!(
            buf.replace(1, 4, &[]),
            Err(StorageError::OutOfBounds { offset: 4, len: 3 })
        );
        assert_eq!(buf.at(3), Err(StorageError::OutOfBounds { offset: 3, len: 3 }));
    }

    #[test]
    fn test_at_with_gap_in_middle() {
        let mut buf = CharBuffer::from_str("hello");
        buf.replace_str(1, 1, "-").unwrap();
        assert_eq!(buf.to_string(), "h-ello");
        assert_eq!(buf.at(0), Ok('h'));
        assert_eq!(buf.at(1), Ok('-'));
        assert_eq!(buf.at(2), Ok('e'));
        assert_eq!(buf.at(5), Ok('o'));
    }

    #[test]
    fn test_copy_range_straddles_gap() {
        let mut buf = CharBuffer::from_str("hello world");
        buf.replace_str(5, 5, ",").unwrap();
        assert_eq!(buf.gap_position(), 6);

        let mut dst = ['\0'; 6];
        buf.copy_range(3, 9, &mut dst).unwrap();
        assert_eq!(dst.iter().collect::<String>(), "lo, wo");
    }

    #[test]
    fn test_copy_range_rejects_short_destination() {
        let buf = CharBuffer::from_str("hello");
        let mut dst = ['\0'; 2];
        assert!(buf.copy_range(0, 3, &mut dst).is_err());
    }

    #[test]
    fn test_slice() {
        let buf = CharBuffer::from_str("hello world");
        assert_eq!(buf.slice(0, 5).unwrap(), "hello");
        assert_eq!(buf.slice(6, 11).unwrap(), "world");
        assert!(buf.slice(6, 12).is_err());
    }

    #[test]
    fn test_reserve_capacity_moves_gap() {
        let mut buf = CharBuffer::from_str("abcdef");
        buf.reserve_capacity(2, 500).unwrap();
        assert_eq!(buf.gap_position(), 2);
        assert!(buf.capacity() >= 506);
        assert_eq!(buf.to_string(), "abcdef");

        let capacity = buf.capacity();
        buf.replace_str(2, 2, &"x".repeat(500)).unwrap();
        assert_eq!(buf.capacity(), capacity);
    }

    #[test]
    fn test_compress() {
        let mut buf = CharBuffer::from_str("hello");
        buf.replace_str(0, 0, ">").unwrap();
        buf.compress();
        assert_eq!(buf.capacity(), 6);
        assert_eq!(buf.to_string(), ">hello");

        buf.replace(0, 6, &[]).unwrap();
        buf.compress();
        assert_eq!(buf.capacity(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_large_insert() {
        let mut buf = CharBuffer::new();
        for i in 0..1000 {
            let ch = char::from_u32('a' as u32 + (i % 26) as u32).unwrap();
            buf.replace(i, i, &[ch]).unwrap();
        }
        assert_eq!(buf.len(), 1000);
        assert_eq!(buf.at(27), Ok('b'));
    }

    // ==================== Cursor ====================

    #[test]
    fn test_cursor_walks_forward_and_back() {
        let mut buf = CharBuffer::from_str("abd");
        buf.replace_str(2, 2, "c").unwrap();
        let mut cursor = buf.cursor(1, 4).unwrap();

        assert_eq!(cursor.first(&buf), Ok(Some('b')));
        assert_eq!(cursor.next(&buf), Ok(Some('c')));
        assert_eq!(cursor.next(&buf), Ok(Some('d')));
        assert_eq!(cursor.next(&buf), Ok(None));
        assert_eq!(cursor.index(), 4);
        assert_eq!(cursor.previous(&buf), Ok(Some('d')));
        assert_eq!(cursor.previous(&buf), Ok(Some('c')));
        assert_eq!(cursor.previous(&buf), Ok(Some('b')));
        assert_eq!(cursor.previous(&buf), Ok(None));
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_cursor_empty_range() {
        let buf = CharBuffer::from_str("abc");
        let mut cursor = buf.cursor(2, 2).unwrap();
        assert_eq!(cursor.current(&buf), Ok(None));
        assert_eq!(cursor.last(&buf), Ok(None));
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn test_cursor_set_index_bounds() {
        let buf = CharBuffer::from_str("abc");
        let mut cursor = buf.cursor(0, 2).unwrap();
        assert_eq!(cursor.set_index(&buf, 2), Ok(None));
        assert!(cursor.set_index(&buf, 3).is_err());
    }

    #[test]
    fn test_cursor_goes_stale_after_mutation() {
        let mut buf = CharBuffer::from_str("abc");
        let mut cursor = buf.cursor(0, 3).unwrap();
        assert_eq!(cursor.current(&buf), Ok(Some('a')));

        buf.replace_str(0, 0, "z").unwrap();
        assert_eq!(cursor.current(&buf), Err(StorageError::StaleIterator));
        assert_eq!(cursor.next(&buf), Err(StorageError::StaleIterator));
        assert!(!cursor.is_valid_for(&buf));
    }

    #[test]
    fn test_noop_replace_keeps_cursor_valid() {
        let mut buf = CharBuffer::from_str("abc");
        let cursor = buf.cursor(0, 3).unwrap();
        buf.replace(1, 1, &[]).unwrap();
        assert!(cursor.is_valid_for(&buf));
    }

    #[test]
    fn test_cursor_rejects_other_buffer() {
        let buf = CharBuffer::from_str("abc");
        let copy = buf.clone();
        let cursor = buf.cursor(0, 3).unwrap();
        assert_eq!(cursor.current(&copy), Err(StorageError::StaleIterator));
    }
}
