// Chunk: docs/chunks/styled_text - Characters and character styles edited together
// Chunk: docs/chunks/style_buffer - Character style runs over a run boundary table

//! styled-text-buffer: storage for rich text in an editor.
//!
//! This crate keeps a sequence of characters and, for every character, a style
//! (an immutable [`AttributeMap`]). Styles are stored as runs: maximal spans of
//! characters sharing one map. Both structures are gap-based, so typing at the
//! same spot costs O(1) per keystroke regardless of document size.
//!
//! # Overview
//!
//! - [`CharBuffer`] - gap buffer of characters with generation-checked
//!   [`CharCursor`]s.
//! - [`StyleBuffer`] - run-length encoded styles over a dual-region run table:
//!   run starts before the edit point are stored from the beginning of the text,
//!   run starts after it from the end, so edits never renumber boundaries.
//! - [`StyledText`] - both buffers kept in step, with a damaged range for the
//!   layout layer and a time stamp for caches.
//! - [`AttributeMap`] / [`AttributeSet`] - persistent, structurally compared
//!   style values; [`StyleModifier`] and any closure implementing
//!   [`ModifyStyle`] transform them over a range.
//!
//! # Example
//!
//! ```
//! use styled_text_buffer::{AttributeKey, AttributeMap, AttributeSet, StyleModifier, StyledText};
//!
//! let plain = AttributeMap::new(AttributeKey::Family, "Serif");
//! let bold = plain.add_attribute(AttributeKey::Weight, 700i64);
//!
//! let mut text = StyledText::from_str("Hello", bold.clone());
//! text.append(&StyledText::from_str(" World", bold.clone())).unwrap();
//! assert_eq!(text.style_buffer().run_count(), 1);
//!
//! // Un-bold the second word
//! text.reset_damaged_range();
//! let unbold = StyleModifier::remove(AttributeSet::single(AttributeKey::Weight));
//! assert!(text.modify_character_styles(6, 11, &unbold).unwrap());
//! assert_eq!(text.character_style_at(8).unwrap(), plain);
//! assert_eq!(text.character_style_limit(0).unwrap(), 6);
//! assert_eq!(text.damaged_range().range(), Some(6..11));
//! ```
//!
//! # Keeping buffers in sync
//!
//! When driving [`CharBuffer`] and [`StyleBuffer`] directly, apply every
//! character edit to the character buffer first and then mirror it into the
//! style buffer with the identical range:
//!
//! - insert `n` chars at `p` - `insert_text(p, p + n)`
//! - delete `[a, b)` - `delete_text(a, b)`
//! - paste styled text - `replace(a, b, src, src_start, src_limit)`
//!
//! [`StyledText`] does this for you.
//!
//! # Logging
//!
//! The crate emits `tracing` events (`trace` for gap and run-table movement,
//! `debug` for growth and compaction, `error` for consistency failures) and
//! never installs a subscriber.

mod attribute;
mod attribute_map;
mod char_buffer;
mod config;
mod error;
mod run_array;
mod style_buffer;
mod style_modifier;
mod styled_text;
mod types;

pub use attribute::{AttributeKey, AttributeValue, Color, NamedColor, UnderlineStyle};
pub use attribute_map::{AttributeMap, AttributeSet};
pub use char_buffer::{CharBuffer, CharCursor};
pub use config::StorageConfig;
pub use error::{Result, StorageError};
pub use style_buffer::{StyleBuffer, StyleRuns};
pub use style_modifier::{ModifyStyle, StyleModifier};
pub use styled_text::StyledText;
pub use types::{DamagedRange, StyleRun};
