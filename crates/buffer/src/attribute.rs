// Chunk: docs/chunks/attribute_map - Attribute keys and values

//! Keys and values stored in an [`AttributeMap`](crate::AttributeMap).
//!
//! Keys cover the character and paragraph attributes an editing layer typically
//! sets (font family, weight, colors, margins, ...) plus an escape hatch for
//! application-defined keys. Values are small, cheaply cloneable, totally
//! ordered and hashable, so two maps can be compared structurally.
//!
//! # Example
//!
//! ```
//! use styled_text_buffer::{AttributeKey, AttributeValue, Color, NamedColor};
//!
//! let key = AttributeKey::Foreground;
//! let value = AttributeValue::Color(Color::Named(NamedColor::Red));
//! assert_eq!(value.as_color(), Some(Color::Named(NamedColor::Red)));
//! assert!(key < AttributeKey::custom("x"));
//! ```

use std::fmt;
use std::sync::Arc;

// =============================================================================
// Color Types
// =============================================================================

/// The 16 standard ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

/// A foreground or background color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Color {
    /// Let the renderer decide.
    #[default]
    Default,
    /// Named ANSI colors (0-15).
    Named(NamedColor),
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit RGB color.
    Rgb { r: u8, g: u8, b: u8 },
}

/// Underline rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

// =============================================================================
// Keys
// =============================================================================

/// Identifies one attribute in a style.
///
/// The declaration order is the sort order used inside attribute maps; new
/// well-known keys go before `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeKey {
    Family,
    Weight,
    Posture,
    Size,
    Superscript,
    Foreground,
    Background,
    Underline,
    Strikethrough,
    ExtraLineSpacing,
    FirstLineIndent,
    MinLineSpacing,
    LineFlush,
    LeadingMargin,
    TrailingMargin,
    RunDirection,
    Justification,
    /// Application-defined key.
    Custom(Arc<str>),
}

impl AttributeKey {
    /// Creates an application-defined key.
    pub fn custom(name: impl Into<Arc<str>>) -> Self {
        AttributeKey::Custom(name.into())
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::Custom(name) => write!(f, "custom:{}", name),
            other => write!(f, "{:?}", other),
        }
    }
}

// =============================================================================
// Values
// =============================================================================

/// The value half of an attribute entry.
///
/// Lengths (sizes, margins, indents) are stored as integers in the caller's
/// unit of choice, which keeps values totally ordered and hashable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Text(Arc<str>),
    Color(Color),
    Underline(UnderlineStyle),
}

impl AttributeValue {
    pub fn text(value: impl Into<Arc<str>>) -> Self {
        AttributeValue::Text(value.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            AttributeValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.into())
    }
}

impl From<Color> for AttributeValue {
    fn from(value: Color) -> Self {
        AttributeValue::Color(value)
    }
}

impl From<UnderlineStyle> for AttributeValue {
    fn from(value: UnderlineStyle) -> Self {
        AttributeValue::Underline(value)
    }
}
