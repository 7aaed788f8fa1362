// Chunk: docs/chunks/style_modifier - Style transforms applied over text ranges

//! Style transforms.
//!
//! [`StyleBuffer::modify_styles`](crate::StyleBuffer::modify_styles) applies a
//! transform to every run overlapping a range. Any type implementing
//! [`ModifyStyle`] can be used, including plain closures; [`StyleModifier`]
//! covers the common character-style commands.

use crate::attribute::{AttributeKey, AttributeValue};
use crate::attribute_map::{AttributeMap, AttributeSet};

/// A pure `AttributeMap -> AttributeMap` transform.
pub trait ModifyStyle {
    fn modify_style(&self, style: &AttributeMap) -> AttributeMap;
}

impl<F> ModifyStyle for F
where
    F: Fn(&AttributeMap) -> AttributeMap,
{
    fn modify_style(&self, style: &AttributeMap) -> AttributeMap {
        self(style)
    }
}

/// The standard style transforms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StyleModifier {
    /// Returns the style unchanged.
    #[default]
    Identity,
    /// `style.add_attribute(key, value)`
    AddAttribute(AttributeKey, AttributeValue),
    /// `style.add_attributes(map)`
    Add(AttributeMap),
    /// Ignores the input and returns the map.
    Replace(AttributeMap),
    /// `style.remove_attributes(set)`
    Remove(AttributeSet),
    /// `style.intersect_with(set)`
    Intersect(AttributeSet),
}

impl StyleModifier {
    pub fn add_attribute(key: AttributeKey, value: impl Into<AttributeValue>) -> Self {
        StyleModifier::AddAttribute(key, value.into())
    }

    pub fn add(style: AttributeMap) -> Self {
        StyleModifier::Add(style)
    }

    pub fn replace(style: AttributeMap) -> Self {
        StyleModifier::Replace(style)
    }

    pub fn remove(keys: AttributeSet) -> Self {
        StyleModifier::Remove(keys)
    }

    pub fn intersect(keys: AttributeSet) -> Self {
        StyleModifier::Intersect(keys)
    }
}

impl ModifyStyle for StyleModifier {
    fn modify_style(&self, style: &AttributeMap) -> AttributeMap {
        match self {
            StyleModifier::Identity => style.clone(),
            StyleModifier::AddAttribute(key, value) => style.add_attribute(key.clone(), value.clone()),
            StyleModifier::Add(map) => style.add_attributes(map),
            StyleModifier::Replace(map) => map.clone(),
            StyleModifier::Remove(keys) => style.remove_attributes(keys),
            StyleModifier::Intersect(keys) => style.intersect_with(keys),
        }
    }
}
