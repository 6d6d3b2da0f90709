#![forbid(unsafe_code)]

//! Display values written at selectors, and conversion into them.
//!
//! A patch carries a [`DisplayValue`]: the representation of a bound value
//! as the remote surface should show it. Conversion follows one rule,
//! applied by [`ToDisplay`]:
//!
//! - an absent value renders as empty text ([`DisplayValue::Empty`]),
//! - a value that is already rich-text capable passes through unchanged,
//! - anything else converts via its string form.
//!
//! [`RichText`] is the pass-through form. Its markup syntax belongs to the
//! remote surface; this crate treats it as opaque.

use serde::{Deserialize, Serialize};

/// Rich-text markup accepted by the remote surface as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText(String);

impl RichText {
    /// Wrap a markup string.
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// The raw markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RichText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a patch writes at its target selector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DisplayValue {
    /// Absent value; renders as empty text.
    Empty,
    /// Plain text.
    Text(String),
    /// Rich-text markup, passed through unchanged.
    Rich(RichText),
}

impl DisplayValue {
    /// Plain-text view of the value (`""` for [`Empty`](Self::Empty),
    /// raw markup for [`Rich`](Self::Rich)).
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Text(s) => s,
            Self::Rich(r) => r.as_str(),
        }
    }
}

impl std::fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_text())
    }
}

/// Conversion of a bound value into its display representation.
///
/// Implemented for the primitive types a binding typically holds plus the
/// pass-through forms. Bound cell types must implement this.
pub trait ToDisplay {
    /// The display representation of this value.
    fn to_display(&self) -> DisplayValue;
}

impl ToDisplay for DisplayValue {
    fn to_display(&self) -> DisplayValue {
        self.clone()
    }
}

impl ToDisplay for RichText {
    fn to_display(&self) -> DisplayValue {
        DisplayValue::Rich(self.clone())
    }
}

impl ToDisplay for String {
    fn to_display(&self) -> DisplayValue {
        DisplayValue::Text(self.clone())
    }
}

impl ToDisplay for &str {
    fn to_display(&self) -> DisplayValue {
        DisplayValue::Text((*self).to_owned())
    }
}

macro_rules! impl_to_display_via_to_string {
    ($($ty:ty),+ $(,)?) => {
        $(impl ToDisplay for $ty {
            fn to_display(&self) -> DisplayValue {
                DisplayValue::Text(self.to_string())
            }
        })+
    };
}

impl_to_display_via_to_string!(bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
