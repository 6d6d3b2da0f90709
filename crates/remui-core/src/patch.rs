#![forbid(unsafe_code)]

//! Outbound patch documents.
//!
//! A [`PatchList`] is an ordered collection of [`PatchOp`]s: abstract
//! instructions to update the remote UI tree. The list is what a binding
//! manager or element emits; delivering it is the transport's concern.
//!
//! # Invariants
//!
//! 1. Op order equals call order; delivery must preserve it.
//! 2. A `PatchList` never reorders, merges, or deduplicates ops.

use serde::{Deserialize, Serialize};

use crate::display::DisplayValue;

/// One instruction to update the remote UI tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PatchOp {
    /// Replace the display value at `selector`.
    Set {
        /// Absolute target selector.
        selector: String,
        /// New display value.
        value: DisplayValue,
    },
    /// Append a markup document under `selector`.
    Append {
        /// Absolute target selector.
        selector: String,
        /// Opaque markup reference or document.
        markup: String,
    },
    /// Append inline markup under `selector`.
    AppendInline {
        /// Absolute target selector.
        selector: String,
        /// Opaque inline markup.
        markup: String,
    },
    /// Remove the element at `selector`.
    Remove {
        /// Absolute target selector.
        selector: String,
    },
    /// Clear all children of `selector`.
    Clear {
        /// Absolute target selector.
        selector: String,
    },
}

impl PatchOp {
    /// The selector this op targets.
    #[must_use]
    pub fn selector(&self) -> &str {
        match self {
            Self::Set { selector, .. }
            | Self::Append { selector, .. }
            | Self::AppendInline { selector, .. }
            | Self::Remove { selector }
            | Self::Clear { selector } => selector,
        }
    }
}

/// Ordered builder over [`PatchOp`]s.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchList {
    ops: Vec<PatchOp>,
}

impl PatchList {
    /// Create an empty patch list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the display value at `selector`.
    pub fn set(&mut self, selector: impl Into<String>, value: DisplayValue) -> &mut Self {
        self.ops.push(PatchOp::Set {
            selector: selector.into(),
            value,
        });
        self
    }

    /// Append a markup document under `selector`.
    pub fn append(&mut self, selector: impl Into<String>, markup: impl Into<String>) -> &mut Self {
        self.ops.push(PatchOp::Append {
            selector: selector.into(),
            markup: markup.into(),
        });
        self
    }

    /// Append inline markup under `selector`.
    pub fn append_inline(
        &mut self,
        selector: impl Into<String>,
        markup: impl Into<String>,
    ) -> &mut Self {
        self.ops.push(PatchOp::AppendInline {
            selector: selector.into(),
            markup: markup.into(),
        });
        self
    }

    /// Remove the element at `selector`.
    pub fn remove(&mut self, selector: impl Into<String>) -> &mut Self {
        self.ops.push(PatchOp::Remove {
            selector: selector.into(),
        });
        self
    }

    /// Clear all children of `selector`.
    pub fn clear(&mut self, selector: impl Into<String>) -> &mut Self {
        self.ops.push(PatchOp::Clear {
            selector: selector.into(),
        });
        self
    }

    /// Ops in emission order.
    #[must_use]
    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    /// Consume the list, yielding its ops.
    #[must_use]
    pub fn into_ops(self) -> Vec<PatchOp> {
        self.ops
    }

    /// Number of ops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether no ops have been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_preserve_call_order() {
        let mut list = PatchList::new();
        list.set("#A", DisplayValue::Text("1".into()))
            .clear("#B")
            .remove("#C");

        let selectors: Vec<&str> = list.ops().iter().map(PatchOp::selector).collect();
        assert_eq!(selectors, vec!["#A", "#B", "#C"]);
    }

    #[test]
    fn empty_list_reports_empty() {
        let list = PatchList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn into_ops_yields_everything() {
        let mut list = PatchList::new();
        list.append("#Root", "Example/Tab1.ui");
        list.append_inline("#Root", "Group #Item0 { } ");
        let ops = list.into_ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], PatchOp::Append { .. }));
        assert!(matches!(ops[1], PatchOp::AppendInline { .. }));
    }

    #[test]
    fn serde_round_trip() {
        let mut list = PatchList::new();
        list.set("#Card #Score", DisplayValue::Text("10".into()));
        let json = serde_json::to_string(&list).expect("serialize");
        let back: PatchList = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, list);
    }
}
