#![forbid(unsafe_code)]

//! Client-side event-binding declarations.
//!
//! An [`EventDecl`] tells the remote surface which interaction on which
//! selector should fire a wire action back to the server, together with the
//! static payload entries to send. The payload always leads with the
//! reserved `Action` entry; additional entries follow in declaration order.

use serde::{Deserialize, Serialize};

use crate::ACTION_KEY;

/// Which client-side interaction fires the wire action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// The element was activated (clicked, pressed, selected).
    Activating,
    /// The element's value changed (text input, slider, toggle).
    ValueChanged,
    /// The pointer entered the element.
    Hovering,
    /// The element (or its container) was dismissed.
    Dismissing,
}

/// One client-side event binding: interaction + selector + static payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDecl {
    /// Interaction that triggers the action.
    pub interaction: InteractionKind,
    /// Selector of the element the interaction is observed on.
    pub selector: String,
    /// Static payload entries, `Action` first.
    pub payload: Vec<(String, String)>,
}

impl EventDecl {
    /// Declare an event binding for `action`, seeding the payload with the
    /// reserved `Action` entry.
    #[must_use]
    pub fn for_action(
        interaction: InteractionKind,
        selector: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            interaction,
            selector: selector.into(),
            payload: vec![(ACTION_KEY.to_owned(), action.into())],
        }
    }

    /// Append a static payload entry.
    pub fn push_payload(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.payload.push((key.into(), value.into()));
    }

    /// The action this declaration fires.
    #[must_use]
    pub fn action(&self) -> &str {
        // for_action seeds the Action entry; it is never removed.
        &self.payload[0].1
    }
}

/// Ordered collection of [`EventDecl`]s for one outbound update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDeclList {
    decls: Vec<EventDecl>,
}

impl EventDeclList {
    /// Create an empty declaration list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration.
    pub fn add(&mut self, decl: EventDecl) -> &mut Self {
        self.decls.push(decl);
        self
    }

    /// Declarations in addition order.
    #[must_use]
    pub fn decls(&self) -> &[EventDecl] {
        &self.decls
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether no declarations have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
