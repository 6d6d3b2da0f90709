#![forbid(unsafe_code)]

//! Element composition surface.
//!
//! An element is one server-side UI component: it declares its structure
//! and event bindings in [`on_create`](Element::on_create), owns an
//! [`EventSupport`] for its handlers and bound fields, and is torn down by
//! unloading that support. Elements are created either standalone (one
//! outbound update of their own) or as indexed items appended into a
//! caller's builders, so list items merge their creation commands and
//! initial binding values into a single outbound message.

use remui_core::{EventDeclList, PatchList, selector};
use tracing::debug;

use crate::support::EventSupport;

/// One server-side UI component.
pub trait Element<S>: Send {
    /// Stable id used for indexed container selectors and primary-element
    /// identity (conventionally the element's type name).
    fn selector_id(&self) -> &str;

    /// The element's event/binding bundle.
    fn support_mut(&mut self) -> &mut EventSupport<S>;

    /// Declare structure and event bindings under `root`.
    ///
    /// Implementations add creation commands to `patches`, declare
    /// client-side bindings in `events`, and may seed initial values of
    /// bound fields into `patches` so they ride along with creation.
    fn on_create(&mut self, root: &str, patches: &mut PatchList, events: &mut EventDeclList);
}

/// Create `element` standalone at `root` and send its update.
///
/// Sets the binding root, runs [`Element::on_create`] into fresh builders,
/// and delivers the result through the element's own sink.
pub fn create_element<S: 'static>(element: &mut dyn Element<S>, root: &str) {
    debug!(id = element.selector_id(), root, "creating element");
    element.support_mut().bindings().set_root_selector(root);

    let mut patches = PatchList::new();
    let mut events = EventDeclList::new();
    element.on_create(root, &mut patches, &mut events);
    element.support_mut().send_update(patches, events, false);
}

/// Create `element` as item `index` of a list under `root`, appending to
/// the caller's builders instead of sending.
///
/// Emits an indexed group container (`#<id><index>`), scopes the element's
/// binding root to it, and runs [`Element::on_create`] with the nested
/// root. Nothing is delivered here; the caller sends one combined update.
pub fn create_indexed<S: 'static>(
    element: &mut dyn Element<S>,
    root: &str,
    index: usize,
    patches: &mut PatchList,
    events: &mut EventDeclList,
) {
    let container = selector::indexed(&format!("#{}", element.selector_id()), index);
    patches.append_inline(root, format!("Group {container} {{ }} "));

    let item_root = selector::selectors(&[root, &container]);
    element.support_mut().bindings().set_root_selector(&item_root);
    element.on_create(&item_root, patches, events);
}
