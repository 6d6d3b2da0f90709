#![forbid(unsafe_code)]

//! Transport boundary for outbound updates.

use remui_core::{EventDeclList, PatchList};

/// Delivers patch batches and event declarations to the remote surface.
///
/// Implemented by the host's page/session transport. Delivery is
/// fire-and-continue: the core never waits on it, and delivery failure is
/// the host's concern. `clear` asks the surface to drop existing content
/// before applying the update.
pub trait UpdateSink: Send + Sync {
    /// Send one outbound update.
    fn send_update(&self, patches: PatchList, events: EventDeclList, clear: bool);
}
