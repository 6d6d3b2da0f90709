//! In-memory stand-in for the page/session transport.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

use remui::prelude::*;

/// Sink that logs every outbound update instead of crossing a wire.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    delivered: AtomicUsize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates delivered so far.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl UpdateSink for ConsoleSink {
    fn send_update(&self, patches: PatchList, events: EventDeclList, clear: bool) {
        let update = self.delivered.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            update,
            clear,
            patches = patches.len(),
            events = events.len(),
            "server -> client"
        );
        for op in patches.ops() {
            info!(update, "  patch {op:?}");
        }
        for decl in events.decls() {
            info!(
                update,
                "  on {:?} at {} fire {:?}",
                decl.interaction,
                decl.selector,
                decl.action()
            );
        }
    }
}
