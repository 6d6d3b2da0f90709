#![forbid(unsafe_code)]

//! Per-owner event and binding bookkeeping.
//!
//! Every element and page carries an [`EventSupport`]: one owner id, the
//! registration handles accumulated under it, and the element's binding
//! manager wired to the outbound sink. Unloading the support (explicitly
//! or by dropping it) withdraws every handler it registered, so a torn
//! down element can never receive another event.

use std::sync::Arc;

use tracing::debug;

use remui_bind::BindingManager;
use remui_core::{EventDeclList, InteractionKind, PatchList};
use remui_events::{EventHandler, EventRouter, OwnerId, RegistrationHandle};

use crate::event_spec::EventSpec;
use crate::sink::UpdateSink;

/// Consolidated event handling and data binding for one owner.
pub struct EventSupport<S> {
    router: Arc<EventRouter<S>>,
    sink: Arc<dyn UpdateSink>,
    owner: OwnerId,
    registrations: Vec<RegistrationHandle<S>>,
    bindings: BindingManager,
}

impl<S: 'static> EventSupport<S> {
    /// Create a support bundle registering through `router` and delivering
    /// binding updates through `sink`.
    #[must_use]
    pub fn new(router: Arc<EventRouter<S>>, sink: Arc<dyn UpdateSink>) -> Self {
        let delivery = Arc::clone(&sink);
        let bindings = BindingManager::new(move |patches: PatchList| {
            delivery.send_update(patches, EventDeclList::new(), false);
        });
        Self {
            router,
            sink,
            owner: OwnerId::next(),
            registrations: Vec::new(),
            bindings,
        }
    }

    /// The owner id everything here registers under.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The binding manager for this owner's bound fields.
    #[must_use]
    pub fn bindings(&self) -> &BindingManager {
        &self.bindings
    }

    /// Register a handler for `action` under this owner, tracking the
    /// handle for teardown.
    pub fn register_event_handler(
        &mut self,
        action: impl Into<String>,
        handler: Arc<dyn EventHandler<S>>,
    ) {
        let handle = self.router.register_handler(action, self.owner, handler);
        self.registrations.push(handle);
    }

    /// Wire an [`EventSpec`] to a client-side interaction on `selector`.
    ///
    /// Registers the spec's handler with the router and appends the
    /// client-side declaration (interaction, selector, static payload) to
    /// `events` for the next outbound update.
    pub fn declare_event(
        &mut self,
        interaction: InteractionKind,
        selector: impl Into<String>,
        spec: EventSpec<S>,
        events: &mut EventDeclList,
    ) {
        let (decl, handler) = spec.into_wire(interaction, selector);
        self.register_event_handler(decl.action().to_owned(), handler);
        events.add(decl);
    }

    /// Send an outbound update through this owner's sink.
    pub fn send_update(&self, patches: PatchList, events: EventDeclList, clear: bool) {
        self.sink.send_update(patches, events, clear);
    }

    /// Number of live registrations held by this owner.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Withdraw every handler registered through this support.
    ///
    /// Idempotent; also runs on drop.
    pub fn unload(&mut self) {
        if self.registrations.is_empty() {
            return;
        }
        debug!(owner = %self.owner, count = self.registrations.len(), "unloading event support");
        for handle in self.registrations.drain(..) {
            self.router.unregister_handler(&handle);
        }
    }
}

impl<S> Drop for EventSupport<S> {
    fn drop(&mut self) {
        for handle in self.registrations.drain(..) {
            self.router.unregister_handler(&handle);
        }
    }
}

impl<S> std::fmt::Debug for EventSupport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSupport")
            .field("owner", &self.owner)
            .field("registrations", &self.registrations.len())
            .finish()
    }
}
