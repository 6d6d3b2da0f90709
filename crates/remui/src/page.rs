#![forbid(unsafe_code)]

//! Page driver: decode, validate, route, and primary-element swapping.
//!
//! A [`PageDriver`] owns everything one remote page needs: the schema
//! registry, the router, its own [`EventSupport`] for page-level handlers
//! and bindings, and the transport sink. Raw inbound payloads go through
//! [`handle_data_event`](PageDriver::handle_data_event); decode failures
//! are fatal for that request, while payloads without an `Action` key
//! trigger a re-sync update instead of being routed.
//!
//! Pages that swap a single primary view (tabs, wizards) use
//! [`show_primary`](PageDriver::show_primary): the previous element is
//! unloaded, the content root cleared, and the new element created there.

use std::sync::Arc;

use tracing::{debug, warn};

use remui_bind::BindingManager;
use remui_core::{DecodeError, EventDeclList, PatchList, RouteOutcome};
use remui_events::{EventRouter, SchemaRegistry};

use crate::element::{Element, create_element};
use crate::sink::UpdateSink;
use crate::support::EventSupport;

/// Default selector for the primary-element container.
const DEFAULT_CONTENT_ROOT: &str = "#Content";

/// Event-driven runtime state for one remote page.
pub struct PageDriver<S> {
    schemas: Arc<SchemaRegistry>,
    router: Arc<EventRouter<S>>,
    sink: Arc<dyn UpdateSink>,
    support: EventSupport<S>,
    primary: Option<Box<dyn Element<S>>>,
    content_root: String,
}

impl<S: 'static> PageDriver<S> {
    /// Create a page driver delivering updates through `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn UpdateSink>) -> Self {
        let schemas = Arc::new(SchemaRegistry::new());
        let router = Arc::new(EventRouter::new(Arc::clone(&schemas)));
        let support = EventSupport::new(Arc::clone(&router), Arc::clone(&sink));
        Self {
            schemas,
            router,
            sink,
            support,
            primary: None,
            content_root: DEFAULT_CONTENT_ROOT.to_owned(),
        }
    }

    /// Override the selector primary elements are created under.
    #[must_use]
    pub fn with_content_root(mut self, root: impl Into<String>) -> Self {
        self.content_root = root.into();
        self
    }

    /// The selector primary elements are created under.
    #[must_use]
    pub fn content_root(&self) -> &str {
        &self.content_root
    }

    /// The shared schema registry.
    #[must_use]
    pub fn schemas(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.schemas)
    }

    /// The shared router.
    #[must_use]
    pub fn router(&self) -> Arc<EventRouter<S>> {
        Arc::clone(&self.router)
    }

    /// The transport sink.
    #[must_use]
    pub fn sink(&self) -> Arc<dyn UpdateSink> {
        Arc::clone(&self.sink)
    }

    /// Page-level event support (handlers and bindings owned by the page
    /// itself rather than by an element).
    #[must_use]
    pub fn support(&self) -> &EventSupport<S> {
        &self.support
    }

    /// Mutable page-level event support.
    pub fn support_mut(&mut self) -> &mut EventSupport<S> {
        &mut self.support
    }

    /// The page's own binding manager.
    #[must_use]
    pub fn bindings(&self) -> &BindingManager {
        self.support.bindings()
    }

    /// Build a fresh support bundle for an element of this page.
    #[must_use]
    pub fn new_support(&self) -> EventSupport<S> {
        EventSupport::new(Arc::clone(&self.router), Arc::clone(&self.sink))
    }

    /// Decode and route one raw inbound payload.
    ///
    /// Decode failures are returned to the host unretried. A payload
    /// without an `Action` key is answered with a re-sync update and
    /// reported as `NotHandled`; so is an unknown action or a full
    /// handler fallthrough.
    pub fn handle_data_event(&self, session: &S, raw: &str) -> Result<RouteOutcome, DecodeError> {
        let bag = self.schemas.composite().decode(raw).inspect_err(|err| {
            warn!(%err, "dropping undecodable payload");
        })?;

        if bag.action().is_none() {
            debug!("payload without action key; requesting re-sync");
            self.send_update(PatchList::new(), EventDeclList::new(), false);
            return Ok(RouteOutcome::NotHandled);
        }

        Ok(self.router.route_event(session, &bag))
    }

    /// Send an outbound update through the page's sink.
    pub fn send_update(&self, patches: PatchList, events: EventDeclList, clear: bool) {
        self.sink.send_update(patches, events, clear);
    }

    /// Show `element` as the primary element.
    ///
    /// A no-op when an element with the same selector id is already
    /// primary. Otherwise the previous primary is unloaded, the content
    /// root cleared, and the new element created there.
    pub fn show_primary(&mut self, mut element: Box<dyn Element<S>>) {
        if let Some(current) = &self.primary
            && current.selector_id() == element.selector_id()
        {
            return;
        }
        if let Some(mut previous) = self.primary.take() {
            debug!(id = previous.selector_id(), "unloading previous primary element");
            previous.support_mut().unload();
        }

        let mut patches = PatchList::new();
        patches.clear(&self.content_root);
        self.sink
            .send_update(patches, EventDeclList::new(), false);

        let root = self.content_root.clone();
        create_element(element.as_mut(), &root);
        self.primary = Some(element);
    }

    /// The current primary element's selector id, if any.
    #[must_use]
    pub fn primary_id(&self) -> Option<&str> {
        self.primary.as_deref().map(|e| e.selector_id())
    }

    /// Unload the page: the primary element first, then page-level
    /// handlers.
    pub fn unload(&mut self) {
        if let Some(mut primary) = self.primary.take() {
            primary.support_mut().unload();
        }
        self.support.unload();
    }
}

impl<S> std::fmt::Debug for PageDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageDriver")
            .field("content_root", &self.content_root)
            .field("primary", &self.primary.as_deref().map(|e| e.selector_id()))
            .finish()
    }
}
