#![forbid(unsafe_code)]

//! Fluent builder tying an action to its handler and client payload.
//!
//! An [`EventSpec`] describes one interactive behavior: the wire action,
//! the typed parameters to decode from incoming events, the static payload
//! entries the client sends back, and the server-side handler. Specs are
//! wired to a selector and interaction through
//! [`EventSupport::declare_event`](crate::EventSupport::declare_event).
//!
//! ```
//! use remui::prelude::*;
//!
//! let spec: EventSpec<()> = EventSpec::action("item-picked")
//!     .with_payload("itemId", ParamKind::Str, "item123")
//!     .on_event(|ctx| {
//!         let _id = ctx.parameter("itemId").and_then(|v| v.as_str());
//!     });
//! ```

use std::sync::Arc;

use remui_core::{EventDecl, InteractionKind};
use remui_events::{EventContext, EventHandler, HandlerBuilder, KeyedSchema, ParamKind};

enum SpecHandler<S> {
    /// No handler attached; such a spec declines every event.
    None,
    /// Always claims the event.
    Always(Box<dyn Fn(&EventContext<'_, S>) + Send + Sync>),
    /// Claims only when the closure returns true.
    Conditional(Box<dyn Fn(&EventContext<'_, S>) -> bool + Send + Sync>),
}

/// Builder for one action binding: parameters, static payload, handler.
pub struct EventSpec<S> {
    action: String,
    schemas: Vec<KeyedSchema>,
    payload: Vec<(String, String)>,
    handler: SpecHandler<S>,
}

impl<S: 'static> EventSpec<S> {
    /// Start a spec for the given wire action.
    #[must_use]
    pub fn action(name: impl Into<String>) -> Self {
        Self {
            action: name.into(),
            schemas: Vec::new(),
            payload: Vec::new(),
            handler: SpecHandler::None,
        }
    }

    /// Declare a typed parameter and the static value the client sends
    /// for it. Registers the decoder and adds the payload entry.
    #[must_use]
    pub fn with_payload(
        mut self,
        key: impl Into<String>,
        kind: ParamKind,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        self.schemas.push(KeyedSchema::new(key.clone(), kind));
        self.payload.push((key, value.into()));
        self
    }

    /// Declare a typed parameter the client computes itself (no static
    /// payload entry).
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, kind: ParamKind) -> Self {
        self.schemas.push(KeyedSchema::new(key, kind));
        self
    }

    /// Attach a handler that always claims the event.
    #[must_use]
    pub fn on_event(mut self, f: impl Fn(&EventContext<'_, S>) + Send + Sync + 'static) -> Self {
        self.handler = SpecHandler::Always(Box::new(f));
        self
    }

    /// Attach a handler whose return value decides whether the event is
    /// claimed; `false` lets routing fall through to the next handler.
    #[must_use]
    pub fn on_event_conditional(
        mut self,
        f: impl Fn(&EventContext<'_, S>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.handler = SpecHandler::Conditional(Box::new(f));
        self
    }

    /// The wire action this spec fires on.
    #[must_use]
    pub fn action_name(&self) -> &str {
        &self.action
    }

    /// Produce the router handler for this spec.
    #[must_use]
    pub fn into_handler(self) -> Arc<dyn EventHandler<S>> {
        let mut builder = HandlerBuilder::new();
        for schema in self.schemas {
            builder = builder.with_parameter(schema.key, schema.kind);
        }
        match self.handler {
            SpecHandler::None => builder.build_conditional(|_| false),
            SpecHandler::Always(f) => builder.build(move |ctx: &EventContext<'_, S>| f(ctx)),
            SpecHandler::Conditional(f) => {
                builder.build_conditional(move |ctx: &EventContext<'_, S>| f(ctx))
            }
        }
    }

    /// Split the spec into the client-side declaration and the handler.
    pub(crate) fn into_wire(
        self,
        interaction: InteractionKind,
        selector: impl Into<String>,
    ) -> (EventDecl, Arc<dyn EventHandler<S>>) {
        let mut decl = EventDecl::for_action(interaction, selector, self.action.clone());
        for (key, value) in &self.payload {
            decl.push_payload(key.clone(), value.clone());
        }
        (decl, self.into_handler())
    }
}
