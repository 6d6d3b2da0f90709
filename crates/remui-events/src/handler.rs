#![forbid(unsafe_code)]

//! Handler capability and dispatch context.
//!
//! A handler is anything that can look at a decoded event and decide
//! whether to claim it. Handlers also declare which parameter keys they
//! want decoded; the router forwards those declarations to the schema
//! registry on registration and withdraws them on unregistration.
//!
//! `S` is the host's session/entity type: whatever the surrounding
//! environment associates with the remote client the event came from. The
//! core never inspects it.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::schema::{KeyedSchema, ParamBag, ParamKind, ParamValue};

/// Read-only view a handler receives for one dispatched event.
pub struct EventContext<'a, S: ?Sized> {
    session: &'a S,
    bag: &'a ParamBag,
}

impl<'a, S: ?Sized> EventContext<'a, S> {
    /// Build a context around a decoded bag and the host session.
    #[must_use]
    pub fn new(session: &'a S, bag: &'a ParamBag) -> Self {
        Self { session, bag }
    }

    /// The host session/entity this event concerns.
    #[must_use]
    pub fn session(&self) -> &'a S {
        self.session
    }

    /// Look up a decoded parameter.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&'a ParamValue> {
        self.bag.get(key)
    }

    /// Whether the payload carried `key`.
    #[must_use]
    pub fn has_parameter(&self, key: &str) -> bool {
        self.bag.has(key)
    }

    /// The decoded bag itself.
    #[must_use]
    pub fn bag(&self) -> &'a ParamBag {
        self.bag
    }
}

/// Capability invoked for events matching a registered action.
pub trait EventHandler<S>: Send + Sync {
    /// Inspect the event; return `true` to claim it and stop dispatch.
    fn handle(&self, context: &EventContext<'_, S>) -> bool;

    /// Parameter keys this handler wants decoded from the wire payload.
    fn parameter_schemas(&self) -> Vec<KeyedSchema> {
        Vec::new()
    }
}

/// Fluent builder producing closure-backed handlers.
///
/// ```
/// use remui_events::{HandlerBuilder, ParamKind};
///
/// let handler = HandlerBuilder::new()
///     .with_parameter("slot", ParamKind::Int)
///     .build::<(), _>(|ctx| {
///         let _slot = ctx.parameter("slot").and_then(|v| v.as_int());
///     });
/// assert_eq!(handler.parameter_schemas().len(), 1);
/// ```
#[derive(Default)]
pub struct HandlerBuilder {
    schemas: Vec<KeyedSchema>,
}

impl HandlerBuilder {
    /// Start an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter this handler wants decoded.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, kind: ParamKind) -> Self {
        self.schemas.push(KeyedSchema::new(key, kind));
        self
    }

    /// Build a handler that always claims the event.
    pub fn build<S, F>(self, f: F) -> Arc<dyn EventHandler<S>>
    where
        S: 'static,
        F: Fn(&EventContext<'_, S>) + Send + Sync + 'static,
    {
        Arc::new(FnHandler {
            schemas: self.schemas,
            f: move |ctx: &EventContext<'_, S>| {
                f(ctx);
                true
            },
            _session: PhantomData,
        })
    }

    /// Build a handler whose return value decides whether the event is
    /// claimed; `false` lets routing continue to the next handler.
    pub fn build_conditional<S, F>(self, f: F) -> Arc<dyn EventHandler<S>>
    where
        S: 'static,
        F: Fn(&EventContext<'_, S>) -> bool + Send + Sync + 'static,
    {
        Arc::new(FnHandler {
            schemas: self.schemas,
            f,
            _session: PhantomData,
        })
    }
}

struct FnHandler<S, F> {
    schemas: Vec<KeyedSchema>,
    f: F,
    // fn(&S) keeps the handler Send + Sync independent of S.
    _session: PhantomData<fn(&S)>,
}

impl<S, F> EventHandler<S> for FnHandler<S, F>
where
    F: Fn(&EventContext<'_, S>) -> bool + Send + Sync,
{
    fn handle(&self, context: &EventContext<'_, S>) -> bool {
        (self.f)(context)
    }

    fn parameter_schemas(&self) -> Vec<KeyedSchema> {
        self.schemas.clone()
    }
}
