#![forbid(unsafe_code)]

//! remui: reactive bindings and event routing for server-driven remote UIs.
//!
//! remui sits between a declarative UI description and a stateful
//! server-side object graph. Inbound named actions from the remote surface
//! are decoded against dynamically registered parameter schemas and routed
//! to owner-scoped handlers; server-side fields declared as bound to a UI
//! location push targeted patches back out whenever their value changes.
//!
//! The workspace is layered:
//!
//! - [`remui_core`]: selectors, display values, patch documents,
//!   client-side event declarations.
//! - [`remui_events`]: the schema registry, composite decoder, and the
//!   action router.
//! - [`remui_bind`]: reactive cells and the binding manager.
//! - this crate: the composition surface gluing them together per page:
//!   [`EventSupport`], [`EventSpec`], [`Element`], [`PageDriver`], and the
//!   [`UpdateSink`] transport boundary.
//!
//! # A page in five lines
//!
//! ```
//! use std::sync::Arc;
//! use remui::prelude::*;
//!
//! struct NullSink;
//! impl UpdateSink for NullSink {
//!     fn send_update(&self, _: PatchList, _: EventDeclList, _: bool) {}
//! }
//!
//! let mut page: PageDriver<()> = PageDriver::new(Arc::new(NullSink));
//! page.support_mut().register_event_handler(
//!     "hello-clicked",
//!     HandlerBuilder::new().build::<(), _>(|_ctx| { /* react */ }),
//! );
//! let outcome = page.handle_data_event(&(), r#"{"Action":"hello-clicked"}"#);
//! assert!(outcome.unwrap().is_handled());
//! ```

pub mod element;
pub mod event_spec;
pub mod page;
pub mod sink;
pub mod support;

pub use element::{Element, create_element, create_indexed};
pub use event_spec::EventSpec;
pub use page::PageDriver;
pub use sink::UpdateSink;
pub use support::EventSupport;

/// Single-import convenience for hosts and elements.
pub mod prelude {
    pub use remui_bind::{Bindable, BindingManager};
    pub use remui_core::{
        ACTION_KEY, DecodeError, DisplayValue, EventDecl, EventDeclList, InteractionKind,
        PatchList, PatchOp, RichText, RouteOutcome, ToDisplay, selector,
    };
    pub use remui_events::{
        EventContext, EventHandler, EventRouter, HandlerBuilder, KeyedSchema, OwnerId, ParamBag,
        ParamKind, ParamValue, RegistrationHandle, SchemaRegistry,
    };

    pub use crate::element::{Element, create_element, create_indexed};
    pub use crate::event_spec::EventSpec;
    pub use crate::page::PageDriver;
    pub use crate::sink::UpdateSink;
    pub use crate::support::EventSupport;
}
