#![forbid(unsafe_code)]

//! Core data model for remui.
//!
//! This crate holds the leaf vocabulary shared by the event-routing and
//! reactive-binding layers: hierarchical [selector](selector) paths,
//! [display values](display) written at selectors, outbound
//! [patch documents](patch), declarative client-side
//! [event bindings](event_decl), and the [error](error) taxonomy.
//!
//! Nothing in this crate touches a transport or a markup parser; patch
//! documents and event declarations are abstract instructions for whatever
//! remote surface the host connects.

pub mod display;
pub mod error;
pub mod event_decl;
pub mod patch;
pub mod selector;

pub use display::{DisplayValue, RichText, ToDisplay};
pub use error::{DecodeError, RouteOutcome};
pub use event_decl::{EventDecl, EventDeclList, InteractionKind};
pub use patch::{PatchList, PatchOp};
pub use selector::{indexed, join, selectors};

/// Reserved parameter key correlating an inbound payload with a handler.
///
/// Every decoded parameter bag that reaches a handler carries this key as a
/// string; payloads without it are never routed.
pub const ACTION_KEY: &str = "Action";
