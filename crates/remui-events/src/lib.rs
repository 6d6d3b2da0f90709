#![forbid(unsafe_code)]

//! Dynamic event codec registry and action router.
//!
//! Inbound events arrive as raw JSON payloads tagged with a named action.
//! This crate decodes them against a [schema registry](schema) whose key set
//! changes as handlers come and go, then [routes](router) the decoded
//! parameter bag to the handlers registered for that action.
//!
//! # Data flow
//!
//! 1. A handler registers for an action, contributing its parameter
//!    schemas to the shared [`SchemaRegistry`].
//! 2. The transport hands the host a raw payload; the host decodes it with
//!    the registry's current [`CompositeDecoder`] into a [`ParamBag`].
//! 3. [`EventRouter::route_event`] tries the action's handlers in
//!    registration order until one claims the event.
//!
//! # Concurrency
//!
//! Registration and unregistration may race with dispatch. The router's
//! indexes are lock-guarded maps read via snapshots, so a handler may
//! unregister itself (or anything else) mid-dispatch; no lock is held while
//! a handler runs. The composite decoder is rebuilt lazily under the
//! registry lock and published through an atomic snapshot swap.

pub mod handler;
pub mod router;
pub mod schema;

pub use handler::{EventContext, EventHandler, HandlerBuilder};
pub use router::{EventRouter, OwnerId, RegistrationHandle};
pub use schema::{CompositeDecoder, KeyedSchema, ParamBag, ParamKind, ParamValue, SchemaRegistry};
