#![forbid(unsafe_code)]

//! Reactive field-to-selector bindings.
//!
//! A server-side field declares itself bound to a UI location once, via
//! [`BindingManager::bind`], and receives a typed [`Bindable`] cell.
//! Writing a different value to the cell automatically produces a patch
//! targeting the bound selector, delivered immediately as a single-patch
//! batch, or appended to a caller-supplied batch when several changes
//! should reach the client in one outbound update.
//!
//! # Invariants
//!
//! 1. A set that does not change the value is a no-op: no notification,
//!    no patch.
//! 2. Patch targets are computed at notification time from the manager's
//!    current root selector; changing the root never patches retroactively.
//! 3. Notifications for names with no registered binding are silently
//!    ignored (stale notifications from detached cells are expected
//!    during teardown).
//! 4. One binding entry per name; re-binding a name replaces the cell
//!    behind the entry instead of duplicating it.
//!
//! The manager is owned by a single element or page instance. It is `Send`,
//! but mutations are expected to arrive on that owner's scheduling lane;
//! the internal locks are storage guards, not a cross-thread contract.

pub mod cell;
pub mod manager;

pub use cell::Bindable;
pub use manager::BindingManager;
