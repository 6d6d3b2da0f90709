#![forbid(unsafe_code)]

//! Action router: owner-scoped handler registration and dispatch.
//!
//! The router keeps two indexes over live registrations: by action (append
//! order is dispatch order) and by owner (for bulk teardown when an
//! element or page unloads). Dispatch walks a snapshot of the action's
//! list and stops at the first handler that claims the event.
//!
//! # Invariants
//!
//! 1. Dispatch order for an action equals registration order.
//! 2. A registration is either live or unregistered; unregistration is
//!    terminal; re-registering requires a new registration.
//! 3. After `unregister_all_for_owner(o)` returns, no subsequent dispatch
//!    invokes a handler owned by `o`.
//! 4. No lock is held while a handler runs; handlers may register and
//!    unregister freely from inside `handle`.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `Action` key absent from bag | `NotHandled` |
//! | No handler registered for action | `NotHandled` |
//! | Every handler declines | `NotHandled` (designed fallthrough) |
//! | Handle unregistered twice | second call is a no-op |

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use tracing::{debug, trace};

use remui_core::RouteOutcome;

use crate::handler::{EventContext, EventHandler};
use crate::schema::{ParamBag, SchemaRegistry};

/// Opaque, process-unique owner identity.
///
/// Owners are allocated explicitly rather than derived from object
/// identity; an element or page obtains one id and registers everything
/// under it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh owner id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

struct Registration<S> {
    id: u64,
    action: String,
    owner: OwnerId,
    handler: Arc<dyn EventHandler<S>>,
    unregistered: AtomicBool,
}

/// Opaque handle to one live registration.
///
/// Cheap to clone; cloning does not duplicate the registration.
pub struct RegistrationHandle<S> {
    reg: Arc<Registration<S>>,
}

impl<S> Clone for RegistrationHandle<S> {
    fn clone(&self) -> Self {
        Self {
            reg: Arc::clone(&self.reg),
        }
    }
}

impl<S> RegistrationHandle<S> {
    /// The action this registration listens for.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.reg.action
    }

    /// The owner the registration belongs to.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.reg.owner
    }

    /// Whether the registration has been torn down.
    #[must_use]
    pub fn is_unregistered(&self) -> bool {
        self.reg.unregistered.load(Ordering::Acquire)
    }
}

impl<S> std::fmt::Debug for RegistrationHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationHandle")
            .field("action", &self.reg.action)
            .field("owner", &self.reg.owner)
            .field("unregistered", &self.is_unregistered())
            .finish()
    }
}

/// Maps actions to ordered handler lists and owners to their registrations.
///
/// `S` is the host session type passed through to handlers. All methods
/// take `&self`; the indexes are lock-guarded and dispatch iterates a
/// snapshot, so registration calls may race with dispatch.
pub struct EventRouter<S> {
    schemas: Arc<SchemaRegistry>,
    by_action: RwLock<AHashMap<String, Vec<Arc<Registration<S>>>>>,
    by_owner: RwLock<AHashMap<OwnerId, Vec<Arc<Registration<S>>>>>,
    next_id: AtomicU64,
}

impl<S> EventRouter<S> {
    /// Create a router feeding parameter schemas into `schemas`.
    #[must_use]
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            schemas,
            by_action: RwLock::new(AHashMap::new()),
            by_owner: RwLock::new(AHashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The schema registry this router feeds.
    #[must_use]
    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    /// Register `handler` for `action` under `owner`.
    ///
    /// Appends to the action's dispatch list (first registered, first
    /// tried) and forwards the handler's parameter schemas to the schema
    /// registry.
    pub fn register_handler(
        &self,
        action: impl Into<String>,
        owner: OwnerId,
        handler: Arc<dyn EventHandler<S>>,
    ) -> RegistrationHandle<S> {
        let action = action.into();
        let reg = Arc::new(Registration {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            action: action.clone(),
            owner,
            handler,
            unregistered: AtomicBool::new(false),
        });

        self.by_action
            .write()
            .expect("action index poisoned")
            .entry(action.clone())
            .or_default()
            .push(Arc::clone(&reg));
        self.by_owner
            .write()
            .expect("owner index poisoned")
            .entry(owner)
            .or_default()
            .push(Arc::clone(&reg));

        for schema in reg.handler.parameter_schemas() {
            self.schemas.register(schema);
        }

        trace!(%action, %owner, "handler registered");
        RegistrationHandle { reg }
    }

    /// Tear down one registration.
    ///
    /// Removes it from both indexes, drops empty buckets, and withdraws
    /// the handler's parameter schemas by key. Withdrawing by key can
    /// break another live handler that registered the same key; the key
    /// space is global by design. Calling this twice is a no-op.
    pub fn unregister_handler(&self, handle: &RegistrationHandle<S>) {
        let reg = &handle.reg;
        if reg.unregistered.swap(true, Ordering::AcqRel) {
            return;
        }
        self.detach_from_action(reg);

        let mut by_owner = self.by_owner.write().expect("owner index poisoned");
        if let Some(bucket) = by_owner.get_mut(&reg.owner) {
            bucket.retain(|r| r.id != reg.id);
            if bucket.is_empty() {
                by_owner.remove(&reg.owner);
            }
        }
        drop(by_owner);

        self.withdraw_schemas(reg);
        trace!(action = %reg.action, owner = %reg.owner, "handler unregistered");
    }

    /// Tear down every registration owned by `owner`.
    ///
    /// Drains the owner's bucket atomically; a no-op when the owner has no
    /// registrations. Used for element/page teardown.
    pub fn unregister_all_for_owner(&self, owner: OwnerId) {
        let drained = self
            .by_owner
            .write()
            .expect("owner index poisoned")
            .remove(&owner);
        let Some(regs) = drained else {
            return;
        };

        debug!(%owner, count = regs.len(), "unregistering all handlers for owner");
        for reg in regs {
            if reg.unregistered.swap(true, Ordering::AcqRel) {
                continue;
            }
            self.detach_from_action(&reg);
            self.withdraw_schemas(&reg);
        }
    }

    /// Dispatch one decoded event.
    ///
    /// Returns [`RouteOutcome::NotHandled`] when the bag has no `Action`
    /// key, the action is unknown, or every handler declines. Handlers run
    /// in registration order on a snapshot of the list; the first to claim
    /// the event stops dispatch.
    pub fn route_event(&self, session: &S, bag: &ParamBag) -> RouteOutcome {
        let Some(action) = bag.action() else {
            trace!("payload without action key; not routed");
            return RouteOutcome::NotHandled;
        };

        let snapshot: Vec<Arc<Registration<S>>> = match self
            .by_action
            .read()
            .expect("action index poisoned")
            .get(action)
        {
            Some(bucket) if !bucket.is_empty() => bucket.clone(),
            _ => {
                trace!(%action, "no handlers registered");
                return RouteOutcome::NotHandled;
            }
        };

        for reg in snapshot {
            if reg.unregistered.load(Ordering::Acquire) {
                continue;
            }
            let context = EventContext::new(session, bag);
            if reg.handler.handle(&context) {
                trace!(%action, owner = %reg.owner, "event claimed");
                return RouteOutcome::Handled;
            }
        }
        trace!(%action, "all handlers declined");
        RouteOutcome::NotHandled
    }

    /// Number of live registrations for `action`.
    #[must_use]
    pub fn handler_count(&self, action: &str) -> usize {
        self.by_action
            .read()
            .expect("action index poisoned")
            .get(action)
            .map_or(0, Vec::len)
    }

    fn detach_from_action(&self, reg: &Arc<Registration<S>>) {
        let mut by_action = self.by_action.write().expect("action index poisoned");
        if let Some(bucket) = by_action.get_mut(&reg.action) {
            bucket.retain(|r| r.id != reg.id);
            if bucket.is_empty() {
                by_action.remove(&reg.action);
            }
        }
    }

    fn withdraw_schemas(&self, reg: &Arc<Registration<S>>) {
        for schema in reg.handler.parameter_schemas() {
            self.schemas.unregister(&schema.key);
        }
    }
}

impl<S> std::fmt::Debug for EventRouter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let actions = self.by_action.read().expect("action index poisoned").len();
        let owners = self.by_owner.read().expect("owner index poisoned").len();
        f.debug_struct("EventRouter")
            .field("actions", &actions)
            .field("owners", &owners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use crate::handler::HandlerBuilder;
    use crate::schema::{ParamKind, ParamValue};

    fn bag_for(action: &str) -> ParamBag {
        let mut bag = ParamBag::new();
        bag.insert("Action", ParamValue::Str(action.to_owned()));
        bag
    }

    fn router() -> EventRouter<()> {
        EventRouter::new(Arc::new(SchemaRegistry::new()))
    }

    #[test]
    fn dispatch_tries_handlers_in_registration_order() {
        let router = router();
        let order = Arc::new(Mutex::new(Vec::new()));
        let owner = OwnerId::next();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&order);
            router.register_handler(
                "click",
                owner,
                HandlerBuilder::new().build_conditional::<(), _>(move |_| {
                    seen.lock().unwrap().push(tag);
                    false
                }),
            );
        }

        assert_eq!(router.route_event(&(), &bag_for("click")), RouteOutcome::NotHandled);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn first_claim_stops_dispatch() {
        let router = router();
        let owner = OwnerId::next();
        let later_calls = Arc::new(AtomicUsize::new(0));

        router.register_handler("click", owner, HandlerBuilder::new().build::<(), _>(|_| {}));
        let calls = Arc::clone(&later_calls);
        router.register_handler(
            "click",
            owner,
            HandlerBuilder::new().build::<(), _>(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(router.route_event(&(), &bag_for("click")).is_handled());
        assert_eq!(
            later_calls.load(Ordering::SeqCst),
            0,
            "handlers after the claiming one must not run"
        );
    }

    #[test]
    fn missing_action_and_unknown_action_are_not_handled() {
        let router = router();
        assert_eq!(router.route_event(&(), &ParamBag::new()), RouteOutcome::NotHandled);
        assert_eq!(
            router.route_event(&(), &bag_for("nobody-listens")),
            RouteOutcome::NotHandled
        );
    }

    #[test]
    fn unregister_all_for_owner_silences_that_owner() {
        // The tab-2 scenario: one matching handler, handled once, then the
        // owner unloads and the same action is no longer handled.
        let router = router();
        let owner = OwnerId::next();
        router.register_handler(
            "tab-2-btn-clicked",
            owner,
            HandlerBuilder::new().build::<(), _>(|_| {}),
        );

        assert!(router.route_event(&(), &bag_for("tab-2-btn-clicked")).is_handled());

        router.unregister_all_for_owner(owner);
        assert_eq!(
            router.route_event(&(), &bag_for("tab-2-btn-clicked")),
            RouteOutcome::NotHandled
        );
        assert_eq!(router.handler_count("tab-2-btn-clicked"), 0);
    }

    #[test]
    fn unregister_all_for_owner_keeps_other_owners() {
        let router = router();
        let gone = OwnerId::next();
        let stays = OwnerId::next();
        router.register_handler("click", gone, HandlerBuilder::new().build::<(), _>(|_| {}));
        router.register_handler("click", stays, HandlerBuilder::new().build::<(), _>(|_| {}));

        router.unregister_all_for_owner(gone);
        assert_eq!(router.handler_count("click"), 1);
        assert!(router.route_event(&(), &bag_for("click")).is_handled());
    }

    #[test]
    fn unregister_all_for_owner_without_registrations_is_a_noop() {
        let router = router();
        router.unregister_all_for_owner(OwnerId::next());
    }

    #[test]
    fn unregister_handle_is_idempotent() {
        let router = router();
        let handle = router.register_handler(
            "click",
            OwnerId::next(),
            HandlerBuilder::new().build::<(), _>(|_| {}),
        );
        router.unregister_handler(&handle);
        router.unregister_handler(&handle);
        assert!(handle.is_unregistered());
        assert_eq!(router.handler_count("click"), 0);
    }

    #[test]
    fn registration_forwards_and_withdraws_schemas() {
        let schemas = Arc::new(SchemaRegistry::new());
        let router = EventRouter::new(Arc::clone(&schemas));

        let handle = router.register_handler(
            "pick",
            OwnerId::next(),
            HandlerBuilder::new()
                .with_parameter("slot", ParamKind::Int)
                .build::<(), _>(|_| {}),
        );
        assert!(schemas.composite().accepts("slot"));

        router.unregister_handler(&handle);
        assert!(!schemas.composite().accepts("slot"));
        assert!(schemas.composite().accepts("Action"));
    }

    #[test]
    fn unregistering_one_key_sharer_breaks_the_other() {
        // Documented clobber hazard: A and B both declare "slot"; tearing
        // down A withdraws the key B still wants.
        let schemas = Arc::new(SchemaRegistry::new());
        let router = EventRouter::new(Arc::clone(&schemas));
        let shared = || {
            HandlerBuilder::new()
                .with_parameter("slot", ParamKind::Int)
                .build::<(), _>(|_| {})
        };

        let a = router.register_handler("a", OwnerId::next(), shared());
        let _b = router.register_handler("b", OwnerId::next(), shared());

        router.unregister_handler(&a);
        assert!(
            !schemas.composite().accepts("slot"),
            "removal is keyed by name, not by registration"
        );
    }

    #[test]
    fn handler_may_unregister_itself_mid_dispatch() {
        let router = Arc::new(router());
        let slot: Arc<Mutex<Option<RegistrationHandle<()>>>> = Arc::new(Mutex::new(None));

        let router_ref = Arc::clone(&router);
        let slot_ref = Arc::clone(&slot);
        let handle = router.register_handler(
            "once",
            OwnerId::next(),
            HandlerBuilder::new().build::<(), _>(move |_| {
                if let Some(h) = slot_ref.lock().unwrap().take() {
                    router_ref.unregister_handler(&h);
                }
            }),
        );
        *slot.lock().unwrap() = Some(handle);

        assert!(router.route_event(&(), &bag_for("once")).is_handled());
        assert_eq!(
            router.route_event(&(), &bag_for("once")),
            RouteOutcome::NotHandled,
            "self-unregistered handler must not fire again"
        );
    }

    #[test]
    fn stale_snapshot_skips_handlers_unregistered_concurrently() {
        // A dispatch snapshot may still hold a registration another thread
        // tears down; the unregistered flag keeps it from firing.
        let router = router();
        let owner = OwnerId::next();
        let fired = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&fired);
        let handle = router.register_handler(
            "click",
            owner,
            HandlerBuilder::new().build::<(), _>(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            }),
        );

        router.unregister_handler(&handle);
        assert_eq!(router.route_event(&(), &bag_for("click")), RouteOutcome::NotHandled);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registration_races_dispatch_without_panicking() {
        let router = Arc::new(router());

        let writer = {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let owner = OwnerId::next();
                    let h = router.register_handler(
                        "spin",
                        owner,
                        HandlerBuilder::new().build_conditional::<(), _>(|_| false),
                    );
                    router.unregister_handler(&h);
                }
            })
        };
        let reader = {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let _ = router.route_event(&(), &bag_for("spin"));
                }
            })
        };

        writer.join().expect("writer thread");
        reader.join().expect("reader thread");
    }
}
