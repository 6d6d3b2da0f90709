#![forbid(unsafe_code)]

//! Binding registry and patch computation.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use tracing::{debug, trace};

use remui_core::{DisplayValue, PatchList, ToDisplay, selector};

use crate::cell::{Bindable, CellInner};

/// Read side of a bound cell, as the manager sees it.
pub(crate) trait DisplaySource: Send + Sync {
    /// Current display representation (absent value → `Empty`).
    fn current(&self) -> DisplayValue;
}

struct BindingEntry {
    selector: String,
    source: Arc<dyn DisplaySource>,
}

struct ManagerState {
    root: String,
    // Insertion-ordered entries plus a name index; update_all batches are
    // deterministic in bind order.
    entries: Vec<BindingEntry>,
    index: AHashMap<String, usize>,
}

pub(crate) struct ManagerInner {
    state: Mutex<ManagerState>,
    update_fn: Box<dyn Fn(PatchList) + Send + Sync>,
}

impl ManagerInner {
    /// Compute and route the patch for one binding. `batch: None` delivers
    /// a fresh single-patch list through the update callback; `Some`
    /// appends without delivering.
    pub(crate) fn notify(&self, name: &str, batch: Option<&mut PatchList>) {
        let computed = {
            let state = self.state.lock().expect("binding state poisoned");
            state.index.get(name).map(|&i| {
                let entry = &state.entries[i];
                (
                    selector::join(&state.root, &entry.selector),
                    entry.source.current(),
                )
            })
        };

        let Some((target, value)) = computed else {
            trace!(name, "change notification for unknown binding ignored");
            return;
        };

        match batch {
            Some(list) => {
                list.set(target, value);
            }
            None => {
                let mut list = PatchList::new();
                list.set(target, value);
                debug!(name, "delivering single-binding update");
                (self.update_fn)(list);
            }
        }
    }
}

/// Maps logical field names to (selector, cell) pairs and turns value
/// changes into patches.
///
/// Create cells with [`bind`](Self::bind); the returned [`Bindable`]
/// notifies this manager on every effective change. The manager combines
/// the binding's selector fragment with its root selector to produce the
/// absolute patch target.
pub struct BindingManager {
    inner: Arc<ManagerInner>,
}

impl BindingManager {
    /// Create a manager delivering immediate updates through `update_fn`.
    #[must_use]
    pub fn new(update_fn: impl Fn(PatchList) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                state: Mutex::new(ManagerState {
                    root: String::new(),
                    entries: Vec::new(),
                    index: AHashMap::new(),
                }),
                update_fn: Box::new(update_fn),
            }),
        }
    }

    /// Rebind the absolute-selector prefix for future patch computations.
    ///
    /// Does not retroactively patch anything already delivered.
    pub fn set_root_selector(&self, root: impl Into<String>) {
        self.inner.state.lock().expect("binding state poisoned").root = root.into();
    }

    /// The current root selector.
    #[must_use]
    pub fn root_selector(&self) -> String {
        self.inner
            .state
            .lock()
            .expect("binding state poisoned")
            .root
            .clone()
    }

    /// Declare a binding and get its cell, initially unset.
    ///
    /// Binding a name that already exists replaces the cell and selector
    /// behind the existing entry rather than adding a duplicate, so
    /// re-initializing an owner is idempotent.
    pub fn bind<T>(&self, name: impl Into<String>, selector: impl Into<String>) -> Bindable<T>
    where
        T: ToDisplay + PartialEq + Clone + Send + 'static,
    {
        let name = name.into();
        let selector = selector.into();
        let cell = Arc::new(CellInner::new(name.clone(), Arc::downgrade(&self.inner)));
        let source: Arc<dyn DisplaySource> = cell.clone();

        let mut state = self.inner.state.lock().expect("binding state poisoned");
        if let Some(i) = state.index.get(&name).copied() {
            trace!(name = %name, "re-binding existing entry");
            let entry = &mut state.entries[i];
            entry.selector = selector;
            entry.source = source;
        } else {
            let idx = state.entries.len();
            state.index.insert(name, idx);
            state.entries.push(BindingEntry { selector, source });
        }
        drop(state);

        Bindable::from_inner(cell)
    }

    /// Compute and immediately deliver the patch for one binding.
    ///
    /// A no-op for names with no registered entry.
    pub fn notify_value_changed(&self, name: &str) {
        self.inner.notify(name, None);
    }

    /// Compute the patch for one binding and append it to `batch` without
    /// delivering. The caller controls delivery timing.
    pub fn notify_value_changed_in(&self, name: &str, batch: &mut PatchList) {
        self.inner.notify(name, Some(batch));
    }

    /// Deliver one batch re-syncing every binding, in bind order.
    pub fn update_all(&self) {
        let list = {
            let state = self.inner.state.lock().expect("binding state poisoned");
            let mut list = PatchList::new();
            for entry in &state.entries {
                list.set(
                    selector::join(&state.root, &entry.selector),
                    entry.source.current(),
                );
            }
            list
        };
        debug!(patches = list.len(), "delivering full binding re-sync");
        (self.inner.update_fn)(list);
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .expect("binding state poisoned")
            .entries
            .len()
    }

    /// Whether `name` has a registered binding.
    #[must_use]
    pub fn is_bound(&self, name: &str) -> bool {
        self.inner
            .state
            .lock()
            .expect("binding state poisoned")
            .index
            .contains_key(name)
    }
}

impl std::fmt::Debug for BindingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock().expect("binding state poisoned");
        f.debug_struct("BindingManager")
            .field("root", &state.root)
            .field("bindings", &state.entries.len())
            .finish()
    }
}
