#![forbid(unsafe_code)]

//! Typed reactive cells.
//!
//! A [`Bindable<T>`] owns the current (nullable) value of one bound field.
//! Mutations that actually change the value notify the owning
//! [`BindingManager`](crate::BindingManager), which computes and routes
//! the patch. The cell holds only a weak reference back to its manager
//! (a lookup key for "which selector do I patch", never an owner), so an
//! element dropping its manager never leaks cells, and a cell that
//! outlives its manager degrades to plain value storage.

use std::sync::{Arc, Mutex, Weak};

use remui_core::{DisplayValue, PatchList, ToDisplay};
use tracing::trace;

use crate::manager::{DisplaySource, ManagerInner};

pub(crate) struct CellInner<T> {
    name: String,
    value: Mutex<Option<T>>,
    manager: Weak<ManagerInner>,
}

impl<T> CellInner<T> {
    pub(crate) fn new(name: String, manager: Weak<ManagerInner>) -> Self {
        Self {
            name,
            value: Mutex::new(None),
            manager,
        }
    }
}

impl<T: ToDisplay + Send> DisplaySource for CellInner<T> {
    fn current(&self) -> DisplayValue {
        self.value
            .lock()
            .expect("cell value poisoned")
            .as_ref()
            .map_or(DisplayValue::Empty, ToDisplay::to_display)
    }
}

/// Shared handle to one bound value.
///
/// Created by [`BindingManager::bind`](crate::BindingManager::bind);
/// cloning shares the same underlying cell.
pub struct Bindable<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> Clone for Bindable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Bindable<T>
where
    T: ToDisplay + PartialEq + Clone + Send + 'static,
{
    pub(crate) fn from_inner(inner: Arc<CellInner<T>>) -> Self {
        Self { inner }
    }

    /// The binding key this cell notifies under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The current value, if set.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.value.lock().expect("cell value poisoned").clone()
    }

    /// Whether a value has been set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner
            .value
            .lock()
            .expect("cell value poisoned")
            .is_some()
    }

    /// Set a new value, patching the bound selector immediately if the
    /// value actually changed.
    pub fn set(&self, value: T) {
        if self.replace(Some(value)) {
            self.notify(None);
        }
    }

    /// Set a new value, appending the patch to `batch` instead of
    /// delivering it. Used to merge creation-time initial values into the
    /// element-creation update.
    pub fn set_in(&self, value: T, batch: &mut PatchList) {
        if self.replace(Some(value)) {
            self.notify(Some(batch));
        }
    }

    /// Unset the value, patching the selector to empty if it was set.
    pub fn clear(&self) {
        if self.replace(None) {
            self.notify(None);
        }
    }

    /// Unset the value, appending the patch to `batch`.
    pub fn clear_in(&self, batch: &mut PatchList) {
        if self.replace(None) {
            self.notify(Some(batch));
        }
    }

    /// Store `new` and report whether the stored value changed.
    ///
    /// Equal old and new values, none → none included, are a no-op.
    /// The value lock is released before any notification runs.
    fn replace(&self, new: Option<T>) -> bool {
        let mut guard = self.inner.value.lock().expect("cell value poisoned");
        if *guard == new {
            return false;
        }
        *guard = new;
        true
    }

    fn notify(&self, batch: Option<&mut PatchList>) {
        match self.inner.manager.upgrade() {
            Some(manager) => manager.notify(&self.inner.name, batch),
            None => trace!(name = %self.inner.name, "manager dropped; change not patched"),
        }
    }
}

impl<T> std::fmt::Debug for Bindable<T>
where
    T: ToDisplay + PartialEq + Clone + Send + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindable")
            .field("name", &self.inner.name)
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::BindingManager;

    fn counting_manager() -> (BindingManager, Arc<Mutex<usize>>) {
        let count = Arc::new(Mutex::new(0usize));
        let seen = Arc::clone(&count);
        let manager = BindingManager::new(move |_| *seen.lock().unwrap() += 1);
        (manager, count)
    }

    #[test]
    fn get_reflects_last_set() {
        let (manager, _) = counting_manager();
        let cell = manager.bind::<i64>("n", "#N");
        assert_eq!(cell.get(), None);
        assert!(!cell.is_set());

        cell.set(4);
        assert_eq!(cell.get(), Some(4));
        assert!(cell.is_set());
    }

    #[test]
    fn clones_share_the_cell() {
        let (manager, count) = counting_manager();
        let cell = manager.bind::<String>("s", "#S");
        let alias = cell.clone();

        alias.set("x".to_owned());
        assert_eq!(cell.get().as_deref(), Some("x"));
        // The clone's set already notified; an identical set through the
        // original must not.
        cell.set("x".to_owned());
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn equal_but_distinct_values_do_not_notify() {
        let (manager, count) = counting_manager();
        let cell = manager.bind::<String>("s", "#S");
        cell.set(String::from("same"));
        cell.set(String::from("same"));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn none_to_none_is_silent() {
        let (manager, count) = counting_manager();
        let cell = manager.bind::<String>("s", "#S");
        cell.clear();
        cell.clear();
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn name_matches_binding_key() {
        let (manager, _) = counting_manager();
        let cell = manager.bind::<bool>("visible", "#V");
        assert_eq!(cell.name(), "visible");
    }
}
