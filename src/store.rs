use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// State — a store-managed value with typed partial updates
// ---------------------------------------------------------------------------

/// A value that can be held by a [`Store`] and updated by merging a partial
/// patch into it.
///
/// `apply` merges the patch and returns the names of the top-level paths the
/// patch touched; those names drive path-scoped listener notification.
///
/// `'static` because cancel handles hold a weak reference to the store and
/// may outlive the handle that created them.
pub trait State: Clone + 'static {
    type Patch;

    fn apply(&mut self, patch: Self::Patch) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Store — one handle per state domain, passed in at construction
// ---------------------------------------------------------------------------

struct Listener {
    id: u64,
    path: String,
    callback: Rc<dyn Fn()>,
}

struct StoreInner<S> {
    state: S,
    listeners: Vec<Listener>,
    next_id: u64,
}

/// A reactive container for one state domain (global config, the sidebars
/// map, the clock). Handles are cheap to clone and share a single underlying
/// value; all access is single-threaded.
///
/// Listeners subscribe either to a specific top-level path, firing only when
/// an update touches that path, or to `""`, firing on every update after all
/// path listeners have run.
pub struct Store<S: State> {
    inner: Rc<RefCell<StoreInner<S>>>,
    initial: Rc<S>,
    can_reset: bool,
}

impl<S: State> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            initial: Rc::clone(&self.initial),
            can_reset: self.can_reset,
        }
    }
}

impl<S: State> Store<S> {
    pub fn new(initial: S) -> Self {
        Self::build(initial, false)
    }

    /// A store whose subscriptions and value can be wiped via [`reset`].
    /// Only the clock store needs this; config stores live for the process.
    ///
    /// [`reset`]: Store::reset
    pub fn resettable(initial: S) -> Self {
        Self::build(initial, true)
    }

    fn build(initial: S, can_reset: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state: initial.clone(),
                listeners: Vec::new(),
                next_id: 0,
            })),
            initial: Rc::new(initial),
            can_reset,
        }
    }

    /// Returns a copy of the current state. Only top-level aliasing is
    /// prevented; callers must not mutate shared state through nested
    /// handles (there are none in practice — all fields are owned data).
    pub fn state(&self) -> S {
        self.inner.borrow().state.clone()
    }

    /// Merges `patch` into the state, then notifies listeners. Listeners on
    /// a touched path run first, in subscription order; `""` listeners run
    /// last and fire on every update. A listener may update this store
    /// re-entrantly: the listener set is snapshotted before iteration.
    pub fn update(&self, patch: S::Patch) {
        let touched = self.inner.borrow_mut().state.apply(patch);

        let snapshot: Vec<(String, Rc<dyn Fn()>)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|l| (l.path.clone(), Rc::clone(&l.callback)))
            .collect();

        for (path, callback) in snapshot.iter().filter(|(p, _)| !p.is_empty()) {
            if touched.iter().any(|t| t == path) {
                callback();
            }
        }
        for (_, callback) in snapshot.iter().filter(|(p, _)| p.is_empty()) {
            callback();
        }
    }

    /// Registers `callback` for `path` (`""` for every update). The returned
    /// handle cancels the registration; dropping it cancels too.
    pub fn subscribe(&self, path: &str, callback: impl Fn() + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push(Listener {
                id,
                path: path.to_string(),
                callback: Rc::new(callback),
            });
            id
        };

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|l| l.id != id);
            }
        })
    }

    /// Restores the initial value and drops every subscription.
    ///
    /// # Panics
    ///
    /// Panics when called on a store not constructed with
    /// [`resettable`](Store::resettable) — that is a bug in the caller, not
    /// a recoverable condition.
    pub fn reset(&self) {
        assert!(
            self.can_reset,
            "reset() called on a non-resettable store"
        );
        let mut inner = self.inner.borrow_mut();
        inner.state = (*self.initial).clone();
        inner.listeners.clear();
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

// ---------------------------------------------------------------------------
// Subscription — capability-style cancel handle
// ---------------------------------------------------------------------------

/// Cancels one listener registration. `cancel` is idempotent, and dropping
/// the handle cancels as well, so a widget cannot leak its listeners past
/// `on_unload`.
pub struct Subscription {
    cancel: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Cell::new(Some(Box::new(cancel))),
        }
    }

    pub fn cancel(&self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TwoFields {
        a: u32,
        b: u32,
    }

    #[derive(Default)]
    struct TwoFieldsPatch {
        a: Option<u32>,
        b: Option<u32>,
    }

    impl State for TwoFields {
        type Patch = TwoFieldsPatch;

        fn apply(&mut self, patch: TwoFieldsPatch) -> Vec<String> {
            let mut touched = Vec::new();
            if let Some(a) = patch.a {
                self.a = a;
                touched.push("a".to_string());
            }
            if let Some(b) = patch.b {
                self.b = b;
                touched.push("b".to_string());
            }
            touched
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct MapState(BTreeMap<String, u32>);

    impl State for MapState {
        type Patch = BTreeMap<String, Option<u32>>;

        fn apply(&mut self, patch: Self::Patch) -> Vec<String> {
            let mut touched = Vec::new();
            for (key, value) in patch {
                match value {
                    Some(v) => {
                        self.0.insert(key.clone(), v);
                    }
                    None => {
                        self.0.remove(&key);
                    }
                }
                touched.push(key);
            }
            touched
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn test_path_listener_ignores_other_paths() {
        let store = Store::new(TwoFields::default());
        let (count, bump) = counter();
        let _sub = store.subscribe("a", bump);

        store.update(TwoFieldsPatch {
            b: Some(1),
            ..Default::default()
        });
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_path_listener_fires_once_per_update() {
        let store = Store::new(TwoFields::default());
        let (count, bump) = counter();
        let _sub = store.subscribe("a", bump);

        store.update(TwoFieldsPatch {
            a: Some(1),
            b: Some(2),
        });
        assert_eq!(count.get(), 1);
        assert_eq!(store.state(), TwoFields { a: 1, b: 2 });
    }

    #[test]
    fn test_empty_path_fires_on_every_update() {
        let store = Store::new(TwoFields::default());
        let (count, bump) = counter();
        let _sub = store.subscribe("", bump);

        store.update(TwoFieldsPatch {
            a: Some(1),
            ..Default::default()
        });
        store.update(TwoFieldsPatch::default());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_empty_path_listeners_run_last() {
        let store = Store::new(TwoFields::default());
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        let _all = store.subscribe("", move || o.borrow_mut().push("all"));
        let o = Rc::clone(&order);
        let _a = store.subscribe("a", move || o.borrow_mut().push("a"));

        store.update(TwoFieldsPatch {
            a: Some(1),
            ..Default::default()
        });
        assert_eq!(*order.borrow(), vec!["a", "all"]);
    }

    #[test]
    fn test_map_deletion_semantics() {
        let mut initial = BTreeMap::new();
        initial.insert("x".to_string(), 1);
        initial.insert("y".to_string(), 2);
        let store = Store::new(MapState(initial));

        let mut patch = BTreeMap::new();
        patch.insert("x".to_string(), None);
        store.update(patch);

        let state = store.state();
        assert!(!state.0.contains_key("x"));
        assert_eq!(state.0.get("y"), Some(&2));
    }

    #[test]
    fn test_deletion_notifies_path_listener() {
        let mut initial = BTreeMap::new();
        initial.insert("x".to_string(), 1);
        let store = Store::new(MapState(initial));

        let (count, bump) = counter();
        let _sub = store.subscribe("x", bump);

        let mut patch = BTreeMap::new();
        patch.insert("x".to_string(), None);
        store.update(patch);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cancel_stops_notifications() {
        let store = Store::new(TwoFields::default());
        let (count, bump) = counter();
        let sub = store.subscribe("a", bump);

        sub.cancel();
        store.update(TwoFieldsPatch {
            a: Some(1),
            ..Default::default()
        });
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_double_cancel_is_noop() {
        let store = Store::new(TwoFields::default());
        let sub = store.subscribe("a", || {});
        sub.cancel();
        sub.cancel();
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_store() {
        let sub;
        {
            let store = Store::new(TwoFields::default());
            sub = store.subscribe("a", || {});
        }
        // The store is gone; cancelling the orphaned handle is a no-op.
        sub.cancel();
    }

    #[test]
    fn test_drop_cancels() {
        let store = Store::new(TwoFields::default());
        {
            let _sub = store.subscribe("a", || {});
            assert_eq!(store.listener_count(), 1);
        }
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    #[should_panic(expected = "non-resettable")]
    fn test_reset_guard_panics() {
        let store = Store::new(TwoFields::default());
        store.reset();
    }

    #[test]
    fn test_reset_restores_initial_and_clears_listeners() {
        let store = Store::resettable(TwoFields { a: 7, b: 8 });
        let (count, bump) = counter();
        let sub = store.subscribe("a", bump);

        store.update(TwoFieldsPatch {
            a: Some(99),
            ..Default::default()
        });
        assert_eq!(count.get(), 1);

        store.reset();
        assert_eq!(store.state(), TwoFields { a: 7, b: 8 });
        assert_eq!(store.listener_count(), 0);

        store.update(TwoFieldsPatch {
            a: Some(1),
            ..Default::default()
        });
        assert_eq!(count.get(), 1);

        // Cancelling the dead handle is still safe.
        sub.cancel();
    }

    #[test]
    fn test_reentrant_update_from_listener() {
        let store = Store::new(TwoFields::default());
        let inner = store.clone();
        let _sub = store.subscribe("a", move || {
            // Bump `b` once in response to `a` changing; guard against the
            // listener chasing its own tail.
            if inner.state().b == 0 {
                inner.update(TwoFieldsPatch {
                    b: Some(1),
                    ..Default::default()
                });
            }
        });

        store.update(TwoFieldsPatch {
            a: Some(5),
            ..Default::default()
        });
        assert_eq!(store.state(), TwoFields { a: 5, b: 1 });
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::new(TwoFields::default());
        let other = store.clone();
        other.update(TwoFieldsPatch {
            a: Some(3),
            ..Default::default()
        });
        assert_eq!(store.state().a, 3);
    }
}
