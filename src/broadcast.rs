//! Broadcaster - Per-entity publish/subscribe hub.
//!
//! Every entity whose state matters to others (scales, datasets, the render
//! controller) owns one [`Broadcaster`]. Listeners are stored in an
//! insertion-ordered hash map keyed by [`ListenerKey`]:
//!
//! - Registering under a key that is already present replaces the callback
//!   and keeps its original position.
//! - `broadcast` invokes callbacks synchronously in registration order.
//! - A callback returning `Err` aborts the rest of that broadcast and the
//!   error is returned to the caller. Callbacks are not isolated.
//!
//! Object identity keys are hashed by address ([`ListenerKey::identity`]),
//! so no key shape needs a linear scan.
//!
//! # Example
//!
//! ```ignore
//! let scale = QuantitativeScale::linear();
//! scale.broadcaster().register_listener("axis", |scale, _| {
//!     println!("domain is now {:?}", scale.domain());
//!     Ok(())
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::PlotResult;
use crate::types::ComponentId;

// =============================================================================
// Keys
// =============================================================================

/// Registration key. Equal keys replace each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKey {
    /// Caller-chosen name.
    Name(String),
    /// A component in a tree.
    Component(ComponentId),
    /// Issued by [`Broadcaster::register`].
    Token(u64),
    /// Address of a shared object.
    Identity(usize),
}

impl ListenerKey {
    /// Key an object by its `Rc` allocation.
    pub fn identity<T: ?Sized>(owner: &Rc<T>) -> Self {
        ListenerKey::Identity(Rc::as_ptr(owner) as *const () as usize)
    }
}

impl From<&str> for ListenerKey {
    fn from(name: &str) -> Self {
        ListenerKey::Name(name.to_string())
    }
}

impl From<String> for ListenerKey {
    fn from(name: String) -> Self {
        ListenerKey::Name(name)
    }
}

impl From<ComponentId> for ListenerKey {
    fn from(id: ComponentId) -> Self {
        ListenerKey::Component(id)
    }
}

// =============================================================================
// Broadcaster
// =============================================================================

/// Callback receiving the owning listenable and the broadcast arguments.
pub type Listener<L, A> = Rc<dyn Fn(&L, &A) -> PlotResult<()>>;

/// Anything that owns a [`Broadcaster`].
pub trait Listenable: Sized + 'static {
    type Args: 'static;

    fn broadcaster(&self) -> &Broadcaster<Self, Self::Args>;
}

/// Ordered registry of listeners for an owner of type `L`.
///
/// The owner passes itself to [`broadcast`](Self::broadcast); the broadcaster
/// holds no back-reference, so owner and hub share one lifetime.
pub struct Broadcaster<L, A = ()> {
    listeners: RefCell<IndexMap<ListenerKey, Listener<L, A>>>,
    next_token: Cell<u64>,
}

impl<L, A> std::fmt::Debug for Broadcaster<L, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_struct("Broadcaster")
            .field("keys", &listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<L, A> Default for Broadcaster<L, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, A> Broadcaster<L, A> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(IndexMap::new()),
            next_token: Cell::new(0),
        }
    }

    /// Store `callback` under `key`, replacing an existing entry in place.
    pub fn register_listener<K, F>(&self, key: K, callback: F)
    where
        K: Into<ListenerKey>,
        F: Fn(&L, &A) -> PlotResult<()> + 'static,
    {
        let key = key.into();
        tracing::trace!(?key, "register listener");
        self.listeners.borrow_mut().insert(key, Rc::new(callback));
    }

    /// Store `callback` under a fresh token and return it.
    pub fn register<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn(&L, &A) -> PlotResult<()> + 'static,
    {
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        let key = ListenerKey::Token(token);
        self.register_listener(key.clone(), callback);
        key
    }

    /// Remove one entry. Returns whether it existed.
    pub fn deregister_listener(&self, key: &ListenerKey) -> bool {
        tracing::trace!(?key, "deregister listener");
        self.listeners.borrow_mut().shift_remove(key).is_some()
    }

    pub fn deregister_all_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn contains(&self, key: &ListenerKey) -> bool {
        self.listeners.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Invoke every listener in registration order.
    ///
    /// Iterates over a snapshot, so callbacks may register or deregister
    /// listeners; changes apply to the next broadcast.
    pub fn broadcast(&self, owner: &L, args: &A) -> PlotResult<()> {
        let snapshot: Vec<Listener<L, A>> = self.listeners.borrow().values().cloned().collect();
        for listener in snapshot {
            listener(owner, args)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;

    struct Owner {
        name: &'static str,
        hub: Broadcaster<Owner, u32>,
    }

    fn owner() -> Owner {
        Owner {
            name: "owner",
            hub: Broadcaster::new(),
        }
    }

    #[test]
    fn test_fires_in_registration_order() {
        let o = owner();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        o.hub.register_listener("a", move |_, n: &u32| {
            l.borrow_mut().push(format!("a{n}"));
            Ok(())
        });
        let l = log.clone();
        o.hub.register_listener("b", move |_, n: &u32| {
            l.borrow_mut().push(format!("b{n}"));
            Ok(())
        });

        o.hub.broadcast(&o, &1).unwrap();
        assert_eq!(*log.borrow(), vec!["a1", "b1"]);
    }

    #[test]
    fn test_deregister_before_broadcast() {
        let o = owner();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        o.hub.register_listener("a", move |_, _| {
            l.borrow_mut().push("a");
            Ok(())
        });
        let l = log.clone();
        o.hub.register_listener("b", move |_, _| {
            l.borrow_mut().push("b");
            Ok(())
        });

        assert!(o.hub.deregister_listener(&"a".into()));
        o.hub.broadcast(&o, &0).unwrap();
        assert_eq!(*log.borrow(), vec!["b"]);
    }

    #[test]
    fn test_replace_by_key_keeps_position() {
        let o = owner();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (key, tag) in [("a", "a1"), ("b", "b"), ("a", "a2")] {
            let l = log.clone();
            o.hub.register_listener(key, move |_, _| {
                l.borrow_mut().push(tag);
                Ok(())
            });
        }

        assert_eq!(o.hub.len(), 2);
        o.hub.broadcast(&o, &0).unwrap();
        assert_eq!(*log.borrow(), vec!["a2", "b"]);
    }

    #[test]
    fn test_error_aborts_remaining() {
        let o = owner();
        let later = Rc::new(Cell::new(0));

        o.hub
            .register_listener("fails", |_, _| Err(PlotError::InvalidDomain("boom".into())));
        let l = later.clone();
        o.hub.register_listener("later", move |_, _| {
            l.set(l.get() + 1);
            Ok(())
        });

        assert!(o.hub.broadcast(&o, &0).is_err());
        assert_eq!(later.get(), 0);
    }

    #[test]
    fn test_owner_is_passed() {
        let o = owner();
        let seen = Rc::new(RefCell::new(String::new()));
        let s = seen.clone();
        o.hub.register(move |owner: &Owner, _| {
            s.borrow_mut().push_str(owner.name);
            Ok(())
        });
        o.hub.broadcast(&o, &0).unwrap();
        assert_eq!(*seen.borrow(), "owner");
    }

    #[test]
    fn test_tokens_are_distinct() {
        let o = owner();
        let a = o.hub.register(|_, _| Ok(()));
        let b = o.hub.register(|_, _| Ok(()));
        assert_ne!(a, b);
        o.hub.deregister_all_listeners();
        assert!(o.hub.is_empty());
    }

    #[test]
    fn test_listener_may_deregister_during_broadcast() {
        let o = Rc::new(owner());
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        o.hub.register_listener("once", move |owner: &Owner, _| {
            c.set(c.get() + 1);
            owner.hub.deregister_listener(&"once".into());
            Ok(())
        });

        o.hub.broadcast(&o, &0).unwrap();
        o.hub.broadcast(&o, &0).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_identity_keys() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        assert_eq!(ListenerKey::identity(&a), ListenerKey::identity(&a.clone()));
        assert_ne!(ListenerKey::identity(&a), ListenerKey::identity(&b));
    }
}
