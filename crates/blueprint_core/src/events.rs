//! Event dispatch
//!
//! A small publish/subscribe registry keyed by a closed set of event kinds.
//! Listeners are registered under `"kind"` or `"kind.namespace"`; a namespace
//! lets several independent subscribers share one kind and be removed
//! individually.
//!
//! Naming rules:
//! - a name without a namespace addresses the unnamed slot of its kind, so
//!   each kind holds at most one listener per namespace plus one unnamed one
//! - `on("kind.ns", l)` replaces a listener previously registered as `kind.ns`
//!   and `on("kind", l)` replaces the unnamed listener
//! - `off("kind.ns")` removes that listener, `off("kind")` removes only the
//!   unnamed one and `off(".ns")` removes the namespace from every kind
//! - several names may be given at once, separated by whitespace

use std::hash::Hash;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{BlueprintError, Result};

/// A closed set of event kinds a [`Dispatcher`] accepts
pub trait EventKind: Copy + Eq + Hash + 'static {
    /// Parse the kind part of an event name
    fn parse(kind: &str) -> Option<Self>;

    /// Every kind, used by namespace-wide removal
    fn all() -> &'static [Self];
}

/// A parsed `kind.namespace` event name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventName<K> {
    pub kind: Option<K>,
    pub namespace: Option<String>,
}

impl<K: EventKind> EventName<K> {
    /// Parse one name. The kind may only be empty when a namespace is given.
    pub fn parse(name: &str) -> Result<Self> {
        let (kind, namespace) = match name.split_once('.') {
            Some((kind, namespace)) => (kind, Some(namespace.to_string())),
            None => (name, None),
        };
        let namespace = namespace.filter(|ns| !ns.is_empty());

        if kind.is_empty() {
            if namespace.is_none() {
                return Err(BlueprintError::UnknownEvent(name.to_string()));
            }
            return Ok(Self {
                kind: None,
                namespace,
            });
        }

        let kind = K::parse(kind).ok_or_else(|| BlueprintError::UnknownEvent(kind.to_string()))?;
        Ok(Self {
            kind: Some(kind),
            namespace,
        })
    }

    /// Parse a whitespace-separated list of names
    pub fn parse_list(names: &str) -> Result<SmallVec<[Self; 2]>> {
        let parsed = names
            .split_whitespace()
            .map(Self::parse)
            .collect::<Result<SmallVec<[Self; 2]>>>()?;
        if parsed.is_empty() {
            return Err(BlueprintError::UnknownEvent(names.to_string()));
        }
        Ok(parsed)
    }
}

struct Registration<L> {
    namespace: Option<String>,
    listener: L,
}

/// Dispatches events of kind `K` to listeners of type `L`
///
/// The dispatcher only stores listeners; callers fetch a snapshot with
/// [`Dispatcher::listeners`] and invoke them, so a listener may register or
/// remove listeners while an event is being delivered.
pub struct Dispatcher<K, L> {
    handlers: FxHashMap<K, Vec<Registration<L>>>,
}

impl<K: EventKind, L: Clone> Dispatcher<K, L> {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register `listener` under each name in `names`
    pub fn on(&mut self, names: &str, listener: L) -> Result<()> {
        let parsed = EventName::<K>::parse_list(names)?;
        for name in parsed {
            let kind = name
                .kind
                .ok_or_else(|| BlueprintError::UnknownEvent(names.to_string()))?;
            let list = self.handlers.entry(kind).or_default();
            let before = list.len();
            list.retain(|r| r.namespace != name.namespace);
            if list.len() < before {
                tracing::trace!(namespace = ?name.namespace, "listener replaced");
            }
            list.push(Registration {
                namespace: name.namespace,
                listener: listener.clone(),
            });
        }
        Ok(())
    }

    /// Remove listeners matching each name in `names`
    pub fn off(&mut self, names: &str) -> Result<()> {
        let parsed = EventName::<K>::parse_list(names)?;
        for name in parsed {
            let kinds: &[K] = match &name.kind {
                Some(kind) => std::slice::from_ref(kind),
                None => K::all(),
            };
            for kind in kinds {
                let Some(list) = self.handlers.get_mut(kind) else {
                    continue;
                };
                list.retain(|r| r.namespace != name.namespace);
            }
        }
        Ok(())
    }

    /// Snapshot of the listeners for `kind`, in registration order
    pub fn listeners(&self, kind: K) -> Vec<L> {
        self.handlers
            .get(&kind)
            .map(|list| list.iter().map(|r| r.listener.clone()).collect())
            .unwrap_or_default()
    }

    /// Listener registered as `kind.namespace`, if any
    pub fn listener(&self, kind: K, namespace: &str) -> Option<L> {
        self.handlers
            .get(&kind)?
            .iter()
            .find(|r| r.namespace.as_deref() == Some(namespace))
            .map(|r| r.listener.clone())
    }

    pub fn listener_count(&self, kind: K) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }
}

impl<K: EventKind, L: Clone> Default for Dispatcher<K, L> {
    fn default() -> Self {
        Self::new()
    }
}
