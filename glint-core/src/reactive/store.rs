//! Store Implementation
//!
//! A Store gives per-property subscription granularity over a whole object
//! graph, where a signal would only offer whole-value granularity.
//!
//! The object graph is a `serde_json::Value` tree. In place of dynamic
//! property interception, nodes are addressed by [`StorePath`] handles built
//! with [`StorePath::at`] and [`StorePath::index`]; the subscriber side
//! table is keyed by the node's JSON-pointer path. Building a path handle is
//! free: nothing is read, cloned, or subscribed until [`StorePath::get`].
//!
//! Reading a path subscribes the current effect to every step of the path
//! (the same per-edge subscriptions a chain of property reads produces), so
//! replacing an ancestor re-runs the reader while writes to sibling keys do
//! not. Writes compare structurally against the old value at that exact
//! path and schedule only that path's subscribers.

use std::fmt::Debug;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::scheduler;
use super::subscriber::SubscriberSet;
use super::tracking;

/// One step of a store path.
#[derive(Clone, Debug, PartialEq)]
enum Segment {
    /// An object property.
    Key(String),
    /// An array element.
    Index(usize),
}

impl Segment {
    /// JSON-pointer reference token for this segment.
    fn token(&self) -> String {
        match self {
            // Pointer escaping: `~` -> `~0`, `/` -> `~1`.
            Segment::Key(key) => key.replace('~', "~0").replace('/', "~1"),
            Segment::Index(index) => index.to_string(),
        }
    }
}

fn pointer_of(segments: &[Segment]) -> String {
    let mut pointer = String::new();
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&segment.token());
    }
    pointer
}

struct StoreInner {
    /// The live object tree.
    root: RwLock<Value>,

    /// Per-path subscriber sets, keyed by JSON pointer.
    subscribers: DashMap<String, SubscriberSet>,
}

/// A deep reactive object graph with per-property subscriptions.
///
/// Cloning shares the underlying tree. Created with [`create_store`].
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Wrap an existing value tree in a store.
    pub fn from_value(root: Value) -> (Store, StoreSetter) {
        let store = Store {
            inner: Arc::new(StoreInner {
                root: RwLock::new(root),
                subscribers: DashMap::new(),
            }),
        };
        let setter = StoreSetter {
            store: store.clone(),
        };
        (store, setter)
    }

    /// Path handle for a top-level property.
    pub fn at(&self, key: impl Into<String>) -> StorePath {
        StorePath {
            inner: Arc::clone(&self.inner),
            segments: vec![Segment::Key(key.into())],
        }
    }

    /// Path handle for a top-level array element.
    pub fn index(&self, index: usize) -> StorePath {
        StorePath {
            inner: Arc::clone(&self.inner),
            segments: vec![Segment::Index(index)],
        }
    }

    /// Untracked clone of the whole tree.
    pub fn snapshot(&self) -> Value {
        self.inner.root.read().clone()
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("root", &*self.inner.root.read())
            .finish()
    }
}

/// A handle addressing one node of a [`Store`].
#[derive(Clone)]
pub struct StorePath {
    inner: Arc<StoreInner>,
    segments: Vec<Segment>,
}

impl StorePath {
    /// Extend the path by an object property.
    pub fn at(&self, key: impl Into<String>) -> StorePath {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        StorePath {
            inner: Arc::clone(&self.inner),
            segments,
        }
    }

    /// Extend the path by an array element.
    pub fn index(&self, index: usize) -> StorePath {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        StorePath {
            inner: Arc::clone(&self.inner),
            segments,
        }
    }

    /// Subscribe the current effect to every step of this path.
    fn track(&self) {
        let Some(subscriber) = tracking::current_subscriber() else {
            return;
        };
        for depth in 1..=self.segments.len() {
            let pointer = pointer_of(&self.segments[..depth]);
            let set = self
                .inner
                .subscribers
                .entry(pointer)
                .or_default()
                .clone();
            if set.insert(subscriber) {
                tracking::record_source(set);
            }
        }
    }

    /// Read the value at this path.
    ///
    /// Subscribes the current effect (if any); returns `None` when the path
    /// does not exist in the tree.
    pub fn get(&self) -> Option<Value> {
        self.track();
        self.inner
            .root
            .read()
            .pointer(&pointer_of(&self.segments))
            .cloned()
    }

    /// Read without establishing a dependency.
    pub fn get_untracked(&self) -> Option<Value> {
        self.inner
            .root
            .read()
            .pointer(&pointer_of(&self.segments))
            .cloned()
    }

    /// Read and deserialize the value at this path.
    pub fn get_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.get().and_then(|value| serde_json::from_value(value).ok())
    }

    /// Write a value at this path.
    ///
    /// A structurally equal value is a no-op: nothing is assigned and
    /// nothing is scheduled. On change, missing intermediate containers are
    /// created, the assignment becomes immediately visible, and only this
    /// exact path's subscribers are queued, leaving sibling keys untouched.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        let pointer = pointer_of(&self.segments);
        {
            let mut root = self.inner.root.write();
            if root.pointer(&pointer) == Some(&value) {
                return;
            }
            assign(&mut root, &self.segments, value);
        }

        if let Some(set) = self.inner.subscribers.get(&pointer) {
            scheduler::schedule(set.snapshot());
        }
    }

    /// Number of subscribers on this exact path.
    pub fn subscriber_count(&self) -> usize {
        let pointer = pointer_of(&self.segments);
        self.inner
            .subscribers
            .get(&pointer)
            .map(|set| set.len())
            .unwrap_or(0)
    }
}

impl Debug for StorePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePath")
            .field("pointer", &pointer_of(&self.segments))
            .finish()
    }
}

/// Navigate to the node addressed by `segments`, creating missing
/// containers, and assign `value` there.
fn assign(root: &mut Value, segments: &[Segment], value: Value) {
    let mut node = root;
    for segment in segments {
        node = child_mut(node, segment);
    }
    *node = value;
}

fn child_mut<'a>(node: &'a mut Value, segment: &Segment) -> &'a mut Value {
    match segment {
        Segment::Key(key) => {
            if !matches!(node, Value::Object(_)) {
                *node = Value::Object(Map::new());
            }
            match node {
                Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                _ => unreachable!("node was coerced to an object"),
            }
        }
        Segment::Index(index) => {
            if !matches!(node, Value::Array(_)) {
                *node = Value::Array(Vec::new());
            }
            match node {
                Value::Array(items) => {
                    while items.len() <= *index {
                        items.push(Value::Null);
                    }
                    &mut items[*index]
                }
                _ => unreachable!("node was coerced to an array"),
            }
        }
    }
}

/// The sanctioned mutation entry point for a store.
///
/// The producer callback receives the live store; all change detection and
/// notification happens inside [`StorePath::set`], so writes made here and
/// direct `StorePath::set` calls behave identically.
#[derive(Clone)]
pub struct StoreSetter {
    store: Store,
}

impl StoreSetter {
    /// Invoke a producer against the live store.
    pub fn update(&self, producer: impl FnOnce(&Store)) {
        producer(&self.store);
    }
}

/// Create a store from any serializable initial state.
///
/// Returns the read handle and its setter as a pair.
pub fn create_store<T: Serialize>(initial: T) -> (Store, StoreSetter) {
    let root =
        serde_json::to_value(initial).expect("initial store state must serialize to a JSON value");
    Store::from_value(root)
}
