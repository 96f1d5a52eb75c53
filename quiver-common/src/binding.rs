//! Model identity and asynchronous model references.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::channel::oneshot;
use futures::future::{join_all, FutureExt, LocalBoxFuture, Shared};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a model instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(String);

impl ModelId {
    /// Allocate a fresh id with a readable prefix, e.g. `Scatter-12`
    pub fn unique(prefix: &str) -> Self {
        let n = NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("{prefix}-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to another model that may not have been materialized yet.
///
/// `Pending` references resolve to `None` when their [`Resolver`] is dropped without
/// providing a value.
#[derive(Clone)]
pub enum ModelRef<T: Clone + 'static> {
    Ready(T),
    Pending(Shared<LocalBoxFuture<'static, Option<T>>>),
}

impl<T: Clone + 'static> ModelRef<T> {
    pub fn ready(value: T) -> Self {
        Self::Ready(value)
    }

    pub fn pending() -> (Self, Resolver<T>) {
        let (tx, rx) = oneshot::channel();
        let fut = rx.map(|result| result.ok()).boxed_local().shared();
        (Self::Pending(fut), Resolver { tx })
    }

    /// The value, if it is already available without awaiting
    pub fn peek(&self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value.clone()),
            Self::Pending(fut) => fut.peek().cloned().flatten(),
        }
    }

    pub async fn resolve(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending(fut) => fut.await,
        }
    }
}

impl<T: Clone + 'static> From<T> for ModelRef<T> {
    fn from(value: T) -> Self {
        Self::Ready(value)
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for ModelRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(fut) => f.debug_tuple("Pending").field(&fut.peek()).finish(),
        }
    }
}

/// Completes a pending [`ModelRef`]
pub struct Resolver<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Resolver<T> {
    pub fn resolve(self, value: T) {
        // The receiving side may have been dropped already, which is fine
        let _ = self.tx.send(value);
    }
}

/// Resolve every reference in the mapping, keeping the mapping order.
///
/// Entries whose reference never resolves are skipped.
pub async fn resolve_all<K, T>(refs: IndexMap<K, ModelRef<T>>) -> IndexMap<K, T>
where
    K: Hash + Eq + Clone,
    T: Clone + 'static,
{
    let keys: Vec<K> = refs.keys().cloned().collect();
    let values = join_all(refs.into_values().map(|r| r.resolve())).await;
    keys.into_iter()
        .zip(values)
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
}
