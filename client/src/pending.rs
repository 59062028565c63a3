//! Tracking of in-flight operations.
//!
//! At most one operation per key may be outstanding. Operations on different
//! streams do not contend with each other.
use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::{Error, Result},
    stream::StreamId,
};

/// What an in-flight operation is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingKey {
    /// Creation of a new stream.
    Create,
    /// A claim or cancellation on an existing stream.
    Stream(StreamId),
}

impl fmt::Display for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingKey::Create => f.write_str("stream creation"),
            PendingKey::Stream(id) => write!(f, "stream #{id}"),
        }
    }
}

/// Set of keys with an operation in flight.
#[derive(Clone, Debug, Default)]
pub struct PendingSet {
    keys: Arc<Mutex<HashSet<PendingKey>>>,
}

impl PendingSet {
    /// Marks `key` as in flight until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// * [`Error::AlreadyPending`] - If `key` is already in flight.
    pub fn begin(&self, key: PendingKey) -> Result<PendingGuard> {
        if !self.lock().insert(key) {
            return Err(Error::AlreadyPending(key));
        }
        Ok(PendingGuard { set: self.clone(), key })
    }

    /// Whether `key` is in flight.
    #[must_use]
    pub fn is_pending(&self, key: PendingKey) -> bool {
        self.lock().contains(&key)
    }

    /// Number of operations in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PendingKey>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a key in flight; releases it on drop, whatever the outcome.
#[derive(Debug)]
#[must_use = "the key is released as soon as the guard is dropped"]
pub struct PendingGuard {
    set: PendingSet,
    key: PendingKey,
}

impl PendingGuard {
    /// Key held by this guard.
    pub fn key(&self) -> PendingKey {
        self.key
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}
