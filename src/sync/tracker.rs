// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory record of the last update successfully applied per resource.
//! Lost on restart; the periodic sweep re-sends everything anyway.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub struct AppliedStatus<T> {
    applied: Mutex<HashMap<String, T>>,
}

impl<T: Clone + PartialEq> AppliedStatus<T> {
    pub fn new() -> Self {
        Self {
            applied: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_applied(&self, key: &str, update: &T) -> bool {
        self.lock().get(key).is_some_and(|last| last == update)
    }

    pub fn record(&self, key: &str, update: T) {
        self.lock().insert(key.to_string(), update);
    }

    /// Drop records for resources that no longer exist
    pub fn retain_keys(&self, live: &HashSet<String>) {
        self.lock().retain(|key, _| live.contains(key));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, T>> {
        // Every critical section is a single map operation, so poisoning is ignored
        self.applied
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone + PartialEq> Default for AppliedStatus<T> {
    fn default() -> Self {
        Self::new()
    }
}
