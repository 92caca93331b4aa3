// src/utils/cache.rs
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{ReduceRequest, Statistics};

/// Thread-safe memo of engine reductions, keyed by the serialized request.
///
/// Only successful responses are stored, so a transient engine failure is
/// retried on the next identical request.
#[derive(Clone, Default)]
pub struct ReductionCache {
    entries: Arc<Mutex<HashMap<String, Statistics>>>,
}

impl ReductionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(request: &ReduceRequest) -> Option<String> {
        serde_json::to_string(request).ok()
    }

    pub fn get(&self, request: &ReduceRequest) -> Option<Statistics> {
        let key = Self::key(request)?;
        self.entries.lock().get(&key).cloned()
    }

    pub fn insert(&self, request: &ReduceRequest, stats: Statistics) {
        if let Some(key) = Self::key(request) {
            self.entries.lock().insert(key, stats);
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
