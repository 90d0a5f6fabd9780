#![allow(dead_code)]

use actbus_core::Observer;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Collects every value delivered to its sinks.
#[derive(Debug)]
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self { seen: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn sink(&self) -> impl Fn(&T) + Send + Sync + 'static {
        let seen = self.seen.clone();
        move |value: &T| seen.lock().push(value.clone())
    }

    pub fn values(&self) -> Vec<T> {
        self.seen.lock().clone()
    }
}

/// Counts completion signals.
#[derive(Debug, Default, Clone)]
pub struct Completions(Arc<AtomicUsize>);

struct CompletionObserver(Arc<AtomicUsize>);

impl<T> Observer<T> for CompletionObserver {
    fn next(&self, _: &T) {}

    fn complete(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Completions {
    pub fn observer<T>(&self) -> impl Observer<T> {
        CompletionObserver(self.0.clone())
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Parse as an integer, falling back to zero.
pub fn parse_count(raw: String) -> i64 {
    raw.trim().parse().unwrap_or(0)
}
