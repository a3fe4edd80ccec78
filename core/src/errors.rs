use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

/// A bounded list of recent errors, newest first. Entries older than the cache
/// duration are dropped on every read and write.
#[derive(Default, Clone, Debug)]
pub struct RecentErrors<T: Clone + Serialize> {
    depth: usize,
    cache_duration: Duration,
    errors: VecDeque<(T, SystemTime)>,
}
impl<T: Clone + Serialize> RecentErrors<T> {
    pub fn new(depth: usize, cache_duration: Duration) -> Self {
        Self {
            depth,
            cache_duration,
            errors: Default::default(),
        }
    }
    pub fn add(&mut self, t: T) {
        self.errors.push_front((t, SystemTime::now()));
        self.trim();
    }
    pub fn get(&mut self) -> Vec<(T, SystemTime)> {
        self.trim();
        self.errors.iter().cloned().collect()
    }
    pub fn values(&mut self) -> Vec<T> {
        self.trim();
        self.errors.iter().map(|(t, _)| t.clone()).collect()
    }
    pub fn len(&self) -> usize {
        self.errors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
    pub fn clear(&mut self) {
        self.errors.clear();
    }
    fn trim(&mut self) {
        self.errors.truncate(self.depth);
        let cache_duration = self.cache_duration;
        self.errors
            .retain(|(_, d)| match SystemTime::now().duration_since(*d) {
                Ok(dur) => dur < cache_duration,
                Err(_) => false,
            });
    }
}
