use std::collections::{HashMap, VecDeque};

/// Resolved tweet texts keyed by tweet id, bounded with first-in-first-out eviction.
///
/// Reads never affect eviction order, and overwriting an id keeps its original position.
#[derive(Debug, Clone)]
pub struct TweetCache {
    capacity: usize,
    texts: HashMap<String, String>,
    order: VecDeque<String>,
}

impl TweetCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            texts: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Insert or overwrite `id`. When the cache is full the oldest entry goes first,
    /// and its id is returned.
    pub fn put(&mut self, id: impl Into<String>, text: impl Into<String>) -> Option<String> {
        let id = id.into();
        let evicted = if self.texts.len() >= self.capacity {
            self.order.pop_front().map(|oldest| {
                self.texts.remove(&oldest);
                oldest
            })
        } else {
            None
        };

        if self.texts.insert(id.clone(), text.into()).is_none() {
            self.order.push_back(id);
        }
        evicted
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ids from oldest to newest insertion.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
