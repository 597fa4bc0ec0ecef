//! In-memory collections backing the frontier
//!
//! `PendingQueue` keeps insertion order with cheap removal from the middle,
//! `LinkLog` is an append-only list with set membership.

use crate::link::WeightedLink;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Insertion-ordered set of links keyed by URL
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    order: BTreeMap<u64, WeightedLink>,
    index: HashMap<String, u64>,
    next_seq: u64,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link at the back; returns false if its URL is already queued
    pub fn push(&mut self, link: WeightedLink) -> bool {
        if self.index.contains_key(&link.url) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(link.url.clone(), seq);
        self.order.insert(seq, link);
        true
    }

    /// Removes a link by URL
    pub fn remove(&mut self, url: &str) -> Option<WeightedLink> {
        let seq = self.index.remove(url)?;
        self.order.remove(&seq)
    }

    /// Moves a queued link behind every other link
    pub fn move_to_back(&mut self, url: &str) -> bool {
        match self.remove(url) {
            Some(link) => self.push(link),
            None => false,
        }
    }

    pub fn get(&self, url: &str) -> Option<&WeightedLink> {
        self.index.get(url).and_then(|seq| self.order.get(seq))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &WeightedLink> {
        self.order.values()
    }

    /// Copies the queue in insertion order, for snapshot writes
    pub fn to_vec(&self) -> Vec<WeightedLink> {
        self.order.values().cloned().collect()
    }

    /// Copies the queue as it would be after removing `url`
    pub fn without(&self, url: &str) -> Vec<WeightedLink> {
        self.order
            .values()
            .filter(|link| link.url != url)
            .cloned()
            .collect()
    }
}

/// Append-only list of links with URL membership
#[derive(Debug, Clone, Default)]
pub struct LinkLog {
    links: Vec<WeightedLink>,
    urls: HashSet<String>,
}

impl LinkLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a link; returns false if its URL is already logged
    pub fn push(&mut self, link: WeightedLink) -> bool {
        if !self.urls.insert(link.url.clone()) {
            return false;
        }
        self.links.push(link);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightedLink> {
        self.links.iter()
    }
}
