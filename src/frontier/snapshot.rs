use std::collections::BTreeSet;

/// Point-in-time copy of a frontier's URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierSnapshot {
    pub site: String,

    /// Pending URLs in queue order
    pub pending: Vec<String>,

    pub done: BTreeSet<String>,

    pub ignored: BTreeSet<String>,

    /// Ignore prefixes in rule order
    pub ignore_rules: Vec<String>,
}

impl FrontierSnapshot {
    /// Pending URLs as a set, for order-insensitive comparison
    pub fn pending_set(&self) -> BTreeSet<String> {
        self.pending.iter().cloned().collect()
    }

    /// Compares two snapshots as sets, ignoring queue and rule order
    pub fn same_sets(&self, other: &Self) -> bool {
        let rules = |s: &Self| s.ignore_rules.iter().cloned().collect::<BTreeSet<_>>();
        self.site == other.site
            && self.pending_set() == other.pending_set()
            && self.done == other.done
            && self.ignored == other.ignored
            && rules(self) == rules(other)
    }

    /// Total number of URLs the frontier knows about
    pub fn known_urls(&self) -> usize {
        self.pending.len() + self.done.len() + self.ignored.len()
    }
}
