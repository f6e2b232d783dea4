// src/notes/tally.rs
// =============================================================================
// Per-author pull request counts.
//
// The tally is rebuilt for every run. After the last page it is regrouped by
// count so that authors with the same number of PRs share one line:
//
//   3 PRs: alice
//   1 PR: bob, carol
// =============================================================================

use std::collections::{BTreeMap, HashMap};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorTally {
    // First-seen order, so ties are listed in the order authors appeared
    order: Vec<String>,
    counts: HashMap<String, u32>,
}

impl AuthorTally {
    pub fn record(&mut self, login: &str) {
        match self.counts.get_mut(login) {
            Some(count) => *count += 1,
            None => {
                self.order.push(login.to_string());
                self.counts.insert(login.to_string(), 1);
            }
        }
    }

    pub fn count(&self, login: &str) -> u32 {
        self.counts.get(login).copied().unwrap_or(0)
    }

    /// Sum over all authors, which equals the number of PRs recorded.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.order
            .iter()
            .map(|login| (login.as_str(), self.counts[login]))
    }

    /// Count -> authors with exactly that count, ascending by count.
    pub fn by_count(&self) -> BTreeMap<u32, Vec<&str>> {
        let mut grouped: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
        for (login, count) in self.iter() {
            grouped.entry(count).or_default().push(login);
        }
        grouped
    }
}

impl Serialize for AuthorTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (login, count) in self.iter() {
            map.serialize_entry(login, &count)?;
        }
        map.end()
    }
}

/// "PR" for exactly one, "PRs" for anything else.
pub fn pr_label(count: u32) -> &'static str {
    if count == 1 {
        "PR"
    } else {
        "PRs"
    }
}
