use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::model::{Entry, Mode};

const BASE_WEIGHT: i32 = 100;
const NAME_HIT: i32 = 20;
const NAME_PRECISION: i32 = 10;
const CONNECTION_ADJUSTMENT: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTokens {
    pub designer: String,
    pub enterprise: String,
}

impl Default for PrefixTokens {
    fn default() -> Self {
        Self {
            designer: "1".to_string(),
            enterprise: "1e".to_string(),
        }
    }
}

/// Splits the mode selector off the front of `terms`. `None` means the query carries
/// no recognized prefix and must produce no results.
pub fn resolve_prefix<'a>(
    terms: &'a [String],
    prefixes: &PrefixTokens,
) -> Option<(Mode, &'a [String])> {
    let (first, rest) = terms.split_first()?;
    if *first == prefixes.designer {
        Some((Mode::Designer, rest))
    } else if *first == prefixes.enterprise {
        Some((Mode::Enterprise, rest))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameHit {
    Miss,
    Partial,
    Whole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermHit {
    pub name: NameHit,
    pub connection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub hits: Vec<TermHit>,
}

/// Compiled predicate terms. Each term is a case-insensitive regex; a term that is not
/// valid regex syntax is matched literally instead.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    patterns: Vec<Regex>,
}

impl TermMatcher {
    pub fn compile(terms: &[String]) -> Self {
        Self {
            patterns: terms.iter().filter_map(|term| compile_term(term)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every term must hit the name or the connection string.
    pub fn matches(&self, entry: &Entry) -> Option<MatchOutcome> {
        if self.patterns.is_empty() {
            return None;
        }

        let mut hits = Vec::with_capacity(self.patterns.len());
        for pattern in &self.patterns {
            let name = match pattern.find(&entry.name) {
                Some(found) if found.len() == entry.name.len() => NameHit::Whole,
                Some(_) => NameHit::Partial,
                None => NameHit::Miss,
            };
            let connection = pattern.is_match(&entry.connection);
            if name == NameHit::Miss && !connection {
                return None;
            }
            hits.push(TermHit { name, connection });
        }

        Some(MatchOutcome { hits })
    }
}

fn compile_term(term: &str) -> Option<Regex> {
    RegexBuilder::new(term)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

/// Lower is better. Only the last term's connection hit counts; earlier ones are
/// overwritten rather than summed.
pub fn weigh(outcome: &MatchOutcome) -> i32 {
    let mut weight = BASE_WEIGHT;
    for hit in &outcome.hits {
        match hit.name {
            NameHit::Whole => weight -= NAME_HIT + NAME_PRECISION,
            NameHit::Partial => weight -= NAME_HIT - NAME_PRECISION,
            NameHit::Miss => {}
        }
    }

    let connection = match outcome.hits.last() {
        Some(hit) if hit.connection => -CONNECTION_ADJUSTMENT,
        _ => CONNECTION_ADJUSTMENT,
    };

    weight + connection
}

/// Names grouped by weight, each group in first-seen order.
#[derive(Debug, Default)]
pub struct WeightBuckets {
    order: Vec<i32>,
    by_weight: HashMap<i32, Vec<String>>,
}

impl WeightBuckets {
    pub fn insert(&mut self, weight: i32, name: &str) {
        let bucket = self.by_weight.entry(weight).or_insert_with(|| {
            self.order.push(weight);
            Vec::new()
        });
        bucket.push(name.to_string());
    }

    pub fn into_ranked(mut self) -> Vec<String> {
        self.order.sort_unstable();
        let mut ranked = Vec::new();
        for weight in self.order {
            if let Some(names) = self.by_weight.remove(&weight) {
                ranked.extend(names);
            }
        }
        ranked
    }
}

/// Ranks `entries` against already de-prefixed predicate terms.
pub fn rank(entries: &[Entry], terms: &[String]) -> Vec<String> {
    let matcher = TermMatcher::compile(terms);
    if matcher.is_empty() || matcher.patterns.len() != terms.len() {
        return Vec::new();
    }

    let mut buckets = WeightBuckets::default();
    for entry in entries {
        if let Some(outcome) = matcher.matches(entry) {
            buckets.insert(weigh(&outcome), &entry.name);
        }
    }
    buckets.into_ranked()
}
