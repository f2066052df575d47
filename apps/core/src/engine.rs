use std::fmt::{Display, Formatter};

use crate::model::{Entry, Mode, ResultMeta};
use crate::search::{self, PrefixTokens};

pub const DEFAULT_MIN_RESULTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    EntryNotFound(String),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(id) => write!(f, "entry not found: {id}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Query engine for one interactive session.
///
/// `mode` is written by every query that carries a recognized prefix and read by the
/// next launch, so callers must not interleave queries from different sessions.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    prefixes: PrefixTokens,
    min_results: usize,
    mode: Mode,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(PrefixTokens::default(), DEFAULT_MIN_RESULTS)
    }
}

impl SearchEngine {
    pub fn new(prefixes: PrefixTokens, min_results: usize) -> Self {
        Self {
            prefixes,
            min_results,
            mode: Mode::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn initial_result_set(&mut self, entries: &[Entry], terms: &[String]) -> Vec<String> {
        self.query(entries, terms)
    }

    /// Re-runs the full query; `previous` is not used to narrow the candidates.
    pub fn subsearch_result_set(
        &mut self,
        entries: &[Entry],
        _previous: &[String],
        terms: &[String],
    ) -> Vec<String> {
        self.query(entries, terms)
    }

    pub fn result_metas(
        &self,
        entries: &[Entry],
        ids: &[String],
    ) -> Result<Vec<ResultMeta>, EngineError> {
        ids.iter()
            .map(|id| {
                entries
                    .iter()
                    .find(|entry| entry.name == *id)
                    .map(|entry| ResultMeta::for_entry(entry, self.mode))
                    .ok_or_else(|| EngineError::EntryNotFound(id.clone()))
            })
            .collect()
    }

    pub fn filter_results(&self, results: &[String], max_results: usize) -> Vec<String> {
        let limit = max_results.max(self.min_results);
        results.iter().take(limit).cloned().collect()
    }

    fn query(&mut self, entries: &[Entry], terms: &[String]) -> Vec<String> {
        let Some((mode, predicates)) = search::resolve_prefix(terms, &self.prefixes) else {
            return Vec::new();
        };
        self.mode = mode;
        search::rank(entries, predicates)
    }
}
