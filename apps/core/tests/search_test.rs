use onec_search_core::engine::SearchEngine;
use onec_search_core::model::{Entry, Mode};
use onec_search_core::search::{weigh, TermMatcher};

fn terms(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn sample_entries() -> Vec<Entry> {
    vec![
        Entry::new("Alpha", "db1"),
        Entry::new("Beta", "alpha-host"),
    ]
}

#[test]
fn prefix_less_queries_return_nothing() {
    let mut engine = SearchEngine::default();
    let entries = sample_entries();

    assert!(engine.initial_result_set(&entries, &terms(&["alpha"])).is_empty());
    assert!(engine.initial_result_set(&entries, &terms(&["9", "x"])).is_empty());
    assert!(engine.initial_result_set(&entries, &[]).is_empty());
}

#[test]
fn bare_prefix_returns_nothing() {
    let mut engine = SearchEngine::default();
    assert!(engine
        .initial_result_set(&sample_entries(), &terms(&["1"]))
        .is_empty());
}

#[test]
fn name_or_connection_match_is_case_insensitive() {
    let mut engine = SearchEngine::default();
    let results = engine.initial_result_set(&sample_entries(), &terms(&["1", "alpha"]));

    assert_eq!(results, vec!["Alpha", "Beta"]);
    assert_eq!(engine.mode(), Mode::Designer);
}

#[test]
fn weights_follow_name_and_connection_rules() {
    let matcher = TermMatcher::compile(&terms(&["alpha"]));
    let entries = sample_entries();

    let alpha = matcher.matches(&entries[0]).unwrap();
    let beta = matcher.matches(&entries[1]).unwrap();

    assert_eq!(weigh(&alpha), 80);
    assert_eq!(weigh(&beta), 90);
}

#[test]
fn exact_name_ranks_above_partial_name() {
    let mut engine = SearchEngine::default();
    let entries = vec![
        Entry::new("Trade Archive", "File=\"/a\";"),
        Entry::new("Trade", "File=\"/b\";"),
        Entry::new("Old Trade", "File=\"/c\";"),
    ];

    let results = engine.initial_result_set(&entries, &terms(&["1e", "trade"]));
    assert_eq!(results[0], "Trade");
    assert_eq!(results.len(), 3);
    assert_eq!(engine.mode(), Mode::Enterprise);
}

#[test]
fn equal_weights_keep_input_order() {
    let mut engine = SearchEngine::default();
    let entries = vec![
        Entry::new("Payroll North", "Srvr=\"hr\";"),
        Entry::new("Accounting", "Srvr=\"fin\";"),
        Entry::new("Payroll South", "Srvr=\"hr\";"),
        Entry::new("Payroll East", "Srvr=\"hr\";"),
    ];

    let results = engine.initial_result_set(&entries, &terms(&["1", "payroll"]));
    assert_eq!(results, vec!["Payroll North", "Payroll South", "Payroll East"]);
}

#[test]
fn every_term_must_match() {
    let mut engine = SearchEngine::default();
    let entries = vec![
        Entry::new("Payroll North", "Srvr=\"hr01\";"),
        Entry::new("Payroll South", "Srvr=\"hr02\";"),
    ];

    let results = engine.initial_result_set(&entries, &terms(&["1", "payroll", "HR02"]));
    assert_eq!(results, vec!["Payroll South"]);
}

#[test]
fn empty_store_yields_nothing() {
    let mut engine = SearchEngine::default();
    assert!(engine.initial_result_set(&[], &terms(&["1", "a"])).is_empty());
}

#[test]
fn subsearch_reruns_against_full_collection() {
    let mut engine = SearchEngine::default();
    let entries = sample_entries();

    let narrowed = vec!["Alpha".to_string()];
    let results = engine.subsearch_result_set(&entries, &narrowed, &terms(&["1", "be"]));
    assert_eq!(results, vec!["Beta"]);
}

#[test]
fn results_are_names_from_the_snapshot() {
    let mut engine = SearchEngine::default();
    let entries = vec![
        Entry::new("Alpha", "db1"),
        Entry::new("Beta", "alpha-host"),
        Entry::new("Gamma", "db3"),
    ];

    let results = engine.initial_result_set(&entries, &terms(&["1", "a"]));
    assert!(!results.is_empty());
    for name in results {
        assert!(entries.iter().any(|entry| entry.name == name));
    }
}
