use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use onec_search_core::config::Config;
use onec_search_core::contract::{CoreRequest, CoreResponse, ResultSetRequest};
use onec_search_core::provider::SearchProvider;
use onec_search_core::runtime::{run_event_loop, RuntimeEvent};
use onec_search_core::transport::TransportResponse;

fn unique_temp_path(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "onec-search-{label}-{}-{unique}.v8i",
        std::process::id()
    ))
}

fn provider_for(path: PathBuf) -> SearchProvider {
    let config = Config {
        ibases_path: path,
        executable: Some(PathBuf::from("/opt/1C/v8.3/x86_64/1cv8")),
        ..Config::default()
    };
    let mut provider = SearchProvider::new(config).unwrap();
    provider.reload();
    provider
}

fn query_line(raw: &[&str]) -> RuntimeEvent {
    let request = CoreRequest::GetInitialResultSet(ResultSetRequest {
        terms: raw.iter().map(|s| s.to_string()).collect(),
    });
    RuntimeEvent::Request(serde_json::to_string(&request).unwrap())
}

fn run(provider: &mut SearchProvider, events: Vec<RuntimeEvent>) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    run_event_loop(provider, events, &mut out, None).unwrap();

    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| match serde_json::from_str::<TransportResponse>(line).unwrap() {
            TransportResponse::Ok {
                response: CoreResponse::ResultSet(set),
            } => set.results,
            other => panic!("unexpected response: {other:?}"),
        })
        .collect()
}

#[test]
fn config_change_reloads_rewritten_and_deleted_list() {
    let path = unique_temp_path("runtime-reload");
    std::fs::write(&path, "[Trade]\nConnect=Srvr=\"app01\";\n").unwrap();
    let mut provider = provider_for(path.clone());

    let before = run(&mut provider, vec![query_line(&["1", "a"])]);
    assert_eq!(before, vec![vec!["Trade".to_string()]]);

    std::fs::write(&path, "[Payroll]\nConnect=File=\"/srv/hr\";\n").unwrap();
    let rewritten = run(
        &mut provider,
        vec![
            query_line(&["1", "a"]),
            RuntimeEvent::ConfigChanged,
            query_line(&["1", "a"]),
        ],
    );
    assert_eq!(
        rewritten,
        vec![vec!["Trade".to_string()], vec!["Payroll".to_string()]]
    );

    std::fs::remove_file(&path).unwrap();
    let deleted = run(
        &mut provider,
        vec![RuntimeEvent::ConfigChanged, query_line(&["1", "a"])],
    );
    assert_eq!(deleted, vec![Vec::<String>::new()]);
    assert_eq!(provider.entry_count(), 0);
}

#[test]
fn loop_skips_blank_lines_and_stops_at_input_closed() {
    let path = unique_temp_path("runtime-close");
    std::fs::write(&path, "[Trade]\nConnect=Srvr=\"app01\";\n").unwrap();
    let mut provider = provider_for(path.clone());

    let responses = run(
        &mut provider,
        vec![
            RuntimeEvent::Request("   ".to_string()),
            query_line(&["1e", "trade"]),
            RuntimeEvent::InputClosed,
            query_line(&["1", "trade"]),
        ],
    );

    assert_eq!(responses, vec![vec!["Trade".to_string()]]);
    std::fs::remove_file(&path).unwrap();
}
