use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;

use crate::config::{self, ConfigError};
use crate::logging;
use crate::provider::{SearchProvider, ServiceError};
use crate::transport::handle_json;
use crate::watcher::ConfigWatcher;

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Service(ServiceError),
    Io(std::io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Service(error) => write!(f, "service error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ServiceError> for RuntimeError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Stdio,
    Query(Vec<String>),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub ibases_path: Option<PathBuf>,
    pub watch: bool,
    pub mode: RunMode,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            ibases_path: None,
            watch: true,
            mode: RunMode::Stdio,
        }
    }
}

/// Inputs funnelled into the single thread that owns the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// One line of JSON from the host.
    Request(String),
    /// The ibases list (or a directory on its path) changed.
    ConfigChanged,
    InputClosed,
}

pub fn usage() -> &'static str {
    "usage: onec-search-core [--config <path>] [--ibases <path>] [--no-watch] [--stdio | --query <terms>...]"
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--ibases" => {
                let value = iter.next().ok_or("--ibases requires a path")?;
                options.ibases_path = Some(PathBuf::from(value));
            }
            "--no-watch" => options.watch = false,
            "--stdio" => options.mode = RunMode::Stdio,
            "--query" => {
                let mut terms = Vec::new();
                while let Some(term) = iter.next_if(|next| !next.starts_with("--")) {
                    terms.push(term.clone());
                }
                if terms.is_empty() {
                    return Err("--query requires at least one term".to_string());
                }
                options.mode = RunMode::Query(terms);
            }
            "-h" | "--help" => options.mode = RunMode::Help,
            other => return Err(format!("unknown argument '{other}'\n{}", usage())),
        }
    }

    Ok(options)
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    if options.mode == RunMode::Help {
        println!("{}", usage());
        return Ok(());
    }

    if let Err(error) = logging::init() {
        eprintln!("[onec-search] logging disabled: {error}");
    }

    let mut config = config::load(options.config_path.as_deref())?;
    if let Some(ibases_path) = options.ibases_path {
        config.ibases_path = ibases_path;
    }
    logging::info(
        "startup",
        &[
            ("config_path", config.config_path.display().to_string()),
            ("ibases_path", config.ibases_path.display().to_string()),
        ],
    );

    let mut provider = SearchProvider::new(config)?;
    provider.reload();

    match options.mode {
        RunMode::Query(terms) => run_query(&mut provider, &terms),
        RunMode::Stdio => serve_stdio(provider, options.watch),
        RunMode::Help => Ok(()),
    }
}

fn run_query(provider: &mut SearchProvider, terms: &[String]) -> Result<(), RuntimeError> {
    let results = provider.initial_result_set(terms);
    let metas = provider.result_metas(&results)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for meta in metas {
        writeln!(out, "{}\t{}", meta.name, meta.description)?;
    }
    Ok(())
}

/// One JSON request per stdin line, one JSON response per stdout line. Watcher
/// notifications and requests share a channel so the provider stays on this thread.
fn serve_stdio(mut provider: SearchProvider, watch: bool) -> Result<(), RuntimeError> {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>();

    let mut watcher = if watch {
        let notify_tx = tx.clone();
        match ConfigWatcher::start(&provider.config().ibases_path, move || {
            let _ = notify_tx.send(RuntimeEvent::ConfigChanged);
        }) {
            Ok(watcher) => Some(watcher),
            Err(error) => {
                logging::warn("config watcher unavailable", &[("error", error.to_string())]);
                eprintln!("[onec-search] config watcher unavailable: {error}");
                None
            }
        }
    } else {
        None
    };

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(RuntimeEvent::Request(line)).is_err() {
                        return;
                    }
                }
                Err(error) => {
                    logging::error("stdin read failed", &[("error", error.to_string())]);
                    break;
                }
            }
        }
        let _ = tx.send(RuntimeEvent::InputClosed);
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_event_loop(&mut provider, rx, &mut out, watcher.as_mut())?;

    logging::info("shutting down", &[("reason", "stdin closed".to_string())]);
    Ok(())
}

/// Applies events in order until `InputClosed` or the end of `events`. Each
/// non-blank request gets exactly one response line on `out`; `ConfigChanged`
/// re-arms the watcher when one is given and reloads the entry store.
pub fn run_event_loop<I, W>(
    provider: &mut SearchProvider,
    events: I,
    out: &mut W,
    mut watcher: Option<&mut ConfigWatcher>,
) -> Result<(), RuntimeError>
where
    I: IntoIterator<Item = RuntimeEvent>,
    W: Write,
{
    for event in events {
        match event {
            RuntimeEvent::Request(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let response = handle_json(provider, &line);
                writeln!(out, "{response}")?;
                out.flush()?;
            }
            RuntimeEvent::ConfigChanged => {
                if let Some(watcher) = watcher.as_deref_mut() {
                    if let Err(error) = watcher.rearm() {
                        logging::warn("config watch rearm failed", &[("error", error.to_string())]);
                    }
                }
                provider.reload();
            }
            RuntimeEvent::InputClosed => break,
        }
    }
    Ok(())
}
