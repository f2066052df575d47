use std::path::PathBuf;

use crate::config::{validate, Config};
use crate::engine::{EngineError, SearchEngine};
use crate::ibases;
use crate::launcher::{
    build_launch_command, resolve_executable, LaunchCommand, LaunchError, ProcessSpawner,
    SystemSpawner,
};
use crate::logging;
use crate::model::{Entry, Mode, ProviderInfo, ResultMeta};
use crate::store::EntryStore;

#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    Engine(EngineError),
    Launch(LaunchError),
    InvalidRequest(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Engine(error) => write!(f, "{error}"),
            Self::Launch(error) => write!(f, "launch error: {error}"),
            Self::InvalidRequest(error) => write!(f, "invalid request: {error}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<EngineError> for ServiceError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<LaunchError> for ServiceError {
    fn from(value: LaunchError) -> Self {
        Self::Launch(value)
    }
}

/// Search provider for one shell session: the entry store, the query engine and the
/// launcher seam. Dropping it is the equivalent of disabling the provider.
pub struct SearchProvider {
    config: Config,
    store: EntryStore,
    engine: SearchEngine,
    spawner: Box<dyn ProcessSpawner>,
    info: ProviderInfo,
}

impl SearchProvider {
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        let engine = SearchEngine::new(config.prefixes(), config.min_results as usize);
        Ok(Self {
            config,
            store: EntryStore::default(),
            engine,
            spawner: Box::new(SystemSpawner),
            info: ProviderInfo::default(),
        })
    }

    pub fn with_spawner(mut self, spawner: Box<dyn ProcessSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn info(&self) -> &ProviderInfo {
        &self.info
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn entry_count(&self) -> usize {
        self.store.len()
    }

    /// Re-reads the configured `ibases.v8i`. A missing file empties the store.
    pub fn reload(&mut self) -> usize {
        let entries = ibases::load_ibases(&self.config.ibases_path);
        self.refresh(entries)
    }

    pub fn refresh(&mut self, entries: Vec<Entry>) -> usize {
        self.store.replace(entries);
        logging::info(
            "entry store refreshed",
            &[
                ("entries", self.store.len().to_string()),
                ("source", self.config.ibases_path.display().to_string()),
            ],
        );
        self.store.len()
    }

    pub fn initial_result_set(&mut self, terms: &[String]) -> Vec<String> {
        let snapshot = self.store.snapshot();
        self.engine.initial_result_set(&snapshot, terms)
    }

    pub fn subsearch_result_set(&mut self, previous: &[String], terms: &[String]) -> Vec<String> {
        let snapshot = self.store.snapshot();
        self.engine.subsearch_result_set(&snapshot, previous, terms)
    }

    pub fn result_metas(&self, ids: &[String]) -> Result<Vec<ResultMeta>, ServiceError> {
        let snapshot = self.store.snapshot();
        Ok(self.engine.result_metas(&snapshot, ids)?)
    }

    pub fn filter_results(&self, results: &[String], max_results: usize) -> Vec<String> {
        self.engine.filter_results(results, max_results)
    }

    /// Launches `id` in the mode chosen by the most recent prefixed query.
    pub fn activate_result(&self, id: &str) -> Result<LaunchCommand, ServiceError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidRequest("identifier is empty".into()));
        }
        if self.store.get(trimmed).is_none() {
            return Err(EngineError::EntryNotFound(trimmed.to_string()).into());
        }

        let command = build_launch_command(
            &self.executable(),
            self.engine.mode(),
            &self.config.launch_args,
            &self.config.ibname_placeholder,
            trimmed,
        )?;

        let mode = self.engine.mode().to_string();
        let argv = command.argv().join(" ");
        logging::info(
            "launching",
            &[("id", trimmed.to_string()), ("mode", mode.clone()), ("argv", argv.clone())],
        );
        if let Err(error) = self.spawner.spawn(&command) {
            logging::error(
                "launch failed",
                &[
                    ("id", trimmed.to_string()),
                    ("mode", mode),
                    ("argv", argv),
                    ("error", error.to_string()),
                ],
            );
            return Err(error.into());
        }
        Ok(command)
    }

    pub fn executable(&self) -> PathBuf {
        resolve_executable(self.config.executable.as_deref(), &self.config.install_roots)
    }
}
