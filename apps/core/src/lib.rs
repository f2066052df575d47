pub mod config;
pub mod contract;
pub mod engine;
pub mod ibases;
pub mod launcher;
pub mod logging;
pub mod model;
pub mod provider;
pub mod runtime;
pub mod search;
pub mod store;
pub mod transport;
pub mod watcher;
