use serde::{Deserialize, Serialize};

use crate::launcher::LaunchCommand;
use crate::model::{Mode, ProviderInfo, ResultMeta};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultSetRequest {
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubsearchRequest {
    #[serde(default)]
    pub previous_results: Vec<String>,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultMetasRequest {
    pub identifiers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivateRequest {
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterRequest {
    pub results: Vec<String>,
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultSetResponse {
    pub results: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultMetasResponse {
    pub metas: Vec<ResultMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivateResponse {
    pub mode: Mode,
    pub argv: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReloadResponse {
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    GetInitialResultSet(ResultSetRequest),
    GetSubsearchResultSet(SubsearchRequest),
    GetResultMetas(ResultMetasRequest),
    ActivateResult(ActivateRequest),
    FilterResults(FilterRequest),
    Describe,
    Reload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    ResultSet(ResultSetResponse),
    ResultMetas(ResultMetasResponse),
    Activated(ActivateResponse),
    Describe(ProviderInfo),
    Reloaded(ReloadResponse),
}

impl ActivateResponse {
    pub fn from_command(mode: Mode, command: &LaunchCommand) -> Self {
        Self {
            mode,
            argv: command.argv(),
        }
    }
}
