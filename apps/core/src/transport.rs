use serde::{Deserialize, Serialize};

use crate::contract::{
    ActivateResponse, CoreRequest, CoreResponse, ReloadResponse, ResultMetasResponse,
    ResultSetResponse,
};
use crate::engine::EngineError;
use crate::provider::{SearchProvider, ServiceError};

/// Written when a response cannot be serialized; the line must still be valid JSON
/// so the host's reader stays in sync.
const ENCODE_FAILURE: &str =
    r#"{"status":"err","error":{"code":"internal","message":"response encoding failed"}}"#;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    EntryNotFound,
    Launch,
    Config,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

pub fn handle_request(provider: &mut SearchProvider, request: CoreRequest) -> TransportResponse {
    match dispatch(provider, request) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_service_error(error),
        },
    }
}

pub fn handle_json(provider: &mut SearchProvider, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(provider, request),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    encode(&response)
}

fn encode(response: &TransportResponse) -> String {
    match serde_json::to_string(response) {
        Ok(line) => line,
        Err(error) => {
            let fallback = TransportResponse::Err {
                error: ErrorResponse {
                    code: ErrorCode::Internal,
                    message: error.to_string(),
                },
            };
            serde_json::to_string(&fallback).unwrap_or_else(|_| ENCODE_FAILURE.to_string())
        }
    }
}

fn dispatch(
    provider: &mut SearchProvider,
    request: CoreRequest,
) -> Result<CoreResponse, ServiceError> {
    match request {
        CoreRequest::GetInitialResultSet(request) => {
            Ok(CoreResponse::ResultSet(ResultSetResponse {
                results: provider.initial_result_set(&request.terms),
            }))
        }
        CoreRequest::GetSubsearchResultSet(request) => {
            Ok(CoreResponse::ResultSet(ResultSetResponse {
                results: provider.subsearch_result_set(&request.previous_results, &request.terms),
            }))
        }
        CoreRequest::GetResultMetas(request) => {
            Ok(CoreResponse::ResultMetas(ResultMetasResponse {
                metas: provider.result_metas(&request.identifiers)?,
            }))
        }
        CoreRequest::ActivateResult(request) => {
            let command = provider.activate_result(&request.identifier)?;
            Ok(CoreResponse::Activated(ActivateResponse::from_command(
                provider.mode(),
                &command,
            )))
        }
        CoreRequest::FilterResults(request) => Ok(CoreResponse::ResultSet(ResultSetResponse {
            results: provider.filter_results(&request.results, request.max_results),
        })),
        CoreRequest::Describe => Ok(CoreResponse::Describe(provider.info().clone())),
        CoreRequest::Reload => Ok(CoreResponse::Reloaded(ReloadResponse {
            entries: provider.reload(),
        })),
    }
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    match error {
        ServiceError::InvalidRequest(message) => ErrorResponse {
            code: ErrorCode::InvalidRequest,
            message,
        },
        ServiceError::Engine(EngineError::EntryNotFound(id)) => ErrorResponse {
            code: ErrorCode::EntryNotFound,
            message: id,
        },
        ServiceError::Launch(error) => ErrorResponse {
            code: ErrorCode::Launch,
            message: error.to_string(),
        },
        ServiceError::Config(message) => ErrorResponse {
            code: ErrorCode::Config,
            message,
        },
    }
}
