//! Management and ingestion handlers.
//!
//! - `GET  /v1/identities`                         -> `["domain:deployment=..", ...]`
//! - `GET  /v1/attributes?identity=KEY`            -> `{"name": {"value":..,"timestamp":..}}`
//! - `GET  /v1/attribute?identity=KEY&name=NAME`   -> `{"value":..,"timestamp":..}`
//! - `POST /v1/samples` (one sample or an array)   -> per-outcome counts

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use lastvalue_core::MetricSample;

use crate::app_state::AppState;
use crate::facade::BatchSummary;
use crate::transport::error::{not_found, ApiError};
use crate::transport::principal::Caller;

#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    pub identity: String,
}

#[derive(Debug, Deserialize)]
pub struct AttributeQuery {
    pub identity: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SampleBatch {
    One(MetricSample),
    Many(Vec<MetricSample>),
}

impl SampleBatch {
    fn into_vec(self) -> Vec<MetricSample> {
        match self {
            SampleBatch::One(s) => vec![s],
            SampleBatch::Many(v) => v,
        }
    }
}

pub async fn list_identities(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<Response, ApiError> {
    let ids = state.facade().list_identities(&principal)?;
    Ok(Json(ids).into_response())
}

pub async fn list_attributes(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Query(q): Query<IdentityQuery>,
) -> Result<Response, ApiError> {
    match state.facade().list_attributes(&principal, &q.identity)? {
        Some(attrs) => Ok(Json(attrs).into_response()),
        None => Ok(not_found("identity not found")),
    }
}

pub async fn read_attribute(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Query(q): Query<AttributeQuery>,
) -> Result<Response, ApiError> {
    match state.facade().read_attribute(&principal, &q.identity, &q.name)? {
        Some(v) => Ok(Json(v).into_response()),
        None => Ok(not_found("attribute not found")),
    }
}

/// Invalid samples are counted and skipped; an unauthorized caller is
/// rejected before any sample is looked at, even for an empty batch.
pub async fn ingest(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(batch): Json<SampleBatch>,
) -> Result<Json<BatchSummary>, ApiError> {
    let summary = state.facade().write_batch(&principal, &batch.into_vec())?;
    Ok(Json(summary))
}
