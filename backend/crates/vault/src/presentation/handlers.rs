//! HTTP Handlers for Sensitive Data Endpoints
//!
//! Each handler follows the same sequence: parse and validate the input,
//! derive the client key, consult the endpoint's rate limiter, then hand
//! off to the store. Malformed requests are rejected before the limiter
//! is consulted and before any database connection is acquired.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use platform::client::client_key;
use platform::digest::ClearTextSecret;
use platform::rate_limit::FixedWindowLimiter;

use crate::application::store::SensitiveStore;
use crate::config::RateSettings;
use crate::domain::repository::SensitiveRepository;
use crate::domain::value_object::RecordTitle;
use crate::error::{VaultError, VaultResult};
use crate::presentation::dto::{
    FetchDataRequest, FetchDataResponse, InsertDataRequest, ResponseData, SensitiveRecordDto,
    UpdateDataRequest,
};

/// Success messages shared across handlers
const MSG_RETRIEVED: &str = "Data retrieved successfully";
const MSG_INSERTED: &str = "Data inserted successfully";
const MSG_UPDATED: &str = "Data updated successfully";
const MSG_DELETED: &str = "Data deleted successfully";

/// One limiter per endpoint class, keyed by client
pub struct EndpointLimits {
    /// List, create, and blind match
    pub collection: FixedWindowLimiter,
    /// Single-record routes addressed by id
    pub item: FixedWindowLimiter,
}

impl EndpointLimits {
    pub fn new(settings: &RateSettings) -> Self {
        Self {
            collection: FixedWindowLimiter::new(settings.collection.clone()),
            item: FixedWindowLimiter::new(settings.item.clone()),
        }
    }
}

/// Shared handler state
pub struct VaultAppState<R>
where
    R: SensitiveRepository,
{
    pub store: Arc<SensitiveStore<R>>,
    pub limits: Arc<EndpointLimits>,
}

impl<R> Clone for VaultAppState<R>
where
    R: SensitiveRepository,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            limits: Arc::clone(&self.limits),
        }
    }
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> VaultResult<T> {
    let Json(body) = payload.map_err(|e| VaultError::Validation(e.body_text()))?;
    Ok(body)
}

// ============================================================================
// Collection routes
// ============================================================================

/// GET / : list record metadata
pub async fn list_records<R>(
    State(state): State<VaultAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> VaultResult<impl IntoResponse>
where
    R: SensitiveRepository + Send + Sync + 'static,
{
    let key = client_key(&headers, Some(addr.ip()));
    state.limits.collection.check(&key)?;

    let records = state.store.list(&key).await?;
    let data: Vec<SensitiveRecordDto> = records.into_iter().map(Into::into).collect();

    Ok(Json(ResponseData::new(MSG_RETRIEVED, data)))
}

/// POST / : insert a new record
pub async fn create_record<R>(
    State(state): State<VaultAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<InsertDataRequest>, JsonRejection>,
) -> VaultResult<impl IntoResponse>
where
    R: SensitiveRepository + Send + Sync + 'static,
{
    let req = parse_body(payload)?;
    let title = RecordTitle::new(req.title)?;
    let secret = ClearTextSecret::new(req.pre_hash)?;

    let key = client_key(&headers, Some(addr.ip()));
    state.limits.collection.check(&key)?;

    let record = state.store.insert(&key, title, secret).await?;

    Ok((
        StatusCode::CREATED,
        Json(ResponseData::new(
            MSG_INSERTED,
            SensitiveRecordDto::from(record),
        )),
    ))
}

/// POST /fetch : blind-match a candidate against every stored digest
pub async fn match_records<R>(
    State(state): State<VaultAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<FetchDataRequest>, JsonRejection>,
) -> VaultResult<impl IntoResponse>
where
    R: SensitiveRepository + Send + Sync + 'static,
{
    let req = parse_body(payload)?;
    let candidate = ClearTextSecret::new(req.data)?;

    let key = client_key(&headers, Some(addr.ip()));
    state.limits.collection.check(&key)?;

    let titles = state.store.blind_match(&key, candidate).await?;

    // Bare body, no envelope: the match result is the whole answer
    Ok(Json(FetchDataResponse { titles }))
}

// ============================================================================
// Item routes
// ============================================================================

/// GET /{id} : fetch one record's metadata
pub async fn get_record<R>(
    State(state): State<VaultAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> VaultResult<impl IntoResponse>
where
    R: SensitiveRepository + Send + Sync + 'static,
{
    let key = client_key(&headers, Some(addr.ip()));
    state.limits.item.check(&key)?;

    let record = state.store.get(&key, id).await?;

    Ok(Json(ResponseData::new(
        MSG_RETRIEVED,
        SensitiveRecordDto::from(record),
    )))
}

/// PUT /{id} : update title and/or secret
pub async fn update_record<R>(
    State(state): State<VaultAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateDataRequest>, JsonRejection>,
) -> VaultResult<impl IntoResponse>
where
    R: SensitiveRepository + Send + Sync + 'static,
{
    let req = parse_body(payload)?;
    let title = req.title.map(RecordTitle::new).transpose()?;
    let secret = req.pre_hash.map(ClearTextSecret::new).transpose()?;
    if title.is_none() && secret.is_none() {
        return Err(VaultError::Validation(
            "No data provided to update".to_string(),
        ));
    }

    let key = client_key(&headers, Some(addr.ip()));
    state.limits.item.check(&key)?;

    let record = state.store.update(&key, id, title, secret).await?;

    Ok(Json(ResponseData::new(
        MSG_UPDATED,
        SensitiveRecordDto::from(record),
    )))
}

/// DELETE /{id} : delete one record
pub async fn delete_record<R>(
    State(state): State<VaultAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> VaultResult<impl IntoResponse>
where
    R: SensitiveRepository + Send + Sync + 'static,
{
    let key = client_key(&headers, Some(addr.ip()));
    state.limits.item.check(&key)?;

    state.store.delete(&key, id).await?;

    Ok(Json(ResponseData::<()>::message_only(MSG_DELETED)))
}
