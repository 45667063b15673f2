//! Request / Response DTOs
//!
//! Wire shapes for the sensitive-data endpoints. Every success body is a
//! `ResponseData` envelope with a human-readable message and an optional
//! payload; secret material never appears in any response shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::SensitiveRecord;

/// Uniform success envelope
#[derive(Debug, Serialize)]
pub struct ResponseData<T>
where
    T: Serialize,
{
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ResponseData<T>
where
    T: Serialize,
{
    pub fn new(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            data: Some(data),
        }
    }

    pub fn message_only(message: &str) -> Self {
        Self {
            message: message.to_string(),
            data: None,
        }
    }
}

/// Body for `POST /`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertDataRequest {
    pub title: String,
    /// The plaintext secret before digesting
    #[serde(alias = "sensitiveData")]
    pub pre_hash: String,
}

/// Body for `PUT /{id}`; both fields optional, at least one required
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDataRequest {
    pub title: Option<String>,
    #[serde(alias = "sensitiveData")]
    pub pre_hash: Option<String>,
}

/// Body for `POST /fetch`
#[derive(Debug, Deserialize)]
pub struct FetchDataRequest {
    pub data: String,
}

/// Titles of records whose digest matched the candidate
#[derive(Debug, Serialize)]
pub struct FetchDataResponse {
    pub titles: Vec<String>,
}

/// Record metadata as exposed over the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveRecordDto {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SensitiveRecord> for SensitiveRecordDto {
    fn from(record: SensitiveRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
