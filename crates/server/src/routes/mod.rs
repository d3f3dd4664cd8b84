//! HTTP routes.
//!
//! - `/api/blocks/*` deposits, mining and block reads
//! - `/api/transactions/*` transfer submission and lookup
//! - `/api/slots/*` slot state and mined history

pub mod blocks;
pub mod slots;
pub mod transactions;

use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Deserializer};

/// Unwrap a JSON body, turning extractor rejections into 400 responses.
pub(crate) fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// A numeric field sent either as a JSON number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireValue {
    Text(String),
    Number(serde_json::Number),
}

/// Deserialize a field into its raw textual form; parsing is the ledger's job.
pub(crate) fn wire_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<WireValue>::deserialize(deserializer)? {
        Some(WireValue::Text(text)) => text,
        Some(WireValue::Number(number)) => number.to_string(),
        None => String::new(),
    })
}
