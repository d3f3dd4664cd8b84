//! Transaction routes.
//!
//! - `POST /api/transactions/create`: validate and queue a transfer
//! - `GET  /api/transactions/:hash`: fetch a transaction by content hash

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sidechain_chain::TransferRequest;
use sidechain_core::{Hash, Transaction};

use super::{extract_json, wire_string};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/transactions/create", post(create_transaction))
        .route("/api/transactions/:hash", get(get_transaction))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionBody {
    #[serde(default, deserialize_with = "wire_string")]
    pub slot: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default, deserialize_with = "wire_string")]
    pub block_spent: String,
    #[serde(default)]
    pub signature: String,
}

impl From<CreateTransactionBody> for TransferRequest {
    fn from(body: CreateTransactionBody) -> Self {
        TransferRequest {
            slot: body.slot,
            owner: body.owner,
            recipient: body.recipient,
            hash: body.hash,
            block_spent: body.block_spent,
            signature: body.signature,
        }
    }
}

async fn create_transaction(
    State(state): State<AppState>,
    body: Result<Json<CreateTransactionBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let request = TransferRequest::from(extract_json(body)?);
    let tx = state
        .with_ledger(move |ledger| ledger.submit_transaction(&request))
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<Transaction>, AppError> {
    let hash = Hash::from_hex(&hash).map_err(|_| AppError::BadRequest("invalid hash".into()))?;
    let tx = state.with_ledger(move |ledger| ledger.get_transaction(&hash)).await?;
    Ok(Json(tx))
}
