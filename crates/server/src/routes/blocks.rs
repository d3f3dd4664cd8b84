//! Block routes.
//!
//! - `POST /api/blocks/deposit`: deposit a slot at a given block number
//! - `POST /api/blocks/mine`: seal pending transfers into a block
//! - `GET  /api/blocks`: list blocks, ascending
//! - `GET  /api/blocks/:block_number`: fetch one block

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sidechain_chain::DepositRequest;
use sidechain_consensus::ValidationError;
use sidechain_core::{Block, Uint};

use super::{extract_json, wire_string};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/blocks", get(list_blocks))
        .route("/api/blocks/", get(list_blocks))
        .route("/api/blocks/deposit", post(deposit))
        .route("/api/blocks/mine", post(mine))
        .route("/api/blocks/:block_number", get(get_block))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositBody {
    #[serde(default, deserialize_with = "wire_string")]
    pub slot: String,
    #[serde(default, deserialize_with = "wire_string")]
    pub block_number: String,
    #[serde(default)]
    pub owner: String,
}

async fn deposit(
    State(state): State<AppState>,
    body: Result<Json<DepositBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Block>), AppError> {
    let body = extract_json(body)?;
    let request = DepositRequest {
        slot: body.slot,
        block_number: body.block_number,
        owner: body.owner,
    };
    let block = state.with_ledger(move |ledger| ledger.deposit(&request)).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

async fn mine(State(state): State<AppState>) -> Result<(StatusCode, Json<Block>), AppError> {
    let block = state.with_ledger(|ledger| ledger.mine()).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

async fn list_blocks(State(state): State<AppState>) -> Result<Json<Vec<Block>>, AppError> {
    let blocks = state.with_ledger(|ledger| ledger.list_blocks()).await?;
    Ok(Json(blocks))
}

async fn get_block(
    State(state): State<AppState>,
    Path(block_number): Path<String>,
) -> Result<Json<Block>, AppError> {
    let number: Uint = block_number
        .parse()
        .map_err(|_| ValidationError::InvalidBlockNumber)?;
    let block = state.with_ledger(move |ledger| ledger.get_block(&number)).await?;
    Ok(Json(block))
}
