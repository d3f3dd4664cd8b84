//! Slot routes.
//!
//! - `GET /api/slots/:slot`: slot owner and state
//! - `GET /api/slots/:slot/history`: latest and previous mined transactions

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use sidechain_chain::SlotHistory;
use sidechain_consensus::ValidationError;
use sidechain_core::{Slot, Uint};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/slots/:slot", get(get_slot))
        .route("/api/slots/:slot/history", get(get_history))
}

fn parse_slot(raw: &str) -> Result<Uint, AppError> {
    Ok(raw.parse().map_err(|_| ValidationError::InvalidSlot)?)
}

async fn get_slot(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<Slot>, AppError> {
    let slot = parse_slot(&slot)?;
    let record = state.with_ledger(move |ledger| ledger.get_slot(&slot)).await?;
    Ok(Json(record))
}

async fn get_history(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<SlotHistory>, AppError> {
    let slot = parse_slot(&slot)?;
    let history = state.with_ledger(move |ledger| ledger.slot_history(&slot)).await?;
    Ok(Json(history))
}
