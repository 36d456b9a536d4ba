//! HTTP handlers for the dealer directory

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_any_role, CurrentUser};
use crate::models::{DealerStatus, UserRole};
use crate::services::dealer::{CreateDealerInput, DealerRecord, DealerService, UpdateDealerInput};
use crate::AppState;

/// Query parameters for listing dealers
#[derive(Debug, Deserialize)]
pub struct ListDealersQuery {
    pub status: Option<DealerStatus>,
}

/// Body for changing a dealer's status
#[derive(Debug, Deserialize)]
pub struct SetDealerStatusInput {
    pub status: DealerStatus,
}

/// Register a dealer
pub async fn create_dealer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDealerInput>,
) -> AppResult<Json<DealerRecord>> {
    require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;
    let service = DealerService::new(state.db);
    let dealer = service.create_dealer(input).await?;
    Ok(Json(dealer))
}

/// Get a dealer
pub async fn get_dealer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(dealer_id): Path<Uuid>,
) -> AppResult<Json<DealerRecord>> {
    let service = DealerService::new(state.db);
    let dealer = service.get_dealer(dealer_id).await?;
    Ok(Json(dealer))
}

/// List dealers
pub async fn list_dealers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListDealersQuery>,
) -> AppResult<Json<Vec<DealerRecord>>> {
    let service = DealerService::new(state.db);
    let dealers = service.list_dealers(query.status).await?;
    Ok(Json(dealers))
}

/// Update dealer master data
pub async fn update_dealer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dealer_id): Path<Uuid>,
    Json(input): Json<UpdateDealerInput>,
) -> AppResult<Json<DealerRecord>> {
    require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;
    let service = DealerService::new(state.db);
    let dealer = service.update_dealer(dealer_id, input).await?;
    Ok(Json(dealer))
}

/// Change a dealer's operating status
pub async fn set_dealer_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dealer_id): Path<Uuid>,
    Json(input): Json<SetDealerStatusInput>,
) -> AppResult<Json<DealerRecord>> {
    require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;
    let service = DealerService::new(state.db);
    let dealer = service.set_status(dealer_id, input.status).await?;
    Ok(Json(dealer))
}
