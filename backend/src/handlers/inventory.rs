//! HTTP handlers for inventory allocation and recall

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    AllocateInput, AllocationResult, InventoryService, RecallInput, RecallResult, StockScope,
};
use crate::AppState;

/// Query parameters for the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub variant_id: Uuid,
    pub color: String,
    /// Omitted: count manufacturer stock
    pub dealer_id: Option<Uuid>,
}

/// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub variant_id: Uuid,
    pub color: String,
    pub dealer_id: Option<Uuid>,
    pub available: i64,
}

/// Allocate stock from the manufacturer warehouse against an approved
/// dealer request. Per-item failures ride inside the 200 response.
pub async fn allocate_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<AllocateInput>,
) -> AppResult<Json<AllocationResult>> {
    if !current_user.0.role.can_move_stock() {
        return Err(AppError::InsufficientPermissions);
    }

    let service = InventoryService::new(state.db);
    let result = service.allocate(request_id, input).await?;
    Ok(Json(result))
}

/// Recall a dealer's available stock back to the manufacturer warehouse
pub async fn recall_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<RecallInput>,
) -> AppResult<Json<RecallResult>> {
    if !current_user.0.role.can_move_stock() {
        return Err(AppError::InsufficientPermissions);
    }

    let service = InventoryService::new(state.db);
    let result = service.recall(request_id, input).await?;
    Ok(Json(result))
}

/// Count available units of a (variant, color) at a location
pub async fn get_availability(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let scope = match query.dealer_id {
        Some(dealer_id) => {
            if !current_user.0.can_access_dealer(dealer_id) {
                return Err(AppError::InsufficientPermissions);
            }
            StockScope::Dealer(dealer_id)
        }
        None => StockScope::Manufacturer,
    };

    let service = InventoryService::new(state.db);
    let available = service
        .count_available(scope, query.variant_id, &query.color)
        .await?;

    Ok(Json(AvailabilityResponse {
        variant_id: query.variant_id,
        color: query.color,
        dealer_id: query.dealer_id,
        available,
    }))
}
