//! HTTP handlers for the vehicle catalog and stock intake

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_any_role, CurrentUser};
use crate::models::{UnitLocation, UnitStatus, UserRole};
use crate::services::vehicle::{
    CreateVariantInput, RegisterUnitsInput, UnitFilter, UnitRecord, VariantRecord, VehicleService,
};
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// Create a vehicle variant
pub async fn create_variant(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateVariantInput>,
) -> AppResult<Json<VariantRecord>> {
    require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;
    let service = VehicleService::new(state.db);
    let variant = service.create_variant(input).await?;
    Ok(Json(variant))
}

/// Get a variant
pub async fn get_variant(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
) -> AppResult<Json<VariantRecord>> {
    let service = VehicleService::new(state.db);
    let variant = service.get_variant(variant_id).await?;
    Ok(Json(variant))
}

/// List variants
pub async fn list_variants(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<VariantRecord>>> {
    let service = VehicleService::new(state.db);
    let variants = service.list_variants().await?;
    Ok(Json(variants))
}

/// Register a batch of units into manufacturer stock
pub async fn register_units(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterUnitsInput>,
) -> AppResult<Json<Vec<UnitRecord>>> {
    require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;
    let service = VehicleService::new(state.db);
    let units = service.register_units(input).await?;
    Ok(Json(units))
}

/// Get a unit
pub async fn get_unit(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(unit_id): Path<Uuid>,
) -> AppResult<Json<UnitRecord>> {
    let service = VehicleService::new(state.db);
    let unit = service.get_unit(unit_id).await?;
    Ok(Json(unit))
}

/// Query parameters for listing units
#[derive(Debug, Deserialize)]
pub struct ListUnitsQuery {
    pub variant_id: Option<Uuid>,
    pub color: Option<String>,
    pub status: Option<UnitStatus>,
    pub location: Option<UnitLocation>,
    pub dealer_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List units with filters, paginated
pub async fn list_units(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListUnitsQuery>,
) -> AppResult<Json<PaginatedResponse<UnitRecord>>> {
    let mut filter = UnitFilter {
        variant_id: query.variant_id,
        color: query.color,
        status: query.status,
        location: query.location,
        dealer_id: query.dealer_id,
    };

    // Dealer-side users see only their own dealer's stock
    if let Some(own) = current_user.0.dealer_id {
        filter.dealer_id = Some(own);
    }

    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let service = VehicleService::new(state.db);
    let units = service.list_units(filter, pagination).await?;
    Ok(Json(units))
}

/// Mark a dealer-held unit as sold
pub async fn mark_unit_sold(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_id): Path<Uuid>,
) -> AppResult<Json<UnitRecord>> {
    let service = VehicleService::new(state.db);

    // Dealer-side staff may only sell out of their own stock
    let unit = service.get_unit(unit_id).await?;
    match unit.dealer_id {
        Some(dealer_id) if current_user.0.can_access_dealer(dealer_id) => {}
        Some(_) => return Err(AppError::InsufficientPermissions),
        None => {
            return Err(AppError::InvalidStateTransition(
                "Unit is not in dealer stock".to_string(),
            ))
        }
    }

    let unit = service.mark_unit_sold(unit_id).await?;
    Ok(Json(unit))
}
