//! Reporting handlers for stock analytics and data export

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_any_role, CurrentUser};
use crate::models::UserRole;
use crate::services::reporting::ReportingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// Grouped counts of units in the manufacturer warehouse
pub async fn get_manufacturer_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;

    let service = ReportingService::new(state.db);
    let data = service.manufacturer_stock_report().await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        Ok((
            [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"manufacturer_stock.csv\"")],
            csv,
        ).into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Grouped counts of units in one dealer's stock
pub async fn get_dealer_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dealer_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    if !current_user.0.can_access_dealer(dealer_id) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ReportingService::new(state.db);
    let data = service.dealer_stock_report(dealer_id).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        Ok((
            [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"dealer_stock.csv\"")],
            csv,
        ).into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Network-wide stock snapshot
pub async fn get_network_overview(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;

    let service = ReportingService::new(state.db);
    let data = service.network_stock_overview().await?;
    Ok(Json(data))
}
