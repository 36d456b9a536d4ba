//! HTTP handlers for dealer stock requests

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_any_role, CurrentUser};
use crate::models::{RequestStatus, UserRole};
use crate::services::request::{
    CreateRequestInput, RequestRecord, RequestService, RequestWithItems,
};
use crate::AppState;

/// Query parameters for listing requests
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub dealer_id: Option<Uuid>,
    pub status: Option<RequestStatus>,
}

/// Body for moving a request through its lifecycle
#[derive(Debug, Deserialize)]
pub struct UpdateRequestStatusInput {
    pub status: RequestStatus,
}

/// Create a stock request
pub async fn create_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateRequestInput>,
) -> AppResult<Json<RequestWithItems>> {
    if !current_user.0.role.can_create_request() {
        return Err(AppError::InsufficientPermissions);
    }
    // Dealer-side managers may only raise requests for their own dealer
    if !current_user.0.can_access_dealer(input.dealer_id) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = RequestService::new(state.db);
    let request = service.create_request(current_user.0.user_id, input).await?;
    Ok(Json(request))
}

/// Get a request with line items
pub async fn get_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<RequestWithItems>> {
    let service = RequestService::new(state.db);
    let request = service.get_request(request_id).await?;

    if !current_user.0.can_access_dealer(request.request.dealer_id) {
        return Err(AppError::InsufficientPermissions);
    }

    Ok(Json(request))
}

/// List requests
pub async fn list_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<Json<Vec<RequestRecord>>> {
    // Dealer-side users see only their own dealer's requests
    let dealer_id = match current_user.0.dealer_id {
        Some(own) => Some(own),
        None => query.dealer_id,
    };

    let service = RequestService::new(state.db);
    let requests = service.list_requests(dealer_id, query.status).await?;
    Ok(Json(requests))
}

/// Approve, reject, deliver or cancel a request. Approval and rejection
/// are manufacturer-side decisions.
pub async fn update_request_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<UpdateRequestStatusInput>,
) -> AppResult<Json<RequestWithItems>> {
    match input.status {
        RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Delivered => {
            require_any_role(&current_user.0, &[UserRole::Admin, UserRole::EvmStaff])?;
        }
        RequestStatus::Cancelled => {
            let service = RequestService::new(state.db.clone());
            let request = service.get_request(request_id).await?;
            if !current_user.0.can_access_dealer(request.request.dealer_id) {
                return Err(AppError::InsufficientPermissions);
            }
        }
        RequestStatus::Pending => {
            return Err(AppError::Validation {
                field: "status".to_string(),
                message: "Requests cannot be moved back to pending".to_string(),
            });
        }
    }

    let service = RequestService::new(state.db);
    let request = service.update_status(request_id, input.status).await?;
    Ok(Json(request))
}
