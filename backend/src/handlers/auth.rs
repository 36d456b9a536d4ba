//! HTTP handlers for authentication and user management

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::{require_any_role, CurrentUser};
use crate::models::UserRole;
use crate::services::auth::{
    AuthService, AuthTokens, CreateUserInput, RegisterAdminInput, RegisterResponse, UserView,
};
use crate::AppState;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Current user info response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: uuid::Uuid,
    pub role: UserRole,
    pub dealer_id: Option<uuid::Uuid>,
}

/// Bootstrap the first admin account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterAdminInput>,
) -> AppResult<Json<RegisterResponse>> {
    let service = AuthService::new(state.db, &state.config);
    let response = service.register_initial_admin(input).await?;
    Ok(Json(response))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(&input.email, &input.password).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for new tokens
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.refresh_token(&input.refresh_token).await?;
    Ok(Json(tokens))
}

/// Create a user account (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<UserView>> {
    require_any_role(&current_user.0, &[UserRole::Admin])?;
    let service = AuthService::new(state.db, &state.config);
    let user = service.create_user(input).await?;
    Ok(Json(user))
}

/// Identity of the calling user
pub async fn me(current_user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: current_user.0.user_id,
        role: current_user.0.role,
        dealer_id: current_user.0.dealer_id,
    })
}
