//! Route definitions for the EV Dealer Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - user management
        .nest("/users", user_routes())
        // Protected routes - dealer directory
        .nest("/dealers", dealer_routes())
        // Protected routes - vehicle catalog and stock intake
        .nest("/vehicles", vehicle_routes())
        // Protected routes - dealer stock requests
        .nest("/requests", request_routes())
        // Protected routes - allocation and recall
        .nest("/inventory", inventory_routes())
        // Protected routes - stock reports
        .nest("/reports", report_routes())
}

/// Authentication routes (public, except /me)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route(
            "/me",
            get(handlers::me).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// User management routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_user))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dealer directory routes (protected)
fn dealer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_dealers).post(handlers::create_dealer))
        .route(
            "/:dealer_id",
            get(handlers::get_dealer).put(handlers::update_dealer),
        )
        .route("/:dealer_id/status", put(handlers::set_dealer_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Vehicle catalog routes (protected)
fn vehicle_routes() -> Router<AppState> {
    Router::new()
        // Variants
        .route("/variants", get(handlers::list_variants).post(handlers::create_variant))
        .route("/variants/:variant_id", get(handlers::get_variant))
        // Units
        .route("/units", get(handlers::list_units).post(handlers::register_units))
        .route("/units/:unit_id", get(handlers::get_unit))
        .route("/units/:unit_id/sell", post(handlers::mark_unit_sold))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dealer stock request routes (protected)
fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_requests).post(handlers::create_request))
        .route("/:request_id", get(handlers::get_request))
        .route("/:request_id/status", put(handlers::update_request_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Allocation and recall routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/allocate/:request_id", post(handlers::allocate_stock))
        .route("/recall/:request_id", post(handlers::recall_stock))
        .route("/availability", get(handlers::get_availability))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock report routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/manufacturer-stock", get(handlers::get_manufacturer_stock_report))
        .route("/dealers/:dealer_id/stock", get(handlers::get_dealer_stock_report))
        .route("/network-overview", get(handlers::get_network_overview))
        .route_layer(middleware::from_fn(auth_middleware))
}
