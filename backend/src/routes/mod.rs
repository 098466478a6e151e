//! Route definitions for the Farm Ledger API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes; everything under `/api/v1` requires a signed-in user
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected_routes().route_layer(middleware::from_fn_with_state(state, auth_middleware)))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(handlers::list_profiles))
        .route("/profiles/me", get(handlers::get_my_profile))
        .route("/profiles/:profile_id", get(handlers::get_profile))
        .nest("/fields", field_routes())
        .nest("/lots", lot_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/bins", bin_routes())
        .nest("/inventory", inventory_routes())
        .nest("/sales", sale_routes())
        .route("/rpc/create_sale_atomic", post(handlers::create_sale))
        .nest("/buyers", buyer_routes())
        .nest("/works", work_routes())
        .nest("/expenses", expense_routes())
        .merge(catalog_routes())
        .nest("/master-data", master_data_routes())
        .nest("/reports", report_routes())
}

/// Field management routes
fn field_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_fields).post(handlers::create_field))
        .route(
            "/:field_id",
            get(handlers::get_field)
                .put(handlers::update_field)
                .delete(handlers::delete_field),
        )
}

/// Lot routes, including the two-step intake
fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lots).post(handlers::create_lot))
        .route("/intake", post(handlers::lot_intake))
        .route(
            "/:lot_id",
            get(handlers::get_lot)
                .put(handlers::update_lot)
                .delete(handlers::delete_lot),
        )
}

/// Warehouse routes
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route(
            "/:warehouse_id/bins",
            get(handlers::list_bins).post(handlers::create_bin),
        )
}

/// Bins across warehouses; new bins are created below their warehouse
fn bin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_all_bins))
        .route(
            "/:bin_id",
            get(handlers::get_bin)
                .put(handlers::update_bin)
                .delete(handlers::delete_bin),
        )
}

/// Inventory ledger routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route(
            "/movements/:movement_id",
            get(handlers::get_movement).delete(handlers::delete_movement),
        )
        .route("/stock", get(handlers::get_stock))
}

fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
}

fn buyer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_buyers).post(handlers::create_buyer))
        .route(
            "/:buyer_id",
            get(handlers::get_buyer)
                .put(handlers::update_buyer)
                .delete(handlers::delete_buyer),
        )
}

fn work_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_works).post(handlers::create_work))
        .route(
            "/:work_id",
            get(handlers::get_work)
                .put(handlers::update_work)
                .delete(handlers::delete_work),
        )
}

fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_expenses).post(handlers::create_expense))
        .route(
            "/:expense_id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
}

/// Read-only catalog routes
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/seasons", get(handlers::list_seasons))
        .route("/seasons/:season_id", get(handlers::get_season))
        .route("/crops", get(handlers::list_crops))
        .route("/crops/:crop_id", get(handlers::get_crop))
        .route("/crops/:crop_id/varieties", get(handlers::list_crop_varieties))
        .route("/varieties", get(handlers::list_varieties))
        .route("/varieties/:variety_id", get(handlers::get_variety))
        .route("/work-types", get(handlers::list_work_types))
        .route("/work-types/:work_type_id", get(handlers::get_work_type))
}

fn master_data_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_master_data))
        .route("/refresh", post(handlers::refresh_master_data))
}

/// Reporting routes; `?format=csv` switches to a CSV download
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/seasons/:season_id", get(handlers::get_season_report))
        .route("/stock", get(handlers::get_stock_report))
}
