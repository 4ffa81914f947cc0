//! Route definitions for the ZenVit CRM API

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
        // Auth routes (public login/register, protected profile)
        .nest("/auth", auth_routes())
        // Demo data (development only)
        .route("/seed", post(handlers::seed_data))
        // Protected routes
        .nest("/products", product_routes())
        .nest("/stock", stock_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/purchases", purchase_routes())
        .nest("/customers", customer_routes())
        .nest("/orders", order_routes())
        .nest("/tasks", task_routes())
        .nest("/expenses", expense_routes())
        .nest("/reports", report_routes())
}

fn auth_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::deactivate_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route("/adjust", post(handlers::adjust_stock))
        .route("/movements", get(handlers::list_movements))
        .route(
            "/:product_id",
            get(handlers::get_stock).put(handlers::set_stock),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route("/:purchase_id", get(handlers::get_purchase))
        .route("/:purchase_id/receive", post(handlers::receive_purchase))
        .route("/:purchase_id/cancel", post(handlers::cancel_purchase))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route("/:customer_id/orders", get(handlers::list_customer_orders))
        .route(
            "/:customer_id/timeline",
            get(handlers::get_customer_timeline).post(handlers::add_customer_note),
        )
        .route(
            "/:customer_id/recompute",
            post(handlers::recompute_customer_stats),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_order_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/:task_id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn expense_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/:expense_id", axum::routing::delete(handlers::delete_expense))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/monthly/:year/:month", get(handlers::monthly_report))
        .route_layer(middleware::from_fn(auth_middleware))
}
