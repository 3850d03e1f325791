use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod fleet;
pub mod live;
pub mod state;
pub mod trips;
pub mod users;
pub mod wallets;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(users::routes())
        .merge(fleet::routes())
        .merge(trips::routes())
        .merge(wallets::routes())
        .merge(live::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
