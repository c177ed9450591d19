use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::AppState;

/// Build the axum router with all Potlog endpoints.
pub fn build_router(state: AppState, allow_any_origin: bool) -> Router {
    let api = Router::new()
        .route("/health", get(handler::health_handler))
        .route("/sessions", post(handler::create_session))
        .route("/sessions/:code", get(handler::get_session))
        .route("/sessions/:code/players", post(handler::add_player))
        .route("/sessions/:code/rebuy", post(handler::rebuy))
        .route("/sessions/:code/settle", post(handler::settle))
        .route("/sessions/:code/reopen", post(handler::reopen))
        .route("/sessions/:code/debts/settle", post(handler::settle_debt))
        .route("/sessions/:code/diff", post(handler::diff))
        .route("/sessions/:code/preview", post(handler::preview))
        .route("/sessions/:code/transfers", post(handler::add_transfer))
        .route(
            "/sessions/:code/transfers/:transfer_id",
            delete(handler::remove_transfer),
        )
        .route("/users/:user_id/stats", get(handler::user_stats));

    let router = Router::new()
        .route("/health", get(handler::health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if allow_any_origin {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
