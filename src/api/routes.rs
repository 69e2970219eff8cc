/*
 * Responsibility
 * - URL layout of the token server
 * - /auth only exists in the OCI variant
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    health::health,
    token::{issue_token, last_token},
};
use crate::config::ServerVariant;
use crate::state::AppState;

pub fn routes(variant: ServerVariant) -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/oauth/token", post(issue_token));

    match variant {
        ServerVariant::Plain => router,
        ServerVariant::Oci => router.route("/auth", get(last_token)),
    }
}
