use axum::Json;
use axum::extract::{Query, State, rejection::QueryRejection};
use axum::http::{HeaderMap, header};
use tracing::debug;

use crate::api::dto::{token_request::TokenQuery, token_response::TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// POST /oauth/token
pub async fn issue_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    // An unparsable query string counts as no parameters at all; the
    // credential check still runs first.
    let query = match query {
        Ok(Query(pairs)) => TokenQuery::from_pairs(pairs),
        Err(rejection) => {
            debug!(error = %rejection, "unparsable token query");
            TokenQuery::default()
        }
    };

    let access_token = state
        .tokens
        .issue(authorization, &query.grant_type, &query.scope)
        .await?;

    Ok(Json(TokenResponse { access_token }))
}

/// GET /auth (OCI variant): replays the last issued token, empty if none.
pub async fn last_token(State(state): State<AppState>) -> Json<TokenResponse> {
    Json(TokenResponse {
        access_token: state.tokens.last_issued().await,
    })
}
