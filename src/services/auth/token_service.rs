use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::services::auth::access::parse_scope;
use crate::services::auth::jwt::TokenSigner;
use crate::services::auth::last_token::LastTokenStore;

pub const REQUIRED_GRANT_TYPE: &str = "client_credentials";
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Validates token requests and mints tokens through a [`TokenSigner`].
///
/// Checks run in order and stop at the first failure:
/// credential (401) -> grant type (400) -> scope (400) -> signing (500).
#[derive(Clone)]
pub struct TokenService {
    signer: Arc<dyn TokenSigner>,
    master_access_key: String,
    token_ttl: Duration,
    last_token: Arc<LastTokenStore>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(
        signer: Arc<dyn TokenSigner>,
        master_access_key: String,
        token_ttl: Duration,
        last_token: Arc<LastTokenStore>,
    ) -> Self {
        Self {
            signer,
            master_access_key,
            token_ttl,
            last_token,
        }
    }

    /// `authorization` is the raw header value (empty when absent).
    pub async fn issue(
        &self,
        authorization: &str,
        grant_type: &str,
        scope: &str,
    ) -> Result<String, AppError> {
        let credential = authorization
            .strip_prefix("Bearer ")
            .unwrap_or(authorization);

        if credential.as_bytes() != self.master_access_key.as_bytes() {
            warn!("rejected token request: bad access key");
            return Err(AppError::Unauthorized);
        }

        if grant_type != REQUIRED_GRANT_TYPE {
            debug!(grant_type, "rejected token request: unsupported grant type");
            return Err(AppError::bad_request(format!(
                "grant_type must equal {REQUIRED_GRANT_TYPE}"
            )));
        }

        let entry = parse_scope(scope).map_err(|e| {
            debug!(scope, "rejected token request: bad scope");
            AppError::bad_request(e.to_string())
        })?;

        let token = self.signer.sign(std::slice::from_ref(&entry), self.token_ttl)?;

        // Only a successfully signed token replaces the replayable one.
        self.last_token.record(&token).await;

        info!(
            repository = %entry.name,
            actions = ?entry.actions,
            "issued access token"
        );

        Ok(token)
    }

    pub async fn last_issued(&self) -> String {
        self.last_token.latest().await
    }
}
