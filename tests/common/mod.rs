#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use josekit::jwk::alg::rsa::RsaKeyPair;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tower::ServiceExt;

use registry_token_server::app::build_router;
use registry_token_server::config::ServerVariant;
use registry_token_server::services::auth::access::AccessEntry;
use registry_token_server::services::auth::jwt::{
    JwtTokenGenerator, SignError, TokenClaims, TokenGeneratorOptions, TokenSigner,
};
use registry_token_server::services::auth::last_token::LastTokenStore;
use registry_token_server::services::auth::token_service::{DEFAULT_TOKEN_TTL, TokenService};
use registry_token_server::state::AppState;

pub const MASTER_KEY: &str = "MASTERKEY";
pub const AUDIENCE: &str = "Authentication";
pub const ISSUER: &str = "Sample Issuer";

pub struct TestKey {
    pub private_pem: Vec<u8>,
    pub public_pem: Vec<u8>,
}

/// One throwaway RSA key per test binary.
pub fn test_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let pair = RsaKeyPair::generate(2048).unwrap();
        TestKey {
            private_pem: pair.to_pem_private_key(),
            public_pem: pair.to_pem_public_key(),
        }
    })
}

pub fn jwt_signer(add_kid_header: bool) -> JwtTokenGenerator {
    JwtTokenGenerator::new(
        &test_key().private_pem,
        TokenGeneratorOptions {
            issuer: Some(ISSUER.to_string()),
            audience: Some(AUDIENCE.to_string()),
            add_kid_header,
        },
    )
    .unwrap()
}

pub struct FailingSigner;

impl TokenSigner for FailingSigner {
    fn sign(&self, _: &[AccessEntry], _: Duration) -> Result<String, SignError> {
        Err(SignError::InvalidKey("signing key unavailable".into()))
    }
}

pub fn router_with(signer: Arc<dyn TokenSigner>, variant: ServerVariant) -> Router {
    let tokens = TokenService::new(
        signer,
        MASTER_KEY.to_string(),
        DEFAULT_TOKEN_TTL,
        Arc::new(LastTokenStore::new()),
    );
    build_router(AppState::new(Arc::new(tokens)), variant)
}

pub fn router(variant: ServerVariant) -> Router {
    router_with(Arc::new(jwt_signer(variant.is_oci())), variant)
}

pub fn token_request(authorization: Option<&str>, query: &str) -> Request<Body> {
    let mut builder = Request::post(format!("/oauth/token?{query}"));
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn decode_claims(token: &str) -> TokenClaims {
    let key = DecodingKey::from_rsa_pem(&test_key().public_pem).unwrap();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[AUDIENCE]);
    validation.set_issuer(&[ISSUER]);

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .unwrap()
        .claims
}
