/*
 * Responsibility
 * - Config -> signer/state -> Router
 * - Serve plain HTTP or TLS depending on the variant
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{AppEnv, Config, ServerVariant};
use crate::services::auth::{
    jwt::{JwtTokenGenerator, TokenGeneratorOptions},
    last_token::LastTokenStore,
    token_service::TokenService,
};
use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "info,registry_token_server=debug,tower_http=info";

/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Report panics through tracing; development aborts right after.
fn install_panic_hook(app_env: AppEnv) {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(%info, "token server panicked");

        if app_env.is_production() {
            previous(info);
        } else {
            process::abort();
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    install_panic_hook(config.app_env);

    tracing::info!(
        "starting token server ({:?} variant, {:?} mode) on {}",
        config.variant,
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, config.variant);

    match config.variant {
        ServerVariant::Plain => {
            let listener = tokio::net::TcpListener::bind(config.addr)
                .await
                .with_context(|| format!("failed to bind {}", config.addr))?;
            axum::serve(listener, app).await?;
        }
        ServerVariant::Oci => {
            let tls = RustlsConfig::from_pem_file(&config.public_cert_path, &config.private_key_path)
                .await
                .with_context(|| {
                    format!(
                        "failed to load TLS material ({}, {})",
                        config.public_cert_path.display(),
                        config.private_key_path.display()
                    )
                })?;
            axum_server::bind_rustls(config.addr, tls)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let signer = JwtTokenGenerator::from_key_file(
        &config.private_key_path,
        TokenGeneratorOptions {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            add_kid_header: config.add_kid_header,
        },
    )?;

    if let Some(kid) = signer.kid() {
        tracing::info!(kid, "signing tokens with key id header");
    }

    let tokens = TokenService::new(
        Arc::new(signer),
        config.master_access_key.clone(),
        config.token_ttl,
        Arc::new(LastTokenStore::new()),
    );

    Ok(AppState::new(Arc::new(tokens)))
}

pub fn build_router(state: AppState, variant: ServerVariant) -> Router {
    api::routes(variant)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
