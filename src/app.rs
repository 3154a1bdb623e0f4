/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config → TokenVerifier → AppState → Router
 * - Middleware order (outermost first): CORS → http (request id, trace, limits) →
 *   security headers → bearer auth → routes
 * - axum::serve()
 */
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::build_token_verifier;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG wins if set, e.g.
    // RUST_LOG=info,okta_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr may not be collected; always report through tracing.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so the panic is noticed.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(AppError::from)?;
    axum::serve(listener, app).await.map_err(AppError::from)?;

    Ok(())
}

pub async fn build_state(config: &Config) -> Result<AppState, AppError> {
    let auth = build_token_verifier(&config.auth)?;

    // Not fatal: the first request retries the fetch.
    if let Err(err) = auth.warm_up().await {
        tracing::warn!(error = %err, "could not load signing keys at startup");
    }

    Ok(AppState::new(auth))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = middleware::auth::access::apply(api::routes(), state.clone()).with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::http::apply(router, config);
    middleware::cors::apply(router, config)
}
