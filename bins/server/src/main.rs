//! LeaveDesk API Server
//!
//! Main entry point for the LeaveDesk backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leavedesk_api::{AppState, create_router};
use leavedesk_core::balance::LeavePolicy;
use leavedesk_core::storage::{StorageConfig, StorageService};
use leavedesk_db::connect_with;
use leavedesk_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leavedesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_secs: i64::try_from(config.jwt.access_token_expiry_secs)?,
    });

    // Certificates are optional; the rest of the API works without them
    let storage = match StorageConfig::from_settings(&config.storage)
        .and_then(StorageService::from_config)
    {
        Ok(service) => {
            info!(provider = %config.storage.provider, "Certificate storage configured");
            Some(Arc::new(service))
        }
        Err(e) => {
            warn!(error = %e, "Certificate storage unavailable");
            None
        }
    };

    let policy = LeavePolicy::from(config.leave_policy);
    info!(
        annual_paid_days = policy.annual_paid_days,
        annual_sick_days = policy.annual_sick_days,
        "Leave policy loaded"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
        policy,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
