use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use backoffice_api::{create_router, AppState, Repositories};
use backoffice_infrastructure::{
    create_pool, run_migrations, MemoryStore, PgInvitationRepository, PgMembershipRepository,
    PgOrganizationRepository, PgProjectRepository, PgProviderRepository, PgUserProfileRepository,
    PgUserRepository,
};
use backoffice_shared::config::{AppConfig, DatabaseSettings, StorageBackend};
use backoffice_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry; the guard flushes file logs on drop
    let _log_guard = init_telemetry(&config.logging)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    // Storage
    let repos = build_repositories(&config.database).await?;
    let state = AppState::new(
        repos,
        chrono::Duration::hours(config.organization.invitation_ttl_hours),
    );

    // Build router
    let app = create_router(state, Duration::from_secs(config.app.request_timeout_secs));

    // Start server
    let addr = config.app.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn build_repositories(settings: &DatabaseSettings) -> anyhow::Result<Repositories> {
    match settings.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            let store = MemoryStore::new();
            Ok(Repositories {
                projects: Arc::new(store.projects()),
                providers: Arc::new(store.providers()),
                organizations: Arc::new(store.organizations()),
                memberships: Arc::new(store.memberships()),
                invitations: Arc::new(store.invitations()),
                users: Arc::new(store.users()),
                user_profiles: Arc::new(store.user_profiles()),
            })
        }
        StorageBackend::Postgres => {
            let url = settings
                .url
                .as_deref()
                .context("database.url is required for the postgres backend")?;

            info!("Connecting to database...");
            let pool = create_pool(url, settings).await.context("failed to connect to database")?;
            if settings.run_migrations {
                run_migrations(&pool).await.context("failed to run migrations")?;
            }

            Ok(Repositories {
                projects: Arc::new(PgProjectRepository::new(pool.clone())),
                providers: Arc::new(PgProviderRepository::new(pool.clone())),
                organizations: Arc::new(PgOrganizationRepository::new(pool.clone())),
                memberships: Arc::new(PgMembershipRepository::new(pool.clone())),
                invitations: Arc::new(PgInvitationRepository::new(pool.clone())),
                users: Arc::new(PgUserRepository::new(pool.clone())),
                user_profiles: Arc::new(PgUserProfileRepository::new(pool)),
            })
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
