//! Studyplan - A calendar-based study planner

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studyplan::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxResourceRepository, SqlxStudySessionRepository},
    },
    services::{
        reminder::{ReminderNotifier, ReminderSweep},
        EmailService, LogNotifier, ResourceService, StudySessionService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studyplan=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting study planner...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let resource_repo = SqlxResourceRepository::boxed(pool.clone());
    let session_repo = SqlxStudySessionRepository::boxed(pool.clone());

    // Initialize services
    let resource_service = Arc::new(ResourceService::new(resource_repo.clone()));
    let session_service = Arc::new(StudySessionService::new(
        session_repo.clone(),
        resource_repo,
    ));

    // Start the reminder sweep with the configured notifier
    if config.reminder.enabled {
        let notifier: Arc<dyn ReminderNotifier> = if config.email.enabled {
            Arc::new(EmailService::new(
                &config.email,
                config.reminder.recipient.clone(),
            )?)
        } else {
            tracing::info!("Email disabled; reminders will be logged only");
            Arc::new(LogNotifier)
        };

        let sweep = Arc::new(ReminderSweep::new(
            session_repo,
            notifier,
            config.reminder.clone(),
        ));
        sweep.spawn();
        tracing::info!(
            "Reminder sweep started (every {}s, {}min lookahead)",
            config.reminder.interval_secs,
            config.reminder.lookahead_minutes
        );
    } else {
        tracing::info!("Reminder sweep disabled");
    }

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        resource_service,
        session_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close the store handle before exiting
    pool.close().await;
    tracing::info!("Server closed");

    Ok(())
}

/// Resolve on ctrl-c or SIGTERM so the server can drain and the pool
/// can be closed cleanly.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
