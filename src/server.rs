//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: database, migrations, event
//! bus, notification listener, reminder scheduler, REST API and graceful
//! shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{
    create_event_bus, BookingPolicy, BookingService, EntryVerifier, EntryWindow,
    NotificationListener, NotificationTemplates, ReminderSchedule, ReminderScheduler,
    SharedEventBus,
};
use crate::config::AppConfig;
use crate::domain::{EventPublisher, RepositoryProvider};
use crate::infrastructure::{
    init_database, run_migrations, DatabaseConfig, JwtConfig, LogNotifier, RandomCodeGenerator,
    SeaOrmRepositoryProvider,
};
use crate::interfaces::http::middleware::AuthState;
use crate::interfaces::http::modules::bookings::BookingAppState;
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::create_api_router;
use crate::shared::{Clock, ShutdownCoordinator, ShutdownSignal, SystemClock};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running booking service.
///
/// ```rust,no_run
/// use meetbook::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Port the REST API is bound to
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    background: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Start the service.
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Connect to the database and run migrations
    /// 3. Start the notification listener and reminder scheduler
    /// 4. Start the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting Meetbook booking service...");

        let prometheus = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db_config = DatabaseConfig::from_settings(&app_cfg.database);
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            run_migrations(&db).await?;
            info!("Migrations completed");
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // ── Event Bus ──────────────────────────────────────────
        let event_bus = create_event_bus();
        let publisher: Arc<dyn EventPublisher> = event_bus.clone();
        info!("🔔 Event bus initialized");

        // ── Services ───────────────────────────────────────────
        let bookings = BookingService::new(
            repos.clone(),
            publisher.clone(),
            Arc::new(RandomCodeGenerator),
            clock.clone(),
            BookingPolicy::from_settings(&app_cfg.booking),
        );
        let entry = EntryVerifier::new(repos.clone(), EntryWindow::from_settings(&app_cfg.entry));

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background tasks ───────────────────────────────────
        let mut background = Vec::new();

        let listener = NotificationListener::new(
            repos.clone(),
            Arc::new(LogNotifier),
            NotificationTemplates::from_settings(&app_cfg.notification),
        );
        background.push(listener.start(&event_bus, shutdown_signal.clone()));

        if app_cfg.reminder.enabled {
            let scheduler = ReminderScheduler::new(
                repos.clone(),
                publisher,
                clock.clone(),
                ReminderSchedule::from_settings(&app_cfg.reminder),
            );
            background.push(scheduler.start(shutdown_signal.clone()));
        } else {
            info!("Reminder scheduler disabled by configuration");
        }

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(
            BookingAppState {
                bookings,
                entry,
                clock,
            },
            AuthState {
                jwt_config: JwtConfig::from_settings(&app_cfg.security),
                repos: repos.clone(),
            },
            HealthState {
                db: Some(db.clone()),
                started_at: Arc::new(Instant::now()),
            },
            prometheus,
        );

        let api_addr = format!("{}:{}", app_cfg.server.api_host, app_cfg.server.api_port);
        let tcp = tokio::net::TcpListener::bind(&api_addr).await?;
        let api_port = tcp.local_addr()?.port();
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(tcp, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Meetbook started.");

        Ok(Self {
            event_bus,
            repos,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
            background,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait until shutdown is triggered and every task has stopped,
    /// bounded by `server.shutdown_timeout`.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            background,
            ..
        } = self;

        let finished = shutdown
            .shutdown_with_cleanup(|| async move {
                info!("⏳ Waiting for server tasks to complete...");
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                for task in background {
                    if let Err(e) = task.await {
                        error!("Background task panicked: {}", e);
                    }
                }
            })
            .await;
        if !finished {
            warn!("Some tasks did not stop in time");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Meetbook shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down Meetbook...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can be installed once per process; later calls reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

/// Initialize tracing (logging) from the application config.
///
/// `RUST_LOG` takes precedence over `logging.level`. Call once at startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn starts_and_shuts_down_on_ephemeral_port() {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config.server.api_host = "127.0.0.1".to_string();
        config.server.api_port = 0;
        config.server.shutdown_timeout = 5;
        config.reminder.enabled = false;

        let handle = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
        })
        .await
        .unwrap();
        assert_ne!(handle.api_port, 0);
        assert!(handle.is_running());

        tokio::time::timeout(Duration::from_secs(10), handle.shutdown())
            .await
            .expect("shutdown hung");
    }
}
