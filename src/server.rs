//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database
//! and migrations, first-run bootstrap, the HTTP listener and graceful
//! shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::ApiKeyService;
use crate::config::AppConfig;
use crate::domain::{
    ApiKey, ApiKeyRepositoryInterface, CreateApiKeyDto, CreateUserDto, DomainResult,
    UserRepositoryInterface,
};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::{ApiKeyRepository, UserRepository};
use crate::infrastructure::init_database;
use crate::interfaces::http::create_api_router;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the admin user and an initial API key on an empty database
    /// (default: true).
    pub bootstrap: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            bootstrap: true,
        }
    }
}

/// Handle to a running service.
pub struct ServerHandle {
    local_addr: SocketAddr,
    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting API keys service...");

        let prometheus_handle = prometheus_handle();

        let db = init_database(&app_cfg.database_config()).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        if opts.bootstrap {
            if let Err(e) = bootstrap(&db, &app_cfg).await {
                error!("Bootstrap failed: {}", e);
            }
        }

        let jwt_config = app_cfg.jwt_config();
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        let router = create_api_router(db.clone(), jwt_config, prometheus_handle);

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("OpenAPI document at http://{}/v1/swagger_doc", local_addr);

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Wait for the server to drain after shutdown has been triggered, then
    /// close the database pool. Draining is bounded by
    /// `server.shutdown_timeout`.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            mut api_task,
            ..
        } = self;

        let drained = shutdown
            .cleanup_with_timeout(async {
                if let Err(e) = (&mut api_task).await {
                    error!("REST API server task panicked: {}", e);
                }
            })
            .await;
        if !drained {
            api_task.abort();
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("Shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down...");
        self.shutdown.signal().trigger();
        self.wait().await;
    }
}

/// The global recorder can be installed only once per process; later
/// starts reuse the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
                None
            }
        })
        .clone()
}

/// First-run setup: create the configured admin when there are no users,
/// and issue an API key for it when there are no keys. Returns the key
/// issued, if any.
pub async fn bootstrap(db: &DatabaseConnection, app_cfg: &AppConfig) -> DomainResult<Option<ApiKey>> {
    let users = UserRepository::new(db.clone());
    let api_keys = Arc::new(ApiKeyRepository::new(db.clone()));

    if users.count_users().await? == 0 {
        info!("Creating default admin user...");
        let admin = users
            .create_user(CreateUserDto {
                username: app_cfg.admin.username.clone(),
                email: app_cfg.admin.email.clone(),
            })
            .await?;
        info!("Default admin created: {}", admin.email);
    }

    if api_keys.count_api_keys().await? > 0 {
        return Ok(None);
    }

    let Some(admin) = users.get_user_by_username(&app_cfg.admin.username).await? else {
        warn!(
            "No API keys exist and admin user '{}' was not found; skipping initial key",
            app_cfg.admin.username
        );
        return Ok(None);
    };

    let api_key = ApiKeyService::new(api_keys)
        .create_api_key(&admin, CreateApiKeyDto { user_id: admin.id })
        .await?;
    warn!(
        access_token = %api_key.access_token,
        "Initial API key issued for '{}'. Store it now, it is not logged again.",
        admin.username
    );
    Ok(Some(api_key))
}

/// Initialize tracing from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
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
    use crate::infrastructure::database::test_database;

    #[tokio::test]
    async fn bootstrap_creates_admin_and_initial_key_once() {
        let db = test_database().await;
        let config = AppConfig::default();

        let issued = bootstrap(&db, &config).await.unwrap().unwrap();

        let users = UserRepository::new(db.clone());
        let admin = users
            .get_user_by_username(&config.admin.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(issued.user_id, admin.id);
        assert!(issued.access_token.starts_with("ak_"));

        assert!(bootstrap(&db, &config).await.unwrap().is_none());
        assert_eq!(users.count_users().await.unwrap(), 1);
        assert_eq!(
            ApiKeyRepository::new(db).count_api_keys().await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn bootstrap_skips_key_when_admin_is_absent() {
        let db = test_database().await;
        UserRepository::new(db.clone())
            .create_user(CreateUserDto {
                username: "someone".into(),
                email: "someone@example.com".into(),
            })
            .await
            .unwrap();

        let issued = bootstrap(&db, &AppConfig::default()).await.unwrap();

        assert!(issued.is_none());
        assert_eq!(
            ApiKeyRepository::new(db).count_api_keys().await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn server_starts_serves_and_shuts_down() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.database.url = "sqlite::memory:".into();
        config.database.max_connections = 1;

        let handle = ServerHandle::start(ServerOptions {
            config,
            ..ServerOptions::default()
        })
        .await
        .unwrap();
        assert_ne!(handle.local_addr().port(), 0);

        handle.shutdown().await;
    }
}
