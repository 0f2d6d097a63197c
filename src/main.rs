use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleet_master::config::{DatabaseConfig, EnvironmentConfig};
use fleet_master::database::{DatabaseConnection, FleetStore, MemoryStore, PgFleetStore};
use fleet_master::services::Credentials;
use fleet_master::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .init();

    info!("🚚 FleetMaster - API de gestión de flota");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    let store: Arc<dyn FleetStore> = match DatabaseConfig::from_env() {
        Some(db_config) => {
            let connection = match DatabaseConnection::new(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow!("Error de base de datos: {}", e));
                }
            };
            Arc::new(PgFleetStore::new(connection.pool().clone()))
        }
        None if config.is_production() => {
            return Err(anyhow!("DATABASE_URL must be set in production"));
        }
        None => {
            warn!("⚠️ DATABASE_URL no definido: usando almacén en memoria (los datos no persisten)");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config.clone());

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        let credentials = Credentials::new(username.as_str(), password.as_str());
        match state.accounts.ensure_admin(state.store.as_ref(), &credentials).await {
            Ok(true) => info!("👑 Cuenta Admin '{}' creada", username),
            Ok(false) => info!("👑 Cuenta Admin '{}' ya existía", username),
            Err(e) => {
                error!("❌ No se pudo crear la cuenta Admin '{}': {}", username, e);
                return Err(anyhow!("Admin seeding failed: {}", e));
            }
        }
    }

    let app = create_router(state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/login | /api/auth/register");
    info!("   CRUD /api/vehicles | /api/drivers | /api/logs");
    info!("   GET  /api/drivers/me");
    info!("   GET|POST /api/issues, PATCH /api/issues/:id/status");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
