use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

use timeclock::auth::pin::PinGate;
use timeclock::config::{Config, StoreBackend};
use timeclock::docs::ApiDoc;
use timeclock::document::{DocumentStore, JsonFileStore, MemoryStore, MySqlDocumentStore};
use timeclock::routes::{self, RateLimits};
use timeclock::service::{AttendanceService, EmployeeRoster, SystemClock};
use timeclock::utils::session_cache::SessionCache;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Timeclock is running"
}

async fn open_documents(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::File => {
            info!(dir = %config.data_dir, "Using JSON file documents");
            Arc::new(JsonFileStore::new(&config.data_dir))
        }
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORE_BACKEND=mysql")?;
            let store = MySqlDocumentStore::connect(url)
                .await
                .context("Failed to connect to database")?;
            store.ensure_schema().await.context("Failed to create documents table")?;
            info!("Using MySQL documents");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory documents, nothing will be persisted");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = %config.store_backend, "Server starting...");

    let documents = open_documents(&config).await?;
    let clock = Arc::new(SystemClock::new(config.utc_offset()?));
    let roster = EmployeeRoster::new(documents.clone());
    let service = AttendanceService::new(documents, roster.clone(), clock);
    let sessions = SessionCache::new(config.session_ttl());
    let pin_gate = PinGate::new(config.admin_pin.clone());
    let limits = RateLimits::from_config(&config)?;

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(service.clone()))
            .app_data(Data::new(roster.clone()))
            .app_data(Data::new(sessions.clone()))
            .app_data(Data::new(pin_gate.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limits))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
