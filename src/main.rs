use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use twinber::config::Settings;
use twinber::core::{Matcher, MatcherLimits};
use twinber::i18n::QuestionBank;
use twinber::routes::{self, AppState};
use twinber::services::{CacheManager, FirestoreClient, PostgresClient, TokenVerifier, UserDirectory};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_logging();

    info!("Starting Twinber matching service...");

    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;
    info!("Configuration loaded successfully");

    let bank = Arc::new(QuestionBank::load().map_err(|e| startup_error("Failed to load question bank", e))?);

    let firestore = Arc::new(
        FirestoreClient::new(&settings.firestore)
            .map_err(|e| startup_error("Failed to create Firestore client", e))?,
    );
    info!(
        "Firestore client initialized (project: {}, collection: {})",
        settings.firestore.project_id, settings.firestore.users_collection
    );

    let cache = Arc::new(
        CacheManager::new(&settings.cache)
            .await
            .map_err(|e| startup_error("Failed to connect to Redis", e))?,
    );
    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s)",
        settings.cache.l1_cache_size.unwrap_or(10_000),
        settings.cache.ttl_secs.unwrap_or(300)
    );

    let postgres = Arc::new(
        PostgresClient::new(&settings.database)
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );
    info!("PostgreSQL client initialized");

    let auth = Arc::new(
        TokenVerifier::new(&settings.auth, settings.admin.clone())
            .map_err(|e| startup_error("Failed to configure token verification", e))?,
    );
    info!("Token verification configured ({} admins)", settings.admin.emails.len());

    let matcher = Matcher::new(MatcherLimits {
        max_results: settings.matching.max_results,
    });

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    let app_state = AppState {
        users: Arc::new(UserDirectory::new(firestore, Some(cache))),
        postgres,
        auth,
        bank,
        matcher,
        settings: Arc::new(settings),
    };

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
