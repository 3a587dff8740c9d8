use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use usedcar_web::config::{LoggingSettings, Settings};
use usedcar_web::routes::{self, handle_form_payload_error, handle_query_payload_error, AppState};
use usedcar_web::services::Connector;
use usedcar_web::views::{Templates, Views};

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);
    info!("Starting used car lot web front end...");

    let templates = Templates::new().map_err(|e| {
        error!("Failed to compile templates: {:?}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    let views = Arc::new(Views::new(templates, settings.web.flash_cookie.clone()));

    let connector = Connector::from_settings(&settings.host);
    info!(
        "Host gateway {} (library {}, user {})",
        settings.host.endpoint,
        settings.host.library,
        if settings.host.user.is_empty() { "<none>" } else { settings.host.user.as_str() }
    );

    let app_state = AppState {
        connector: connector.clone(),
        views,
        user_id: settings.web.default_user.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let result = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::FormConfig::default().error_handler(handle_form_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
            .default_service(web::to(routes::not_found))
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    connector.disconnect();
    info!("Host connection closed");
    result
}
