// Route exports
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod reports;
pub mod vehicles;

use crate::services::Connector;
use crate::views::Views;
use actix_web::http::StatusCode;
use actix_web::{error, web, HttpRequest, HttpResponse, ResponseError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub connector: Connector,
    pub views: Arc<Views>,
    /// User id recorded by the host for changes made through the site
    pub user_id: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .configure(dashboard::configure)
        .configure(inventory::configure)
        .configure(vehicles::configure)
        .configure(reports::configure);
}

/// Fallback for unknown routes
pub async fn not_found(state: web::Data<AppState>) -> HttpResponse {
    state.views.error_page(StatusCode::NOT_FOUND)
}

/// Plain error for request payloads that cannot be decoded at all
#[derive(Debug)]
pub struct PayloadError {
    pub message: String,
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PayloadError {}

impl ResponseError for PayloadError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::BadRequest()
            .content_type("text/plain; charset=utf-8")
            .body(self.message.clone())
    }
}

/// Handle form payload errors
pub fn handle_form_payload_error(err: error::UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Form payload error on {}: {}", req.path(), err);
    PayloadError {
        message: format!("Invalid form submission: {}", err),
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    PayloadError {
        message: format!("Invalid query: {}", err),
    }
    .into()
}
