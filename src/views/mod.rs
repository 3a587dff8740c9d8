// Page rendering and flash messages
pub mod flash;
pub mod templates;

pub use flash::{FlashLevel, FlashMessage};
pub use templates::{format_currency, format_date, Templates};

use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse};
use tera::Context;

/// Renders pages and carries flash messages across redirects
pub struct Views {
    templates: Templates,
    flash_cookie: String,
}

impl Views {
    pub fn new(templates: Templates, flash_cookie: impl Into<String>) -> Self {
        Self {
            templates,
            flash_cookie: flash_cookie.into(),
        }
    }

    /// Render a page with any pending flash messages
    pub fn page(&self, req: &HttpRequest, template: &str, context: Context) -> HttpResponse {
        self.page_with(req, template, context, Vec::new(), StatusCode::OK)
    }

    /// Render a page, adding `messages` to those left by the previous response
    pub fn page_with(
        &self,
        req: &HttpRequest,
        template: &str,
        mut context: Context,
        messages: Vec<FlashMessage>,
        status: StatusCode,
    ) -> HttpResponse {
        let mut all = flash::read(req, &self.flash_cookie);
        let consumed = !all.is_empty();
        all.extend(messages);
        context.insert("messages", &all);

        match self.templates.render(template, &context) {
            Ok(html) => {
                let mut builder = HttpResponse::build(status);
                builder.content_type("text/html; charset=utf-8");
                if consumed {
                    builder.cookie(flash::removal(&self.flash_cookie));
                }
                builder.body(html)
            }
            Err(e) => {
                tracing::error!("Failed to render {}: {:?}", template, e);
                self.error_page(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Redirect, leaving `messages` for the next page
    pub fn redirect(&self, location: &str, messages: Vec<FlashMessage>) -> HttpResponse {
        let mut builder = HttpResponse::SeeOther();
        builder.insert_header((header::LOCATION, location));
        if !messages.is_empty() {
            builder.cookie(flash::cookie(&self.flash_cookie, &messages));
        }
        builder.finish()
    }

    /// Render the 404 or 500 page without touching flash state
    pub fn error_page(&self, status: StatusCode) -> HttpResponse {
        let template = if status == StatusCode::NOT_FOUND {
            "404.html"
        } else {
            "500.html"
        };

        let mut context = Context::new();
        context.insert("messages", &Vec::<FlashMessage>::new());

        match self.templates.render(template, &context) {
            Ok(html) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(html),
            Err(e) => {
                tracing::error!("Failed to render {}: {:?}", template, e);
                HttpResponse::build(status)
                    .content_type("text/plain; charset=utf-8")
                    .body(status.canonical_reason().unwrap_or("Error"))
            }
        }
    }
}
