use crate::models::{PriceAdjustmentForm, ReportsQuery};
use crate::routes::AppState;
use crate::views::FlashMessage;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Datelike;
use tera::Context;

/// Years covered by the yearly metrics table, current year included
pub const YEARLY_REPORT_SPAN: i32 = 5;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/reports", web::get().to(reports))
        .route("/reports/price-adjustment", web::post().to(bulk_price_adjustment));
}

/// First and last year of the yearly metrics table
pub fn yearly_range(current_year: i32) -> (i32, i32) {
    (current_year - (YEARLY_REPORT_SPAN - 1), current_year)
}

/// Reports page
///
/// GET /reports?start_date=&end_date=&year=
async fn reports(
    state: web::Data<AppState>,
    query: web::Query<ReportsQuery>,
    req: HttpRequest,
) -> HttpResponse {
    let current_year = chrono::Local::now().year();
    let mut messages = Vec::new();

    let (start_date, end_date) = query.date_range().unwrap_or_else(|e| {
        messages.push(FlashMessage::error(e.to_string()));
        (None, None)
    });
    let year = query.year_or(current_year).unwrap_or_else(|e| {
        messages.push(FlashMessage::error(e.to_string()));
        current_year
    });
    let (first_year, last_year) = yearly_range(current_year);

    let profit_summary = state
        .connector
        .calculate_profit_summary(start_date, end_date)
        .await;
    let inventory_value = state.connector.calculate_inventory_value().await;
    let monthly_metrics = state.connector.get_monthly_sales_metrics(year).await;
    let yearly_metrics = state
        .connector
        .get_yearly_sales_metrics(first_year, last_year)
        .await;

    let mut context = Context::new();
    context.insert("profit_summary", &profit_summary);
    context.insert("inventory_value", &inventory_value);
    context.insert("monthly_metrics", &monthly_metrics);
    context.insert("yearly_metrics", &yearly_metrics);
    context.insert("year", &year);
    context.insert("filters", &query.into_inner());

    state
        .views
        .page_with(&req, "reports.html", context, messages, StatusCode::OK)
}

/// Bulk price adjustment of aged stock
///
/// POST /reports/price-adjustment
async fn bulk_price_adjustment(
    state: web::Data<AppState>,
    form: web::Form<PriceAdjustmentForm>,
) -> HttpResponse {
    let message = match form.parse() {
        Ok((days, percentage)) => {
            let adjusted = state
                .connector
                .apply_bulk_price_adjustment(days, percentage, &state.user_id)
                .await;
            FlashMessage::success(format!(
                "Adjusted prices of {} vehicles in stock over {} days",
                adjusted, days
            ))
        }
        Err(e) => FlashMessage::error(format!("Error adjusting prices: {}", e)),
    };

    state.views.redirect("/reports", vec![message])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yearly_range() {
        assert_eq!(yearly_range(2024), (2020, 2024));
    }
}
