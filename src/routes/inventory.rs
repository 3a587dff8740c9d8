use crate::models::{InventoryQuery, Vehicle, KNOWN_STATUSES};
use crate::routes::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use std::collections::BTreeSet;
use tera::Context;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/inventory", web::get().to(inventory));
}

/// Sorted distinct non-empty makes and models for the filter dropdowns
pub fn filter_options(vehicles: &[Vehicle]) -> (Vec<String>, Vec<String>) {
    let makes: BTreeSet<&str> = vehicles
        .iter()
        .map(|v| v.make.as_str())
        .filter(|m| !m.is_empty())
        .collect();
    let models: BTreeSet<&str> = vehicles
        .iter()
        .map(|v| v.model.as_str())
        .filter(|m| !m.is_empty())
        .collect();

    (
        makes.into_iter().map(String::from).collect(),
        models.into_iter().map(String::from).collect(),
    )
}

/// Inventory listing page
///
/// GET /inventory?make=&model=&year_from=&year_to=&status=
async fn inventory(
    state: web::Data<AppState>,
    query: web::Query<InventoryQuery>,
    req: HttpRequest,
) -> HttpResponse {
    let filter = query.to_filter();
    tracing::debug!("Listing inventory with {:?}", filter);

    let vehicles = state.connector.list_vehicles(Some(&filter)).await;
    let all_vehicles = state.connector.list_vehicles(None).await;
    let (makes, models) = filter_options(&all_vehicles);

    let mut context = Context::new();
    context.insert("vehicles", &vehicles);
    context.insert("makes", &makes);
    context.insert("models", &models);
    context.insert("statuses", KNOWN_STATUSES);
    context.insert("filters", &query.into_inner());
    context.insert("selected_status", &filter.status);

    state.views.page(&req, "inventory.html", context)
}
