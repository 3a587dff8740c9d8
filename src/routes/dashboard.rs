use crate::models::{Amount, Vehicle, VehicleFilter, DEFAULT_STATUS, STATUS_SOLD};
use crate::routes::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tera::Context;

/// How far back the dashboard counts sales
pub const RECENT_SALES_DAYS: i64 = 30;
const DASHBOARD_LIST_LEN: usize = 5;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
}

/// Figures shown on the home page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub available_count: usize,
    pub sold_count: usize,
    pub total_value: Amount,
    pub recent_sales: Vec<Vehicle>,
    pub oldest_inventory: Vec<Vehicle>,
}

impl DashboardSummary {
    pub fn build(available: Vec<Vehicle>, mut sold: Vec<Vehicle>) -> Self {
        let total_value = available.iter().map(|v| v.asking_price).sum();

        // newest sale first, undated sales last
        sold.sort_by(|a, b| b.date_sold.cmp(&a.date_sold));
        let sold_count = sold.len();
        sold.truncate(DASHBOARD_LIST_LEN);

        let available_count = available.len();
        let mut oldest = available;
        oldest.sort_by_key(|v| (v.date_acquired.is_none(), v.date_acquired));
        oldest.truncate(DASHBOARD_LIST_LEN);

        Self {
            available_count,
            sold_count,
            total_value,
            recent_sales: sold,
            oldest_inventory: oldest,
        }
    }
}

/// Listing criteria for vehicles sold since `today - RECENT_SALES_DAYS`
pub fn recent_sales_filter(today: NaiveDate) -> VehicleFilter {
    let since = today - Duration::days(RECENT_SALES_DAYS);
    VehicleFilter {
        status: STATUS_SOLD.to_string(),
        date_sold_from: since.format("%Y-%m-%d").to_string(),
        ..VehicleFilter::default()
    }
}

/// Home page
async fn index(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let today = chrono::Local::now().date_naive();

    let available = state
        .connector
        .list_vehicles(Some(&VehicleFilter::with_status(DEFAULT_STATUS)))
        .await;
    let sold = state
        .connector
        .list_vehicles(Some(&recent_sales_filter(today)))
        .await;

    let summary = DashboardSummary::build(available, sold);
    tracing::debug!(
        "Dashboard: {} available, {} sold in the last {} days",
        summary.available_count,
        summary.sold_count,
        RECENT_SALES_DAYS
    );

    let mut context = Context::new();
    context.insert("available_count", &summary.available_count);
    context.insert("sold_count", &summary.sold_count);
    context.insert("total_value", &summary.total_value);
    context.insert("recent_sales", &summary.recent_sales);
    context.insert("oldest_inventory", &summary.oldest_inventory);

    state.views.page(&req, "index.html", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: i64, price_cents: i64, acquired: Option<&str>, sold: Option<&str>) -> Vehicle {
        Vehicle {
            vehicle_id: id,
            asking_price: Amount::from_cents(price_cents),
            date_acquired: acquired.and_then(|d| d.parse().ok()),
            date_sold: sold.and_then(|d| d.parse().ok()),
            ..Vehicle::default()
        }
    }

    #[test]
    fn test_summary_orders_and_limits() {
        let available = vec![
            vehicle(1, 100_00, Some("2024-03-01"), None),
            vehicle(2, 200_00, None, None),
            vehicle(3, 300_00, Some("2023-12-01"), None),
        ];
        let sold: Vec<Vehicle> = (0..7)
            .map(|i| vehicle(10 + i, 0, None, Some(&format!("2024-05-0{}", i + 1))))
            .collect();

        let summary = DashboardSummary::build(available, sold);
        assert_eq!(summary.available_count, 3);
        assert_eq!(summary.sold_count, 7);
        assert_eq!(summary.total_value, Amount::from_cents(600_00));
        assert_eq!(summary.recent_sales.len(), 5);
        assert_eq!(summary.recent_sales[0].vehicle_id, 16);

        let oldest: Vec<i64> = summary.oldest_inventory.iter().map(|v| v.vehicle_id).collect();
        assert_eq!(oldest, vec![3, 1, 2]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::build(vec![], vec![]);
        assert_eq!(summary, DashboardSummary::default());
    }

    #[test]
    fn test_recent_sales_filter() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let filter = recent_sales_filter(today);
        assert_eq!(filter.status, "SOLD");
        assert_eq!(filter.date_sold_from, "2024-02-14");
        assert_eq!(filter.make, "");
    }
}
