// Unit tests for the used car lot front end

use chrono::NaiveDate;
use usedcar_web::config::{endpoint_for_host, Settings};
use usedcar_web::models::record::parse_timestamp;
use usedcar_web::models::{
    Amount, AmountError, InventoryQuery, ProfitSummary, Record, SalesMetrics, Vehicle,
    VehicleFilter, VehicleHistory,
};
use usedcar_web::routes::dashboard::{recent_sales_filter, DashboardSummary};
use usedcar_web::routes::inventory::filter_options;
use usedcar_web::services::vehcrud::{filter_param, vehicle_data_param};
use usedcar_web::toolkit::{ParamType, ParamValue, ToolkitError};
use usedcar_web::views::{format_currency, format_date};

fn sample_vehicle() -> Vehicle {
    Vehicle {
        vehicle_id: 12,
        make: "Chevrolet".to_string(),
        model: "Malibu".to_string(),
        trim: "LT".to_string(),
        year: 2018,
        vin: "1G1ZD5ST4JF123456".to_string(),
        color: "Blue".to_string(),
        odometer: 61_250,
        condition_rating: 3,
        acquisition_price: Amount::from_cents(1_100_000),
        asking_price: Amount::from_cents(1_399_500),
        date_acquired: NaiveDate::from_ymd_opt(2024, 1, 20),
        date_sold: None,
        status: "AVAILABLE".to_string(),
        notes: "One owner".to_string(),
        last_updated: NaiveDate::from_ymd_opt(2024, 1, 20).and_then(|d| d.and_hms_opt(8, 15, 0)),
    }
}

#[test]
fn test_vehicle_record_round_trip() {
    let vehicle = sample_vehicle();
    assert_eq!(Vehicle::from_fields(&vehicle.to_fields()), vehicle);
}

#[test]
fn test_vehicle_round_trip_keeps_host_microseconds() {
    let vehicle = Vehicle {
        last_updated: parse_timestamp("2024-01-15-10.30.00.123456"),
        ..sample_vehicle()
    };
    assert!(vehicle.last_updated.is_some());
    assert_eq!(Vehicle::from_fields(&vehicle.to_fields()), vehicle);

    let entry = VehicleHistory {
        event_date: parse_timestamp("2024-02-01-14.00.00.000001"),
        ..VehicleHistory::default()
    };
    assert_eq!(VehicleHistory::from_fields(&entry.to_fields()), entry);
}

#[test]
fn test_history_record_round_trip() {
    let entry = VehicleHistory {
        history_id: 3,
        vehicle_id: 12,
        event_type: "PRICE_CHANGE".to_string(),
        event_date: NaiveDate::from_ymd_opt(2024, 2, 1).and_then(|d| d.and_hms_opt(14, 0, 0)),
        old_status: "AVAILABLE".to_string(),
        new_status: "AVAILABLE".to_string(),
        old_price: Amount::from_cents(1_399_500),
        new_price: Amount::from_cents(1_329_500),
        user_id: "WEBUSER".to_string(),
        notes: String::new(),
    };
    assert_eq!(VehicleHistory::from_fields(&entry.to_fields()), entry);
}

#[test]
fn test_summary_records_serialize_amounts_as_strings() {
    let summary = ProfitSummary {
        total_vehicles: 2,
        total_profit: Amount::from_cents(450_050),
        ..ProfitSummary::default()
    };
    let fields = summary.to_fields();
    assert_eq!(fields["total_profit"], serde_json::json!("4500.50"));
    assert_eq!(ProfitSummary::from_fields(&fields), summary);

    let metrics = SalesMetrics::from_fields(&serde_json::Map::new());
    assert_eq!(metrics, SalesMetrics::default());
}

#[test]
fn test_amount_parsing() {
    assert_eq!("1,234.5".parse::<Amount>().unwrap().cents(), 123_450);
    assert_eq!("$99".parse::<Amount>().unwrap(), Amount::from(99));
    assert_eq!("-0.015".parse::<Amount>().unwrap().cents(), -2);
    assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
    assert!(matches!("12.3.4".parse::<Amount>(), Err(AmountError::Invalid(_))));
}

#[test]
fn test_amount_display() {
    let amount = Amount::from_cents(123_456_789);
    assert_eq!(amount.to_string(), "1234567.89");
    assert_eq!(amount.currency(), "$1,234,567.89");
    assert_eq!(Amount::from_cents(-5).currency(), "-$0.05");
}

#[test]
fn test_type_codes() {
    assert_eq!(ParamType::chars(50).to_string(), "50A");
    assert_eq!(ParamType::int().to_string(), "10i0");
    assert_eq!(ParamType::packed(10, 2).to_string(), "10p2");
    assert_eq!("10p2".parse::<ParamType>().unwrap(), ParamType::packed(10, 2));
    assert_eq!("17a".parse::<ParamType>().unwrap(), ParamType::chars(17));
    assert!("".parse::<ParamType>().is_err());
    assert!("10q2".parse::<ParamType>().is_err());
}

#[test]
fn test_render_limits() {
    let money = ParamType::packed(10, 2);
    assert_eq!(
        money.render("Price", &ParamValue::from(Amount::from_cents(12_345_678))).unwrap(),
        "123456.78"
    );
    // 10 digits with 2 decimals leaves 8 for the whole part
    assert!(matches!(
        money.render("Price", &ParamValue::from(Amount::from(100_000_000))),
        Err(ToolkitError::InvalidParam { .. })
    ));

    assert_eq!(
        ParamType::chars(5).render("Status", &ParamValue::from("AVAILABLE")).unwrap(),
        "AVAIL"
    );
    assert!(ParamType::int().render("Year", &ParamValue::from("abc")).is_err());
}

#[test]
fn test_vehicle_data_layout() {
    let ds = vehicle_data_param(&sample_vehicle(), true);
    let names: Vec<&str> = ds.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "VehicleId", "Make", "Model", "Trim", "Year", "VIN", "Color", "Odometer",
            "ConditionRating", "AcquisitionPrice", "AskingPrice", "DateAcquired", "DateSold",
            "Status", "Notes",
        ]
    );
}

#[test]
fn test_filter_layout() {
    let ds = filter_param(&VehicleFilter::with_status("SOLD"));
    assert_eq!(ds.name, "Filter");
    assert_eq!(ds.fields.len(), 11);
    assert_eq!(ds.fields[4].name, "Status");
}

#[test]
fn test_inventory_query_defaults_to_available() {
    let query = InventoryQuery::default();
    assert_eq!(query.to_filter().status, "AVAILABLE");

    let any = InventoryQuery {
        status: Some(String::new()),
        year_from: "2015".to_string(),
        year_to: "2O20".to_string(),
        ..InventoryQuery::default()
    };
    let filter = any.to_filter();
    assert_eq!(filter.status, "");
    assert_eq!(filter.year_from, 2015);
    assert_eq!(filter.year_to, 0);
}

#[test]
fn test_dashboard_summary() {
    let mut cheap = sample_vehicle();
    cheap.asking_price = Amount::from_cents(500_000);
    let summary = DashboardSummary::build(vec![sample_vehicle(), cheap], vec![]);
    assert_eq!(summary.total_value, Amount::from_cents(1_899_500));
    assert!(summary.recent_sales.is_empty());

    let filter = recent_sales_filter(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(filter.date_sold_from, "2023-12-11");
}

#[test]
fn test_filter_options_are_sorted_and_distinct() {
    let mut other = sample_vehicle();
    other.make = "Audi".to_string();
    let (makes, models) = filter_options(&[sample_vehicle(), other, sample_vehicle()]);
    assert_eq!(makes, vec!["Audi", "Chevrolet"]);
    assert_eq!(models, vec!["Malibu"]);
}

#[test]
fn test_template_filters() {
    assert_eq!(format_currency(&serde_json::json!("13995.00")), "$13,995.00");
    assert_eq!(format_date("2024-12-31"), "12/31/2024");
    assert_eq!(format_date("2024-12-31-09.15.00.000000"), "12/31/2024");
}

#[test]
fn test_endpoint_for_host() {
    assert_eq!(
        endpoint_for_host("ibmi.example.com"),
        "http://ibmi.example.com/cgi-bin/xmlcgi.pgm"
    );
    assert_eq!(
        endpoint_for_host("https://gw.example.com/xmlcgi"),
        "https://gw.example.com/xmlcgi"
    );
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.server.port, 5000);
    assert_eq!(settings.host.library, "USEDCAR");
    assert_eq!(settings.host.database, "*LOCAL");
    assert_eq!(settings.web.default_user, "WEBUSER");
}
