use crate::models::record::{
    date_value, get_amount, get_date, get_int, get_string, get_timestamp, timestamp_value,
    FieldMap, Record,
};
use crate::models::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status a vehicle starts in and the inventory page filters by
pub const DEFAULT_STATUS: &str = "AVAILABLE";
pub const STATUS_SOLD: &str = "SOLD";

/// Statuses offered by the status form
pub const KNOWN_STATUSES: &[&str] = &["AVAILABLE", "PENDING", "HOLD", "SOLD"];

/// Vehicle inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: i64,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub year: i32,
    pub vin: String,
    pub color: String,
    pub odometer: i64,
    pub condition_rating: i32,
    pub acquisition_price: Amount,
    pub asking_price: Amount,
    pub date_acquired: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,
    pub status: String,
    pub notes: String,
    pub last_updated: Option<NaiveDateTime>,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            vehicle_id: 0,
            make: String::new(),
            model: String::new(),
            trim: String::new(),
            year: 0,
            vin: String::new(),
            color: String::new(),
            odometer: 0,
            condition_rating: 0,
            acquisition_price: Amount::ZERO,
            asking_price: Amount::ZERO,
            date_acquired: None,
            date_sold: None,
            status: DEFAULT_STATUS.to_string(),
            notes: String::new(),
            last_updated: None,
        }
    }
}

impl Vehicle {
    pub fn is_sold(&self) -> bool {
        self.status == STATUS_SOLD
    }

    /// Display title, e.g. `2019 Honda Civic EX`
    pub fn title(&self) -> String {
        let mut title = format!("{} {} {}", self.year, self.make, self.model);
        if !self.trim.is_empty() {
            title.push(' ');
            title.push_str(&self.trim);
        }
        title
    }
}

impl Record for Vehicle {
    fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("vehicle_id".into(), self.vehicle_id.into());
        map.insert("make".into(), self.make.clone().into());
        map.insert("model".into(), self.model.clone().into());
        map.insert("trim".into(), self.trim.clone().into());
        map.insert("year".into(), self.year.into());
        map.insert("vin".into(), self.vin.clone().into());
        map.insert("color".into(), self.color.clone().into());
        map.insert("odometer".into(), self.odometer.into());
        map.insert("condition_rating".into(), self.condition_rating.into());
        map.insert("acquisition_price".into(), self.acquisition_price.to_string().into());
        map.insert("asking_price".into(), self.asking_price.to_string().into());
        map.insert("date_acquired".into(), date_value(self.date_acquired));
        map.insert("date_sold".into(), date_value(self.date_sold));
        map.insert("status".into(), self.status.clone().into());
        map.insert("notes".into(), self.notes.clone().into());
        map.insert("last_updated".into(), timestamp_value(self.last_updated));
        map
    }

    fn from_fields(fields: &FieldMap) -> Self {
        let status = match fields.get("status") {
            Some(Value::String(s)) => s.clone(),
            _ => DEFAULT_STATUS.to_string(),
        };

        Self {
            vehicle_id: get_int(fields, "vehicle_id"),
            make: get_string(fields, "make"),
            model: get_string(fields, "model"),
            trim: get_string(fields, "trim"),
            year: get_int(fields, "year") as i32,
            vin: get_string(fields, "vin"),
            color: get_string(fields, "color"),
            odometer: get_int(fields, "odometer"),
            condition_rating: get_int(fields, "condition_rating") as i32,
            acquisition_price: get_amount(fields, "acquisition_price"),
            asking_price: get_amount(fields, "asking_price"),
            date_acquired: get_date(fields, "date_acquired"),
            date_sold: get_date(fields, "date_sold"),
            status,
            notes: get_string(fields, "notes"),
            last_updated: get_timestamp(fields, "last_updated"),
        }
    }
}

/// One entry of a vehicle's audit trail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleHistory {
    pub history_id: i64,
    pub vehicle_id: i64,
    pub event_type: String,
    pub event_date: Option<NaiveDateTime>,
    pub old_status: String,
    pub new_status: String,
    pub old_price: Amount,
    pub new_price: Amount,
    pub user_id: String,
    pub notes: String,
}

impl Record for VehicleHistory {
    fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("history_id".into(), self.history_id.into());
        map.insert("vehicle_id".into(), self.vehicle_id.into());
        map.insert("event_type".into(), self.event_type.clone().into());
        map.insert("event_date".into(), timestamp_value(self.event_date));
        map.insert("old_status".into(), self.old_status.clone().into());
        map.insert("new_status".into(), self.new_status.clone().into());
        map.insert("old_price".into(), self.old_price.to_string().into());
        map.insert("new_price".into(), self.new_price.to_string().into());
        map.insert("user_id".into(), self.user_id.clone().into());
        map.insert("notes".into(), self.notes.clone().into());
        map
    }

    fn from_fields(fields: &FieldMap) -> Self {
        Self {
            history_id: get_int(fields, "history_id"),
            vehicle_id: get_int(fields, "vehicle_id"),
            event_type: get_string(fields, "event_type"),
            event_date: get_timestamp(fields, "event_date"),
            old_status: get_string(fields, "old_status"),
            new_status: get_string(fields, "new_status"),
            old_price: get_amount(fields, "old_price"),
            new_price: get_amount(fields, "new_price"),
            user_id: get_string(fields, "user_id"),
            notes: get_string(fields, "notes"),
        }
    }
}

/// Profit figures over a date range of sales
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub total_vehicles: i64,
    pub total_revenue: Amount,
    pub total_cost: Amount,
    pub total_profit: Amount,
    pub average_profit: Amount,
    pub average_days_to_sell: i64,
}

impl Record for ProfitSummary {
    fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("total_vehicles".into(), self.total_vehicles.into());
        map.insert("total_revenue".into(), self.total_revenue.to_string().into());
        map.insert("total_cost".into(), self.total_cost.to_string().into());
        map.insert("total_profit".into(), self.total_profit.to_string().into());
        map.insert("average_profit".into(), self.average_profit.to_string().into());
        map.insert("average_days_to_sell".into(), self.average_days_to_sell.into());
        map
    }

    fn from_fields(fields: &FieldMap) -> Self {
        Self {
            total_vehicles: get_int(fields, "total_vehicles"),
            total_revenue: get_amount(fields, "total_revenue"),
            total_cost: get_amount(fields, "total_cost"),
            total_profit: get_amount(fields, "total_profit"),
            average_profit: get_amount(fields, "average_profit"),
            average_days_to_sell: get_int(fields, "average_days_to_sell"),
        }
    }
}

/// Value of the stock currently on the lot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryValue {
    pub total_vehicles: i64,
    pub total_value: Amount,
    pub average_value: Amount,
    pub oldest_vehicle_days: i64,
    pub average_days_in_inventory: i64,
}

impl Record for InventoryValue {
    fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("total_vehicles".into(), self.total_vehicles.into());
        map.insert("total_value".into(), self.total_value.to_string().into());
        map.insert("average_value".into(), self.average_value.to_string().into());
        map.insert("oldest_vehicle_days".into(), self.oldest_vehicle_days.into());
        map.insert(
            "average_days_in_inventory".into(),
            self.average_days_in_inventory.into(),
        );
        map
    }

    fn from_fields(fields: &FieldMap) -> Self {
        Self {
            total_vehicles: get_int(fields, "total_vehicles"),
            total_value: get_amount(fields, "total_value"),
            average_value: get_amount(fields, "average_value"),
            oldest_vehicle_days: get_int(fields, "oldest_vehicle_days"),
            average_days_in_inventory: get_int(fields, "average_days_in_inventory"),
        }
    }
}

/// Sales figures for one month or one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesMetrics {
    pub period: String,
    pub vehicles_sold: i64,
    pub total_revenue: Amount,
    pub total_profit: Amount,
    pub average_profit: Amount,
    pub average_days_to_sell: i64,
}

impl Record for SalesMetrics {
    fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("period".into(), self.period.clone().into());
        map.insert("vehicles_sold".into(), self.vehicles_sold.into());
        map.insert("total_revenue".into(), self.total_revenue.to_string().into());
        map.insert("total_profit".into(), self.total_profit.to_string().into());
        map.insert("average_profit".into(), self.average_profit.to_string().into());
        map.insert("average_days_to_sell".into(), self.average_days_to_sell.into());
        map
    }

    fn from_fields(fields: &FieldMap) -> Self {
        Self {
            period: get_string(fields, "period"),
            vehicles_sold: get_int(fields, "vehicles_sold"),
            total_revenue: get_amount(fields, "total_revenue"),
            total_profit: get_amount(fields, "total_profit"),
            average_profit: get_amount(fields, "average_profit"),
            average_days_to_sell: get_int(fields, "average_days_to_sell"),
        }
    }
}

/// Criteria for the vehicle listing
///
/// Zero and empty values mean "no constraint" to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleFilter {
    pub make: String,
    pub model: String,
    pub year_from: i32,
    pub year_to: i32,
    pub status: String,
    pub date_acquired_from: String,
    pub date_acquired_to: String,
    pub date_sold_from: String,
    pub date_sold_to: String,
    pub price_from: Amount,
    pub price_to: Amount,
}

impl VehicleFilter {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }
}

impl Record for VehicleFilter {
    fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("make".into(), self.make.clone().into());
        map.insert("model".into(), self.model.clone().into());
        map.insert("year_from".into(), self.year_from.into());
        map.insert("year_to".into(), self.year_to.into());
        map.insert("status".into(), self.status.clone().into());
        map.insert("date_acquired_from".into(), self.date_acquired_from.clone().into());
        map.insert("date_acquired_to".into(), self.date_acquired_to.clone().into());
        map.insert("date_sold_from".into(), self.date_sold_from.clone().into());
        map.insert("date_sold_to".into(), self.date_sold_to.clone().into());
        map.insert("price_from".into(), self.price_from.to_string().into());
        map.insert("price_to".into(), self.price_to.to_string().into());
        map
    }

    fn from_fields(fields: &FieldMap) -> Self {
        Self {
            make: get_string(fields, "make"),
            model: get_string(fields, "model"),
            year_from: get_int(fields, "year_from") as i32,
            year_to: get_int(fields, "year_to") as i32,
            status: get_string(fields, "status"),
            date_acquired_from: get_string(fields, "date_acquired_from"),
            date_acquired_to: get_string(fields, "date_acquired_to"),
            date_sold_from: get_string(fields, "date_sold_from"),
            date_sold_to: get_string(fields, "date_sold_to"),
            price_from: get_amount(fields, "price_from"),
            price_to: get_amount(fields, "price_to"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_defaults() {
        let vehicle = Vehicle::from_fields(&FieldMap::new());
        assert_eq!(vehicle.status, "AVAILABLE");
        assert_eq!(vehicle.vehicle_id, 0);
        assert!(vehicle.date_acquired.is_none());
        assert_eq!(vehicle, Vehicle::default());
    }

    #[test]
    fn test_vehicle_title() {
        let vehicle = Vehicle {
            year: 2019,
            make: "Honda".into(),
            model: "Civic".into(),
            ..Vehicle::default()
        };
        assert_eq!(vehicle.title(), "2019 Honda Civic");

        let with_trim = Vehicle { trim: "EX".into(), ..vehicle };
        assert_eq!(with_trim.title(), "2019 Honda Civic EX");
    }

    #[test]
    fn test_null_status_defaults_to_available() {
        let mut fields = FieldMap::new();
        fields.insert("status".into(), Value::Null);
        assert_eq!(Vehicle::from_fields(&fields).status, DEFAULT_STATUS);
    }
}
