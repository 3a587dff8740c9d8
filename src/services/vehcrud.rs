use crate::models::record::{date_param, parse_date, parse_timestamp};
use crate::models::{Vehicle, VehicleFilter, VehicleHistory, DEFAULT_STATUS};
use crate::services::connector::{
    counted_rows, Connector, COLOR, DATE, EVENT_TYPE, INT, MONEY, NAME, NOTES, STATUS,
    TIMESTAMP, USER_ID, VEHCRUD, VEHCRUD_SUCCESS, VIN,
};
use crate::toolkit::{DataParam, Direction, OutputMap, ProcedureCall, StructParam};
use chrono::NaiveDate;

/// Largest result array the list procedures return
pub const MAX_RESULTS: u32 = 999;

/// Vehicle data structure as sent to AddVehicle / UpdateVehicle
///
/// `include_id` adds the leading VehicleId field used by updates.
pub fn vehicle_data_param(vehicle: &Vehicle, include_id: bool) -> StructParam {
    let mut ds = StructParam::new("VehicleData", Direction::In);
    if include_id {
        ds = ds.with("VehicleId", INT, vehicle.vehicle_id);
    }

    ds.with("Make", NAME, &vehicle.make)
        .with("Model", NAME, &vehicle.model)
        .with("Trim", NAME, &vehicle.trim)
        .with("Year", INT, vehicle.year)
        .with("VIN", VIN, &vehicle.vin)
        .with("Color", COLOR, &vehicle.color)
        .with("Odometer", INT, vehicle.odometer)
        .with("ConditionRating", INT, vehicle.condition_rating)
        .with("AcquisitionPrice", MONEY, vehicle.acquisition_price)
        .with("AskingPrice", MONEY, vehicle.asking_price)
        .with("DateAcquired", DATE, date_param(vehicle.date_acquired))
        .with("DateSold", DATE, date_param(vehicle.date_sold))
        .with("Status", STATUS, &vehicle.status)
        .with("Notes", NOTES, &vehicle.notes)
}

/// Output layout of a full vehicle record, single or repeated
fn vehicle_out_param(name: &str, dim: Option<u32>) -> StructParam {
    let mut ds = StructParam::new(name, Direction::Out);
    if let Some(dim) = dim {
        ds = ds.dim(dim);
    }

    ds.out("VehicleId", INT)
        .out("Make", NAME)
        .out("Model", NAME)
        .out("Trim", NAME)
        .out("Year", INT)
        .out("VIN", VIN)
        .out("Color", COLOR)
        .out("Odometer", INT)
        .out("ConditionRating", INT)
        .out("AcquisitionPrice", MONEY)
        .out("AskingPrice", MONEY)
        .out("DateAcquired", DATE)
        .out("DateSold", DATE)
        .out("Status", STATUS)
        .out("Notes", NOTES)
        .out("LastUpdated", TIMESTAMP)
}

pub fn filter_param(filter: &VehicleFilter) -> StructParam {
    StructParam::new("Filter", Direction::In)
        .with("Make", NAME, &filter.make)
        .with("Model", NAME, &filter.model)
        .with("YearFrom", INT, filter.year_from)
        .with("YearTo", INT, filter.year_to)
        .with("Status", STATUS, &filter.status)
        .with("DateAcquiredFrom", DATE, &filter.date_acquired_from)
        .with("DateAcquiredTo", DATE, &filter.date_acquired_to)
        .with("DateSoldFrom", DATE, &filter.date_sold_from)
        .with("DateSoldTo", DATE, &filter.date_sold_to)
        .with("PriceFrom", MONEY, filter.price_from)
        .with("PriceTo", MONEY, filter.price_to)
}

/// Map one vehicle data structure back into a record
pub fn vehicle_from_row(row: &OutputMap) -> Vehicle {
    Vehicle {
        vehicle_id: row.int_or_default("VehicleId"),
        make: row.string_or_default("Make"),
        model: row.string_or_default("Model"),
        trim: row.string_or_default("Trim"),
        year: row.int_or_default("Year") as i32,
        vin: row.string_or_default("VIN"),
        color: row.string_or_default("Color"),
        odometer: row.int_or_default("Odometer"),
        condition_rating: row.int_or_default("ConditionRating") as i32,
        acquisition_price: row.amount_or_default("AcquisitionPrice"),
        asking_price: row.amount_or_default("AskingPrice"),
        date_acquired: row.text("DateAcquired").and_then(parse_date),
        date_sold: row.text("DateSold").and_then(parse_date),
        status: row
            .text("Status")
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        notes: row.string_or_default("Notes"),
        last_updated: row.text("LastUpdated").and_then(parse_timestamp),
    }
}

pub fn history_from_row(row: &OutputMap) -> VehicleHistory {
    VehicleHistory {
        history_id: row.int_or_default("HistoryId"),
        vehicle_id: row.int_or_default("VehicleId"),
        event_type: row.string_or_default("EventType"),
        event_date: row.text("EventDate").and_then(parse_timestamp),
        old_status: row.string_or_default("OldStatus"),
        new_status: row.string_or_default("NewStatus"),
        old_price: row.amount_or_default("OldPrice"),
        new_price: row.amount_or_default("NewPrice"),
        user_id: row.string_or_default("UserId"),
        notes: row.string_or_default("Notes"),
    }
}

impl Connector {
    /// Add a vehicle to the inventory
    ///
    /// Returns the new vehicle id, or a negative code on failure.
    pub async fn add_vehicle(&self, vehicle: &Vehicle, user_id: &str) -> i64 {
        let call = ProcedureCall::new(VEHCRUD, "AddVehicle")
            .param(vehicle_data_param(vehicle, false))
            .param(DataParam::input("UserId", USER_ID, user_id))
            .returns(INT);

        let id = self.call_for_code(&call).await;
        tracing::debug!("AddVehicle for VIN {} returned {}", vehicle.vin, id);
        id
    }

    /// Fetch one vehicle, `None` when it does not exist or the call fails
    pub async fn get_vehicle_by_id(&self, vehicle_id: i64) -> Option<Vehicle> {
        let call = ProcedureCall::new(VEHCRUD, "GetVehicleById")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(vehicle_out_param("VehicleData", None))
            .returns(INT);

        let output = self.call(&call).await?;
        let code = output.return_code()?;
        if code != VEHCRUD_SUCCESS {
            tracing::debug!("GetVehicleById({}) returned {}", vehicle_id, code);
            return None;
        }

        output.values.record("VehicleData").map(vehicle_from_row)
    }

    /// Returns 0 on success
    pub async fn update_vehicle(&self, vehicle: &Vehicle, user_id: &str) -> i64 {
        let call = ProcedureCall::new(VEHCRUD, "UpdateVehicle")
            .param(vehicle_data_param(vehicle, true))
            .param(DataParam::input("UserId", USER_ID, user_id))
            .returns(INT);

        self.call_for_code(&call).await
    }

    /// Returns 0 on success
    pub async fn delete_vehicle(&self, vehicle_id: i64, user_id: &str) -> i64 {
        let call = ProcedureCall::new(VEHCRUD, "DeleteVehicle")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(DataParam::input("UserId", USER_ID, user_id))
            .returns(INT);

        self.call_for_code(&call).await
    }

    /// Change a vehicle's status, recording the sale date when given
    ///
    /// Returns 0 on success.
    pub async fn update_vehicle_status(
        &self,
        vehicle_id: i64,
        new_status: &str,
        date_sold: Option<NaiveDate>,
        user_id: &str,
        notes: &str,
    ) -> i64 {
        let call = ProcedureCall::new(VEHCRUD, "UpdateVehicleStatus")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(DataParam::input("NewStatus", STATUS, new_status))
            .param(DataParam::input("DateSold", DATE, date_param(date_sold)))
            .param(DataParam::input("UserId", USER_ID, user_id))
            .param(DataParam::input("Notes", NOTES, notes))
            .returns(INT);

        self.call_for_code(&call).await
    }

    /// List vehicles, optionally filtered
    ///
    /// At most [`MAX_RESULTS`] vehicles come back; a failed call yields an
    /// empty list.
    pub async fn list_vehicles(&self, filter: Option<&VehicleFilter>) -> Vec<Vehicle> {
        let mut call = ProcedureCall::new(VEHCRUD, "ListVehicles");
        if let Some(filter) = filter {
            call = call.param(filter_param(filter));
        }
        let call = call
            .param(vehicle_out_param("ResultArray", Some(MAX_RESULTS)))
            .param(DataParam::output("ResultCount", INT));

        let Some(output) = self.call(&call).await else {
            return Vec::new();
        };

        counted_rows(&output, &call, "ResultArray", "ResultCount")
            .iter()
            .map(vehicle_from_row)
            .collect()
    }

    /// Audit trail of one vehicle
    pub async fn get_vehicle_history(&self, vehicle_id: i64) -> Vec<VehicleHistory> {
        let call = ProcedureCall::new(VEHCRUD, "GetVehicleHistory")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(
                StructParam::new("HistoryArray", Direction::Out)
                    .dim(MAX_RESULTS)
                    .out("HistoryId", INT)
                    .out("VehicleId", INT)
                    .out("EventType", EVENT_TYPE)
                    .out("EventDate", TIMESTAMP)
                    .out("OldStatus", STATUS)
                    .out("NewStatus", STATUS)
                    .out("OldPrice", MONEY)
                    .out("NewPrice", MONEY)
                    .out("UserId", USER_ID)
                    .out("Notes", NOTES),
            )
            .param(DataParam::output("HistoryCount", INT));

        let Some(output) = self.call(&call).await else {
            return Vec::new();
        };

        counted_rows(&output, &call, "HistoryArray", "HistoryCount")
            .iter()
            .map(history_from_row)
            .collect()
    }
}
