use crate::models::record::date_param;
use crate::models::{Amount, InventoryValue, ProfitSummary, SalesMetrics};
use crate::services::connector::{
    counted_rows, Connector, DATE, INT, MONEY, PERIOD, USER_ID, VEHBIZ,
};
use crate::toolkit::{CallOutput, DataParam, Direction, OutputMap, ProcedureCall, StructParam};
use chrono::NaiveDate;

/// Months returned by GetMonthlySalesMetrics
pub const MONTHLY_METRICS_DIM: u32 = 12;
/// Years returned by GetYearlySalesMetrics
pub const YEARLY_METRICS_DIM: u32 = 20;

fn metrics_array(dim: u32) -> StructParam {
    StructParam::new("SalesMetricsArray", Direction::Out)
        .dim(dim)
        .out("Period", PERIOD)
        .out("VehiclesSold", INT)
        .out("TotalRevenue", MONEY)
        .out("TotalProfit", MONEY)
        .out("AverageProfit", MONEY)
        .out("AverageDaysToSell", INT)
}

pub fn metrics_from_row(row: &OutputMap) -> SalesMetrics {
    SalesMetrics {
        period: row.string_or_default("Period"),
        vehicles_sold: row.int_or_default("VehiclesSold"),
        total_revenue: row.amount_or_default("TotalRevenue"),
        total_profit: row.amount_or_default("TotalProfit"),
        average_profit: row.amount_or_default("AverageProfit"),
        average_days_to_sell: row.int_or_default("AverageDaysToSell"),
    }
}

pub fn profit_summary_from_row(row: &OutputMap) -> ProfitSummary {
    ProfitSummary {
        total_vehicles: row.int_or_default("TotalVehicles"),
        total_revenue: row.amount_or_default("TotalRevenue"),
        total_cost: row.amount_or_default("TotalCost"),
        total_profit: row.amount_or_default("TotalProfit"),
        average_profit: row.amount_or_default("AverageProfit"),
        average_days_to_sell: row.int_or_default("AverageDaysToSell"),
    }
}

pub fn inventory_value_from_row(row: &OutputMap) -> InventoryValue {
    InventoryValue {
        total_vehicles: row.int_or_default("TotalVehicles"),
        total_value: row.amount_or_default("TotalValue"),
        average_value: row.amount_or_default("AverageValue"),
        oldest_vehicle_days: row.int_or_default("OldestVehicleDays"),
        average_days_in_inventory: row.int_or_default("AverageDaysInInventory"),
    }
}

fn metrics_from_output(output: &CallOutput, call: &ProcedureCall) -> Vec<SalesMetrics> {
    counted_rows(output, call, "SalesMetricsArray", "MetricsCount")
        .iter()
        .map(metrics_from_row)
        .collect()
}

impl Connector {
    /// Profit of one sold vehicle, zero when unavailable
    pub async fn calculate_vehicle_profit(&self, vehicle_id: i64) -> Amount {
        let call = ProcedureCall::new(VEHBIZ, "CalculateVehicleProfit")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(DataParam::output("Profit", MONEY));

        self.call(&call)
            .await
            .map(|o| o.values.amount_or_default("Profit"))
            .unwrap_or_default()
    }

    pub async fn calculate_days_in_inventory(&self, vehicle_id: i64) -> i64 {
        let call = ProcedureCall::new(VEHBIZ, "CalculateDaysInInventory")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(DataParam::output("Days", INT));

        self.call(&call)
            .await
            .map(|o| o.values.int_or_default("Days"))
            .unwrap_or(0)
    }

    pub async fn calculate_days_to_sell(&self, vehicle_id: i64) -> i64 {
        let call = ProcedureCall::new(VEHBIZ, "CalculateDaysToSell")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(DataParam::output("Days", INT));

        self.call(&call)
            .await
            .map(|o| o.values.int_or_default("Days"))
            .unwrap_or(0)
    }

    /// Profit summary for sales between two dates; open ends are unbounded
    pub async fn calculate_profit_summary(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ProfitSummary {
        let call = ProcedureCall::new(VEHBIZ, "CalculateProfitSummary")
            .param(DataParam::input("StartDate", DATE, date_param(start_date)))
            .param(DataParam::input("EndDate", DATE, date_param(end_date)))
            .param(
                StructParam::new("ProfitSummary", Direction::Out)
                    .out("TotalVehicles", INT)
                    .out("TotalRevenue", MONEY)
                    .out("TotalCost", MONEY)
                    .out("TotalProfit", MONEY)
                    .out("AverageProfit", MONEY)
                    .out("AverageDaysToSell", INT),
            );

        self.call(&call)
            .await
            .and_then(|o| o.values.record("ProfitSummary").map(profit_summary_from_row))
            .unwrap_or_default()
    }

    /// Value of the vehicles currently in stock
    pub async fn calculate_inventory_value(&self) -> InventoryValue {
        let call = ProcedureCall::new(VEHBIZ, "CalculateInventoryValue").param(
            StructParam::new("InventoryValue", Direction::Out)
                .out("TotalVehicles", INT)
                .out("TotalValue", MONEY)
                .out("AverageValue", MONEY)
                .out("OldestVehicleDays", INT)
                .out("AverageDaysInInventory", INT),
        );

        self.call(&call)
            .await
            .and_then(|o| o.values.record("InventoryValue").map(inventory_value_from_row))
            .unwrap_or_default()
    }

    pub async fn get_monthly_sales_metrics(&self, year: i32) -> Vec<SalesMetrics> {
        let call = ProcedureCall::new(VEHBIZ, "GetMonthlySalesMetrics")
            .param(DataParam::input("Year", INT, year))
            .param(metrics_array(MONTHLY_METRICS_DIM))
            .param(DataParam::output("MetricsCount", INT));

        match self.call(&call).await {
            Some(output) => metrics_from_output(&output, &call),
            None => Vec::new(),
        }
    }

    pub async fn get_yearly_sales_metrics(&self, start_year: i32, end_year: i32) -> Vec<SalesMetrics> {
        let call = ProcedureCall::new(VEHBIZ, "GetYearlySalesMetrics")
            .param(DataParam::input("StartYear", INT, start_year))
            .param(DataParam::input("EndYear", INT, end_year))
            .param(metrics_array(YEARLY_METRICS_DIM))
            .param(DataParam::output("MetricsCount", INT));

        match self.call(&call).await {
            Some(output) => metrics_from_output(&output, &call),
            None => Vec::new(),
        }
    }

    /// Price the vehicle would get from an adjustment, without applying it
    pub async fn calculate_price_adjustment(
        &self,
        vehicle_id: i64,
        days_threshold: i32,
        percentage: Amount,
    ) -> Amount {
        let call = ProcedureCall::new(VEHBIZ, "CalculatePriceAdjustment")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(DataParam::input("DaysThreshold", INT, days_threshold))
            .param(DataParam::input("Percentage", MONEY, percentage))
            .param(DataParam::output("NewPrice", MONEY));

        self.call(&call)
            .await
            .map(|o| o.values.amount_or_default("NewPrice"))
            .unwrap_or_default()
    }

    /// Returns 0 on success
    pub async fn apply_price_adjustment(
        &self,
        vehicle_id: i64,
        days_threshold: i32,
        percentage: Amount,
        user_id: &str,
    ) -> i64 {
        let call = ProcedureCall::new(VEHBIZ, "ApplyPriceAdjustment")
            .param(DataParam::input("VehicleId", INT, vehicle_id))
            .param(DataParam::input("DaysThreshold", INT, days_threshold))
            .param(DataParam::input("Percentage", MONEY, percentage))
            .param(DataParam::input("UserId", USER_ID, user_id))
            .returns(INT);

        self.call_for_code(&call).await
    }

    /// Adjust every vehicle older than the threshold; returns how many changed
    pub async fn apply_bulk_price_adjustment(
        &self,
        days_threshold: i32,
        percentage: Amount,
        user_id: &str,
    ) -> i64 {
        let call = ProcedureCall::new(VEHBIZ, "ApplyBulkPriceAdjustment")
            .param(DataParam::input("DaysThreshold", INT, days_threshold))
            .param(DataParam::input("Percentage", MONEY, percentage))
            .param(DataParam::input("UserId", USER_ID, user_id))
            .param(DataParam::output("VehiclesAdjusted", INT));

        let adjusted = self
            .call(&call)
            .await
            .map(|o| o.values.int_or_default("VehiclesAdjusted"))
            .unwrap_or(0);

        tracing::info!(
            "Bulk price adjustment of {}% after {} days changed {} vehicles",
            percentage,
            days_threshold,
            adjusted
        );
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::OutputNode;

    #[test]
    fn test_metrics_row_mapping() {
        let mut row = OutputMap::new();
        row.insert("Period", OutputNode::Data("2024-03   ".into()));
        row.insert("VehiclesSold", OutputNode::Data("12".into()));
        row.insert("TotalRevenue", OutputNode::Data("180000.00".into()));
        row.insert("TotalProfit", OutputNode::Data("21000.50".into()));

        let metrics = metrics_from_row(&row);
        assert_eq!(metrics.period, "2024-03");
        assert_eq!(metrics.vehicles_sold, 12);
        assert_eq!(metrics.total_revenue, Amount::from_cents(18_000_000));
        assert_eq!(metrics.total_profit, Amount::from_cents(2_100_050));
        assert_eq!(metrics.average_profit, Amount::ZERO);
        assert_eq!(metrics.average_days_to_sell, 0);
    }

    #[test]
    fn test_metrics_array_dims() {
        assert_eq!(metrics_array(MONTHLY_METRICS_DIM).dim, Some(12));
        assert_eq!(metrics_array(YEARLY_METRICS_DIM).fields.len(), 6);
    }
}
