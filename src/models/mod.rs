// Model exports
pub mod amount;
pub mod domain;
pub mod record;
pub mod requests;
pub mod responses;

pub use amount::{Amount, AmountError};
pub use domain::{
    InventoryValue, ProfitSummary, SalesMetrics, Vehicle, VehicleFilter, VehicleHistory,
    DEFAULT_STATUS, KNOWN_STATUSES, STATUS_SOLD,
};
pub use record::{FieldMap, Record};
pub use requests::{
    FormError, InventoryQuery, PriceAdjustmentForm, ReportsQuery, StatusForm, VehicleForm,
};
pub use responses::HealthResponse;
