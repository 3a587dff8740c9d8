//! Used Car Lot - web front end for the dealership's host inventory system
//!
//! Pages are rendered here; every record and every business calculation lives
//! on the host and is reached through XMLSERVICE procedure calls.

pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod toolkit;
pub mod views;

// Re-export commonly used types
pub use config::Settings;
pub use models::{Amount, Vehicle, VehicleFilter, VehicleHistory};
pub use routes::AppState;
pub use services::Connector;
pub use toolkit::{ProcedureCall, Toolkit, ToolkitError, Transport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let price: Amount = "$12,500.00".parse().unwrap();
        assert_eq!(price.cents(), 1_250_000);
        assert_eq!(Vehicle::default().status, models::DEFAULT_STATUS);
    }
}
