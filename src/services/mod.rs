// Service exports
pub mod connector;
pub mod vehbiz;
pub mod vehcrud;

pub use connector::{Connector, CALL_FAILED, VEHBIZ, VEHCRUD, VEHCRUD_SUCCESS};
pub use vehcrud::MAX_RESULTS;
