use crate::config::HostSettings;
use crate::toolkit::{CallOutput, HttpTransport, OutputMap, ParamType, ProcedureCall, Toolkit, Transport};
use std::sync::Arc;

/// Record maintenance service program
pub const VEHCRUD: &str = "VEHCRUD";
/// Business calculation service program
pub const VEHBIZ: &str = "VEHBIZ";

/// Return code the service programs use for success
pub const VEHCRUD_SUCCESS: i64 = 0;
/// Sentinel returned when a call could not be completed
pub const CALL_FAILED: i64 = -1;

// Host field layouts shared by both service programs
pub(crate) const INT: ParamType = ParamType::int();
pub(crate) const MONEY: ParamType = ParamType::packed(10, 2);
pub(crate) const NAME: ParamType = ParamType::chars(50);
pub(crate) const VIN: ParamType = ParamType::chars(17);
pub(crate) const COLOR: ParamType = ParamType::chars(30);
pub(crate) const DATE: ParamType = ParamType::chars(10);
pub(crate) const STATUS: ParamType = ParamType::chars(10);
pub(crate) const USER_ID: ParamType = ParamType::chars(10);
pub(crate) const PERIOD: ParamType = ParamType::chars(10);
pub(crate) const EVENT_TYPE: ParamType = ParamType::chars(20);
pub(crate) const TIMESTAMP: ParamType = ParamType::chars(26);
pub(crate) const NOTES: ParamType = ParamType::chars(1000);

/// Typed front for the VEHCRUD and VEHBIZ service programs
///
/// Operations are split across `vehcrud` and `vehbiz`. None of them return
/// errors: failed calls yield empty lists, zeroed records or negative codes.
#[derive(Clone)]
pub struct Connector {
    toolkit: Toolkit,
}

impl Connector {
    pub fn new(toolkit: Toolkit) -> Self {
        Self { toolkit }
    }

    pub fn with_transport(transport: Arc<dyn Transport>, library: impl Into<String>) -> Self {
        Self::new(Toolkit::new(transport, library))
    }

    /// Connector over the XMLSERVICE HTTP gateway
    pub fn from_settings(settings: &HostSettings) -> Self {
        Self::with_transport(
            Arc::new(HttpTransport::from_settings(settings)),
            settings.library.clone(),
        )
    }

    pub fn disconnect(&self) {
        self.toolkit.disconnect();
    }

    pub(crate) async fn call(&self, call: &ProcedureCall) -> Option<CallOutput> {
        self.toolkit.call(call).await
    }

    /// Call a procedure and read its integer return value
    pub(crate) async fn call_for_code(&self, call: &ProcedureCall) -> i64 {
        match self.call(call).await {
            Some(output) => output.return_code().unwrap_or_else(|| {
                tracing::warn!("{} returned no return code", call.procedure);
                CALL_FAILED
            }),
            None => CALL_FAILED,
        }
    }
}

/// Rows of a parallel-array result, limited by its count field
///
/// The count is clamped to the rows actually returned and to the array's
/// declared dimension.
pub(crate) fn counted_rows<'a>(
    output: &'a CallOutput,
    call: &ProcedureCall,
    array: &str,
    count_field: &str,
) -> &'a [OutputMap] {
    let count = usize::try_from(output.values.int_or_default(count_field)).unwrap_or(0);
    let rows = output.values.rows(array);
    let dim = call.dim_of(array).map_or(usize::MAX, |d| d as usize);

    if count > rows.len() {
        tracing::warn!(
            "{} reported {} {} but returned {} rows",
            call.procedure,
            count,
            count_field,
            rows.len()
        );
    }

    &rows[..count.min(rows.len()).min(dim)]
}
