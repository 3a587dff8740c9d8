// Remote invocation shim
pub mod output;
pub mod params;
pub mod transport;
pub mod xml;

pub use output::{CallOutput, OutputMap, OutputNode};
pub use params::{DataParam, Direction, Param, ParamType, ParamTypeError, ParamValue, ProcedureCall, StructParam};
pub use transport::{HttpTransport, Transport};

use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while calling a service program
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParam { name: String, reason: String },

    #[error("Malformed reply: {0}")]
    Xml(String),

    #[error("Remote error: {0}")]
    Remote(String),
}

/// Calls procedures of service programs in one host library
#[derive(Clone)]
pub struct Toolkit {
    transport: Arc<dyn Transport>,
    library: String,
}

impl Toolkit {
    pub fn new(transport: Arc<dyn Transport>, library: impl Into<String>) -> Self {
        Self {
            transport,
            library: library.into(),
        }
    }

    /// Serialize, execute and parse one call
    pub async fn try_call(&self, call: &ProcedureCall) -> Result<CallOutput, ToolkitError> {
        let xml_in = xml::build_request(call, &self.library)?;

        tracing::debug!(
            "Calling {}/{}({}) with {} parameters",
            self.library,
            call.program,
            call.procedure,
            call.params.len()
        );

        let xml_out = self.transport.execute(&xml_in).await?;
        xml::parse_response(call, &xml_out)
    }

    /// Call a procedure, logging and swallowing any failure
    ///
    /// Returns `None` when the call could not be completed for any reason.
    pub async fn call(&self, call: &ProcedureCall) -> Option<CallOutput> {
        match self.try_call(call).await {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::error!(
                    "Error calling service program {}/{}: {}",
                    call.program,
                    call.procedure,
                    e
                );
                None
            }
        }
    }

    pub fn disconnect(&self) {
        self.transport.disconnect();
    }
}
