use crate::domain::model::{ClientOptions, Value};
use crate::domain::ports::{Binding, Transport};
use crate::utils::error::{BridgeError, Result};

/// Invokes single operations on the service behind `endpoint`.
///
/// The endpoint and options are captured once; the binding is resolved again
/// on every call.
pub struct SoapInvoker<T: Transport> {
    transport: T,
    endpoint: String,
    options: ClientOptions,
}

impl<T: Transport> SoapInvoker<T> {
    pub fn new(transport: T, endpoint: impl Into<String>, options: ClientOptions) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            options,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Binds, invokes `operation` with `args` and returns the primary result element.
    pub async fn request(&self, operation: &str, args: &serde_json::Value) -> Result<Value> {
        tracing::debug!("Binding to {} for {}", self.endpoint, operation);
        let binding = self
            .transport
            .bind(&self.endpoint, &self.options)
            .await
            .map_err(BridgeError::request)?;

        let outcome = binding
            .invoke(operation, args)
            .await
            .map_err(BridgeError::request)?;

        tracing::debug!(
            "{} returned {} bytes of response",
            operation,
            outcome.raw_response.len()
        );
        Ok(outcome.into_primary())
    }

    /// Same as [`SoapInvoker::request`], with failures reported as retrieval failures.
    pub async fn retrieve(&self, operation: &str, args: &serde_json::Value) -> Result<Value> {
        self.request(operation, args)
            .await
            .map_err(BridgeError::retrieve)
    }
}
