use crate::domain::model::{CallOutcome, ClientOptions};
use crate::utils::error::TransportError;
use async_trait::async_trait;

/// Establishes bindings to a remote service from its descriptor.
#[async_trait]
pub trait Transport: Send + Sync {
    type Binding: Binding;

    async fn bind(
        &self,
        endpoint: &str,
        options: &ClientOptions,
    ) -> std::result::Result<Self::Binding, TransportError>;
}

/// A resolved client able to invoke the operations its service declares.
#[async_trait]
pub trait Binding: Send + Sync {
    /// Names of the operations registered from the service description.
    fn operations(&self) -> Vec<String>;

    async fn invoke(
        &self,
        operation: &str,
        args: &serde_json::Value,
    ) -> std::result::Result<CallOutcome, TransportError>;
}
