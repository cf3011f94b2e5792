use crate::adapters::soap::envelope::{build_request, parse_response};
use crate::adapters::soap::wsdl::{ServiceDescription, SoapVersion};
use crate::domain::model::{CallOutcome, ClientOptions};
use crate::domain::ports::{Binding, Transport};
use crate::utils::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Overrides the address declared by the service description.
pub const OPTION_ENDPOINT: &str = "endpoint";
/// Per-request timeout in whole seconds.
pub const OPTION_TIMEOUT_SECONDS: &str = "timeout_seconds";

/// SOAP over HTTP, bound from a WSDL document.
#[derive(Debug, Clone, Default)]
pub struct SoapTransport {
    client: Client,
}

impl SoapTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_description(&self, endpoint: &str) -> Result<String, TransportError> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            tracing::debug!("Fetching service description from {}", endpoint);
            let response = self
                .client
                .get(endpoint)
                .send()
                .await
                .map_err(TransportError::from_reqwest)?;
            if !response.status().is_success() {
                return Err(TransportError::Status {
                    status: response.status().as_u16(),
                });
            }
            response.text().await.map_err(TransportError::from_reqwest)
        } else {
            let path = endpoint.strip_prefix("file://").unwrap_or(endpoint);
            tracing::debug!("Reading service description from {}", path);
            Ok(tokio::fs::read_to_string(path).await?)
        }
    }
}

fn parse_timeout(options: &ClientOptions) -> Result<Option<Duration>, TransportError> {
    options
        .get(OPTION_TIMEOUT_SECONDS)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| TransportError::InvalidOption {
                    key: OPTION_TIMEOUT_SECONDS.to_string(),
                    value: raw.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

#[async_trait]
impl Transport for SoapTransport {
    type Binding = SoapBinding;

    async fn bind(
        &self,
        endpoint: &str,
        options: &ClientOptions,
    ) -> Result<SoapBinding, TransportError> {
        let document = self.fetch_description(endpoint).await?;
        let description = ServiceDescription::parse(&document)?;
        let address = options
            .get(OPTION_ENDPOINT)
            .map(str::to_string)
            .unwrap_or_else(|| description.address.clone());

        tracing::debug!(
            "Bound {} ({} operations) at {}",
            endpoint,
            description.operations.len(),
            address
        );

        Ok(SoapBinding {
            client: self.client.clone(),
            timeout: parse_timeout(options)?,
            address,
            description,
        })
    }
}

#[derive(Debug)]
pub struct SoapBinding {
    client: Client,
    description: ServiceDescription,
    address: String,
    timeout: Option<Duration>,
}

impl SoapBinding {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn description(&self) -> &ServiceDescription {
        &self.description
    }
}

#[async_trait]
impl Binding for SoapBinding {
    fn operations(&self) -> Vec<String> {
        self.description.operations.keys().cloned().collect()
    }

    async fn invoke(
        &self,
        operation: &str,
        args: &serde_json::Value,
    ) -> Result<CallOutcome, TransportError> {
        let info = self.description.operation(operation)?;
        let version = self.description.version;
        let raw_request = build_request(version, &self.description.target_namespace, info, args)?;
        let action = info.soap_action.clone().unwrap_or_default();

        let mut request = self.client.post(&self.address);
        request = match version {
            SoapVersion::V11 => request
                .header("Content-Type", "text/xml; charset=utf-8")
                .header("SOAPAction", format!("\"{}\"", action)),
            SoapVersion::V12 => {
                let mut content_type = "application/soap+xml; charset=utf-8".to_string();
                if !action.is_empty() {
                    content_type.push_str(&format!("; action=\"{}\"", action));
                }
                request.header("Content-Type", content_type)
            }
        };
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Invoking {} at {} ({} bytes)", operation, self.address, raw_request.len());
        let response = request
            .body(raw_request.clone())
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;
        let status = response.status();
        let raw_response = response.text().await.map_err(TransportError::from_reqwest)?;
        tracing::debug!("{} answered {} ({} bytes)", operation, status, raw_response.len());

        // Faults usually arrive with a 500 status, so the body is read first.
        let parsed = match parse_response(&raw_response) {
            Ok(parsed) => parsed,
            Err(err @ TransportError::Fault { .. }) => return Err(err),
            Err(_) if !status.is_success() => {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                })
            }
            Err(err) => return Err(err),
        };
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(CallOutcome {
            result: parsed.result,
            raw_response,
            header: parsed.header,
            raw_request,
        })
    }
}
