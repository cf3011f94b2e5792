//! Minimal WSDL 1.1 reader: service address, SOAP version and the operation registry.

use crate::adapters::xml::{parse_document, Element};
use crate::utils::error::TransportError;
use indexmap::IndexMap;
use std::collections::HashMap;

pub const SOAP11_BINDING_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
pub const SOAP12_BINDING_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap12/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapVersion {
    V11,
    V12,
}

impl SoapVersion {
    fn from_binding_namespace(ns: &str) -> Option<Self> {
        match ns {
            SOAP11_BINDING_NS => Some(SoapVersion::V11),
            SOAP12_BINDING_NS => Some(SoapVersion::V12),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    pub name: String,
    pub soap_action: Option<String>,
    /// Name of the request wrapper element.
    pub input_element: String,
}

#[derive(Debug, Clone)]
pub struct ServiceDescription {
    pub target_namespace: String,
    pub address: String,
    pub version: SoapVersion,
    pub operations: IndexMap<String, OperationInfo>,
}

struct BindingInfo {
    port_type: String,
    version: SoapVersion,
    actions: IndexMap<String, Option<String>>,
}

fn wsdl_error(message: impl Into<String>) -> TransportError {
    TransportError::Wsdl {
        message: message.into(),
    }
}

fn local(qname: &str) -> &str {
    qname.rsplit_once(':').map(|(_, l)| l).unwrap_or(qname)
}

/// Resolves the namespace of `el` from its own declarations, then the enclosing scopes (innermost first).
fn namespace_of<'a>(el: &'a Element, scopes: &[&'a Element]) -> Option<&'a str> {
    let prefix = el.prefix();
    std::iter::once(el)
        .chain(scopes.iter().copied())
        .find_map(|scope| scope.namespace_declaration(prefix))
}

impl ServiceDescription {
    pub fn parse(document: &str) -> Result<Self, TransportError> {
        let root = parse_document(document)?;
        if root.local_name() != "definitions" {
            return Err(wsdl_error(format!(
                "expected <definitions> root, found <{}>",
                root.name
            )));
        }

        let target_namespace = root.attribute("targetNamespace").unwrap_or_default().to_string();

        let messages: HashMap<&str, Option<&str>> = root
            .elements_named("message")
            .filter_map(|msg| {
                let name = msg.attribute("name")?;
                let element = msg
                    .first_named("part")
                    .and_then(|part| part.attribute("element"))
                    .map(local);
                Some((name, element))
            })
            .collect();

        let port_types: HashMap<&str, Vec<(&str, Option<&str>)>> = root
            .elements_named("portType")
            .filter_map(|pt| {
                let ops = pt
                    .elements_named("operation")
                    .filter_map(|op| {
                        let input = op
                            .first_named("input")
                            .and_then(|i| i.attribute("message"))
                            .map(local);
                        Some((op.attribute("name")?, input))
                    })
                    .collect();
                Some((pt.attribute("name")?, ops))
            })
            .collect();

        let mut bindings: HashMap<&str, BindingInfo> = HashMap::new();
        for binding in root.elements_named("binding") {
            let Some(name) = binding.attribute("name") else {
                continue;
            };
            let version = binding
                .first_named("binding")
                .and_then(|b| namespace_of(b, &[binding, &root]))
                .and_then(SoapVersion::from_binding_namespace);
            let Some(version) = version else {
                tracing::debug!("Skipping non-SOAP binding {}", name);
                continue;
            };
            let actions = binding
                .elements_named("operation")
                .filter_map(|op| {
                    let action = op
                        .first_named("operation")
                        .and_then(|o| o.attribute("soapAction"))
                        .filter(|a| !a.is_empty())
                        .map(str::to_string);
                    Some((op.attribute("name")?.to_string(), action))
                })
                .collect();
            bindings.insert(
                name,
                BindingInfo {
                    port_type: local(binding.attribute("type").unwrap_or_default()).to_string(),
                    version,
                    actions,
                },
            );
        }

        let (address, binding) = root
            .elements_named("service")
            .flat_map(|service| service.elements_named("port").map(move |port| (service, port)))
            .find_map(|(service, port)| {
                let binding = bindings.get(local(port.attribute("binding")?))?;
                let address = port.elements_named("address").find(|addr| {
                    namespace_of(addr, &[port, service, &root])
                        .and_then(SoapVersion::from_binding_namespace)
                        .is_some()
                })?;
                Some((address.attribute("location")?.to_string(), binding))
            })
            .ok_or_else(|| wsdl_error("no SOAP port with an address found"))?;

        let declared = port_types
            .get(binding.port_type.as_str())
            .ok_or_else(|| wsdl_error(format!("portType '{}' not found", binding.port_type)))?;

        let operations = declared
            .iter()
            .map(|(name, input_message)| {
                let input_element = input_message
                    .and_then(|m| messages.get(m).copied().flatten())
                    .unwrap_or(*name)
                    .to_string();
                let info = OperationInfo {
                    name: name.to_string(),
                    soap_action: binding.actions.get(*name).cloned().flatten(),
                    input_element,
                };
                (name.to_string(), info)
            })
            .collect();

        Ok(Self {
            target_namespace,
            address,
            version: binding.version,
            operations,
        })
    }

    pub fn operation(&self, name: &str) -> Result<&OperationInfo, TransportError> {
        self.operations
            .get(name)
            .ok_or_else(|| TransportError::UnknownOperation {
                operation: name.to_string(),
                available: self
                    .operations
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
