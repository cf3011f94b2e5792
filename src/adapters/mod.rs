// Adapters layer: concrete implementations for external systems (markup, SOAP over HTTP).

pub mod soap;
pub mod xml;
