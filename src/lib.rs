pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::TomlConfig, CallSettings};

pub use adapters::soap::{SoapBinding, SoapTransport};
pub use core::{bridge::SoapBridge, decoder::XmlDecoder, invoker::SoapInvoker};
pub use domain::model::{CallOutcome, ClientOptions, Value};
pub use domain::ports::{Binding, Transport};
pub use utils::error::{BridgeError, ErrorKind, Result, TransportError, XmlError};
