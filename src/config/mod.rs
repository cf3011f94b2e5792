pub mod toml_config;

use crate::domain::model::ClientOptions;
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// Everything needed for one call-and-decode run.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSettings {
    pub wsdl: String,
    pub options: ClientOptions,
    pub operation: String,
    pub arguments: serde_json::Value,
}

impl Validate for CallSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_endpoint_descriptor("wsdl", &self.wsdl)?;
        validation::validate_non_empty_string("operation", &self.operation)?;
        validation::validate_client_options("options", &self.options)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "soap-bridge")]
#[command(about = "Call a SOAP operation and print its XML payload as JSON")]
pub struct CliConfig {
    /// WSDL location (http(s) URL or file path)
    #[arg(long)]
    pub wsdl: Option<String>,

    /// Operation to invoke
    #[arg(long)]
    pub operation: Option<String>,

    /// Operation arguments as a JSON document
    #[arg(long)]
    pub args: Option<String>,

    /// Client option passed to the transport, as key=value (repeatable)
    #[arg(short = 'o', long = "option")]
    pub options: Vec<String>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Pretty-print the JSON output")]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

/// Splits `key=value`; the value may itself contain `=`.
pub fn parse_option_pair(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(BridgeError::InvalidConfigValueError {
            field: "option".to_string(),
            value: raw.to_string(),
            reason: "Expected key=value".to_string(),
        }),
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// `(verbose, json)` logging switches: a flag or the file's `[logging]` table.
    ///
    /// An unreadable file is ignored here; [`CliConfig::resolve`] reports it.
    pub fn logging(&self) -> (bool, bool) {
        let file = self
            .config
            .as_ref()
            .and_then(|path| toml_config::TomlConfig::from_file(path).ok());
        let verbose = self.verbose || file.as_ref().is_some_and(|f| f.verbose());
        let json = self.json_logs || file.as_ref().is_some_and(|f| f.json_logs());
        (verbose, json)
    }

    /// Merges the optional TOML file with the flags, flags taking precedence.
    pub fn resolve(&self) -> Result<CallSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let file = toml_config::TomlConfig::from_file(path)?;
                file.validate()?;
                file.to_settings()?
            }
            None => CallSettings {
                wsdl: String::new(),
                options: ClientOptions::new(),
                operation: String::new(),
                arguments: serde_json::Value::Object(serde_json::Map::new()),
            },
        };

        if let Some(wsdl) = &self.wsdl {
            settings.wsdl = wsdl.clone();
        }
        if let Some(operation) = &self.operation {
            settings.operation = operation.clone();
        }
        if let Some(args) = &self.args {
            settings.arguments = serde_json::from_str(args)?;
        }
        for raw in &self.options {
            let (key, value) = parse_option_pair(raw)?;
            settings.options.insert(key, value);
        }

        if settings.wsdl.is_empty() {
            return Err(BridgeError::MissingConfigError {
                field: "wsdl".to_string(),
            });
        }
        if settings.operation.is_empty() {
            return Err(BridgeError::MissingConfigError {
                field: "operation".to_string(),
            });
        }

        settings.validate()?;
        Ok(settings)
    }
}
