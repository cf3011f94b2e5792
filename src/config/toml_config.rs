use crate::config::CallSettings;
use crate::domain::model::ClientOptions;
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub call: Option<CallConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub wsdl: String,
    pub options: Option<BTreeMap<String, toml::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    pub operation: Option<String>,
    pub arguments: Option<toml::Table>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BridgeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BridgeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| BridgeError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Option values may be written as any TOML scalar; the transport receives strings.
    pub fn client_options(&self) -> ClientOptions {
        self.service
            .options
            .iter()
            .flatten()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }

    pub fn operation(&self) -> Option<&str> {
        self.call.as_ref().and_then(|c| c.operation.as_deref())
    }

    pub fn arguments(&self) -> Result<serde_json::Value> {
        match self.call.as_ref().and_then(|c| c.arguments.as_ref()) {
            Some(table) => Ok(serde_json::to_value(table)?),
            None => Ok(serde_json::Value::Object(serde_json::Map::new())),
        }
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn to_settings(&self) -> Result<CallSettings> {
        Ok(CallSettings {
            wsdl: self.service.wsdl.clone(),
            options: self.client_options(),
            operation: self.operation().unwrap_or_default().to_string(),
            arguments: self.arguments()?,
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_endpoint_descriptor("service.wsdl", &self.service.wsdl)?;
        crate::utils::validation::validate_client_options("service.options", &self.client_options())?;
        if let Some(operation) = self.operation() {
            crate::utils::validation::validate_non_empty_string("call.operation", operation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[service]
wsdl = "https://svc.example.com/stock.asmx?wsdl"

[service.options]
timeout_seconds = 30
endpoint = "https://svc.example.com/stock.asmx"

[call]
operation = "GetPrice"

[call.arguments]
symbol = "ABC"
exchanges = ["NYSE", "LSE"]

[call.arguments.window]
days = 5
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.service.wsdl, "https://svc.example.com/stock.asmx?wsdl");
        assert_eq!(config.operation(), Some("GetPrice"));
        assert_eq!(config.client_options().get("timeout_seconds"), Some("30"));
        assert_eq!(
            config.arguments().unwrap(),
            json!({"symbol": "ABC", "exchanges": ["NYSE", "LSE"], "window": {"days": 5}})
        );
        assert!(!config.verbose());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SOAP_BRIDGE_TEST_WSDL", "https://test.api.com/svc?wsdl");

        let toml_content = r#"
[service]
wsdl = "${SOAP_BRIDGE_TEST_WSDL}"

[service.options]
token = "${SOAP_BRIDGE_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.service.wsdl, "https://test.api.com/svc?wsdl");
        assert_eq!(
            config.client_options().get("token"),
            Some("${SOAP_BRIDGE_TEST_UNSET_VAR}")
        );

        std::env::remove_var("SOAP_BRIDGE_TEST_WSDL");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[service]
wsdl = "ftp://svc/stock.wsdl"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[service]
wsdl = "./stock.wsdl"

[service.options]
timeout_seconds = 0
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_service_is_config_error() {
        let err = TomlConfig::from_toml_str("[call]\noperation = \"GetPrice\"\n").unwrap_err();
        assert!(matches!(err, BridgeError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[service]
wsdl = "./stock.wsdl"

[call]
operation = "GetQuoteXml"

[logging]
verbose = true
json = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.operation, "GetQuoteXml");
        assert_eq!(settings.arguments, json!({}));
        assert!(config.verbose());
        assert!(config.json_logs());
    }
}
