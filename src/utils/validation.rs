use crate::adapters::soap::{OPTION_ENDPOINT, OPTION_TIMEOUT_SECONDS};
use crate::domain::model::ClientOptions;
use crate::utils::error::{BridgeError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> BridgeError {
    BridgeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// A WSDL location: an http(s) or file URL, or a plain filesystem path.
pub fn validate_endpoint_descriptor(field_name: &str, descriptor: &str) -> Result<()> {
    validate_non_empty_string(field_name, descriptor)?;

    match Url::parse(descriptor) {
        Ok(url) if url.scheme() == "file" => validate_path(field_name, url.path()),
        // Windows drive letters parse as a one-letter scheme.
        Ok(url) if url.scheme().len() == 1 => validate_path(field_name, descriptor),
        Ok(_) => validate_url(field_name, descriptor),
        Err(url::ParseError::RelativeUrlWithoutBase) => validate_path(field_name, descriptor),
        Err(e) => Err(invalid(field_name, descriptor, format!("Invalid location: {}", e))),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Checks the option keys the SOAP transport understands; other keys pass through.
pub fn validate_client_options(field_name: &str, options: &ClientOptions) -> Result<()> {
    for (key, value) in options.iter() {
        if key.trim().is_empty() {
            return Err(invalid(field_name, value, "Option key cannot be empty"));
        }
    }

    if let Some(endpoint) = options.get(OPTION_ENDPOINT) {
        validate_url(&format!("{}.{}", field_name, OPTION_ENDPOINT), endpoint)?;
    }

    if let Some(raw) = options.get(OPTION_TIMEOUT_SECONDS) {
        let field = format!("{}.{}", field_name, OPTION_TIMEOUT_SECONDS);
        let seconds = raw
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(&field, raw, format!("Not a whole number of seconds: {}", e)))?;
        validate_positive_number(&field, seconds, 1)?;
    }

    Ok(())
}
