use crate::adapters::soap::wsdl::{OperationInfo, SoapVersion};
use crate::adapters::xml::{escape, parse_document, DecodeOptions, Element};
use crate::domain::model::Value;
use crate::utils::error::TransportError;

pub const SOAP11_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP12_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

fn envelope_error(message: impl Into<String>) -> TransportError {
    TransportError::Envelope {
        message: message.into(),
    }
}

fn envelope_namespace(version: SoapVersion) -> &'static str {
    match version {
        SoapVersion::V11 => SOAP11_ENVELOPE_NS,
        SoapVersion::V12 => SOAP12_ENVELOPE_NS,
    }
}

fn check_element_name(name: &str) -> Result<(), TransportError> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(envelope_error(format!("'{}' is not a valid element name", name)))
    }
}

fn write_scalar(out: &mut String, value: &serde_json::Value) {
    match value {
        serde_json::Value::String(s) => out.push_str(&escape(s)),
        other => out.push_str(&other.to_string()),
    }
}

fn write_element(out: &mut String, name: &str, value: &serde_json::Value) -> Result<(), TransportError> {
    check_element_name(name)?;
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                write_element(out, name, item)?;
            }
        }
        serde_json::Value::Null => out.push_str(&format!("<{}/>", name)),
        serde_json::Value::Object(fields) => {
            out.push_str(&format!("<{}>", name));
            for (key, field) in fields {
                write_element(out, key, field)?;
            }
            out.push_str(&format!("</{}>", name));
        }
        scalar => {
            out.push_str(&format!("<{}>", name));
            write_scalar(out, scalar);
            out.push_str(&format!("</{}>", name));
        }
    }
    Ok(())
}

/// Serializes a request envelope for `operation` carrying `args`.
///
/// The wrapper declares the target namespace as default, so argument elements
/// are qualified without prefixes.
pub fn build_request(
    version: SoapVersion,
    target_namespace: &str,
    operation: &OperationInfo,
    args: &serde_json::Value,
) -> Result<String, TransportError> {
    let mut content = String::new();
    match args {
        serde_json::Value::Object(fields) => {
            for (key, field) in fields {
                write_element(&mut content, key, field)?;
            }
        }
        serde_json::Value::Null => {}
        serde_json::Value::Array(_) => {
            return Err(envelope_error("arguments must be an object or a scalar"));
        }
        scalar => write_scalar(&mut content, scalar),
    }

    let wrapper = &operation.input_element;
    check_element_name(wrapper)?;
    let namespace = if target_namespace.is_empty() {
        String::new()
    } else {
        format!(r#" xmlns="{}""#, escape(target_namespace))
    };

    Ok(format!(
        r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="{ns}"><soap:Body><{wrapper}{namespace}>{content}</{wrapper}></soap:Body></soap:Envelope>"#,
        ns = envelope_namespace(version),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub result: Value,
    pub header: Option<Value>,
}

/// Response content is keyed by local names, attributes dropped.
const RESULT_OPTIONS: DecodeOptions = DecodeOptions { strip_prefix: true };

fn child_text(parent: &Element, path: &[&str]) -> Option<String> {
    let mut current = parent;
    for name in path {
        current = current.first_named(name)?;
    }
    Some(current.text().trim().to_string())
}

fn fault_from(fault: &Element) -> TransportError {
    // SOAP 1.1 then SOAP 1.2 layouts.
    let code = child_text(fault, &["faultcode"])
        .or_else(|| child_text(fault, &["Code", "Value"]))
        .unwrap_or_else(|| "Fault".to_string());
    let reason = child_text(fault, &["faultstring"])
        .or_else(|| child_text(fault, &["Reason", "Text"]))
        .unwrap_or_default();
    TransportError::Fault { code, reason }
}

/// Extracts the response wrapper content, or the fault the service returned.
pub fn parse_response(document: &str) -> Result<ParsedResponse, TransportError> {
    let root = parse_document(document)?;
    if root.local_name() != "Envelope" {
        return Err(envelope_error(format!("expected <Envelope>, found <{}>", root.name)));
    }

    let body = root
        .first_named("Body")
        .ok_or_else(|| envelope_error("missing <Body>"))?;
    let header = root.first_named("Header").map(|h| h.to_value(&RESULT_OPTIONS));

    let result = match body.elements().next() {
        Some(fault) if fault.local_name() == "Fault" => return Err(fault_from(fault)),
        Some(wrapper) if wrapper.elements().next().is_none() && wrapper.text().trim().is_empty() => {
            Value::empty_mapping()
        }
        Some(wrapper) => wrapper.to_value(&RESULT_OPTIONS),
        None => Value::empty_mapping(),
    };

    Ok(ParsedResponse { result, header })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get_price() -> OperationInfo {
        OperationInfo {
            name: "GetPrice".to_string(),
            soap_action: Some("http://example.com/stock/GetPrice".to_string()),
            input_element: "GetPrice".to_string(),
        }
    }

    #[test]
    fn test_build_request_document_literal() {
        let envelope = build_request(
            SoapVersion::V11,
            "http://example.com/stock",
            &get_price(),
            &json!({"symbol": "A&B", "tags": ["x", "y"], "limit": 3, "note": null}),
        )
        .unwrap();

        assert!(envelope.contains(r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#));
        assert!(envelope.contains(
            r#"<GetPrice xmlns="http://example.com/stock"><symbol>A&amp;B</symbol><tags>x</tags><tags>y</tags><limit>3</limit><note/></GetPrice>"#
        ));
    }

    #[test]
    fn test_build_request_soap12_nested() {
        let envelope = build_request(
            SoapVersion::V12,
            "",
            &get_price(),
            &json!({"order": {"symbol": "ABC", "qty": 2}}),
        )
        .unwrap();

        assert!(envelope.contains(SOAP12_ENVELOPE_NS));
        assert!(envelope.contains("<GetPrice><order><symbol>ABC</symbol><qty>2</qty></order></GetPrice>"));
    }

    #[test]
    fn test_build_request_rejects_bad_names() {
        let err = build_request(SoapVersion::V11, "", &get_price(), &json!({"bad name": 1})).unwrap_err();
        assert!(matches!(err, TransportError::Envelope { .. }));

        let err = build_request(SoapVersion::V11, "", &get_price(), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, TransportError::Envelope { .. }));
    }

    #[test]
    fn test_parse_response_returns_wrapper_content() {
        let response = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header><m:Trace xmlns:m="urn:m">42</m:Trace></soap:Header>
  <soap:Body>
    <m:GetPriceResponse xmlns:m="http://example.com/stock">
      <m:Price currency="ignored">12.50</m:Price>
      <m:Currency>USD</m:Currency>
    </m:GetPriceResponse>
  </soap:Body>
</soap:Envelope>"#;

        let parsed = parse_response(response).unwrap();
        assert_eq!(
            parsed.result.to_json(),
            json!({"Price": "12.50", "Currency": "USD"})
        );
        assert_eq!(parsed.header.unwrap().to_json(), json!({"Trace": "42"}));
    }

    #[test]
    fn test_parse_response_empty_wrapper() {
        let response = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><DoneResponse/></s:Body></s:Envelope>"#;
        assert_eq!(parse_response(response).unwrap().result, Value::empty_mapping());
    }

    #[test]
    fn test_parse_response_soap11_fault() {
        let response = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Client</faultcode><faultstring>Unknown symbol</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;
        let err = parse_response(response).unwrap_err();
        assert_eq!(err.to_string(), "soap:Client: Unknown symbol");
    }

    #[test]
    fn test_parse_response_soap12_fault() {
        let response = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"><env:Body><env:Fault><env:Code><env:Value>env:Receiver</env:Value></env:Code><env:Reason><env:Text xml:lang="en">Backend down</env:Text></env:Reason></env:Fault></env:Body></env:Envelope>"#;
        let err = parse_response(response).unwrap_err();
        assert!(matches!(err, TransportError::Fault { ref code, ref reason } if code == "env:Receiver" && reason == "Backend down"));
    }

    #[test]
    fn test_parse_response_rejects_non_envelope() {
        let err = parse_response("<html/>").unwrap_err();
        assert!(matches!(err, TransportError::Envelope { .. }));
    }
}
