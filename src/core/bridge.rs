use crate::adapters::soap::SoapTransport;
use crate::core::decoder::XmlDecoder;
use crate::core::invoker::SoapInvoker;
use crate::domain::model::{ClientOptions, Value};
use crate::domain::ports::Transport;
use crate::utils::error::{BridgeError, Result, XmlError};

/// Calls a remote operation and decodes the markup it answers with.
pub struct SoapBridge<T: Transport = SoapTransport> {
    invoker: SoapInvoker<T>,
    decoder: XmlDecoder,
}

impl SoapBridge<SoapTransport> {
    pub fn new(endpoint: impl Into<String>, options: ClientOptions) -> Self {
        Self::with_transport(SoapTransport::new(), endpoint, options)
    }
}

impl<T: Transport> SoapBridge<T> {
    pub fn with_transport(transport: T, endpoint: impl Into<String>, options: ClientOptions) -> Self {
        Self {
            invoker: SoapInvoker::new(transport, endpoint, options),
            decoder: XmlDecoder::new(),
        }
    }

    pub fn invoker(&self) -> &SoapInvoker<T> {
        &self.invoker
    }

    pub fn decoder(&self) -> &XmlDecoder {
        &self.decoder
    }

    /// Runs retrieval then decoding; any failure is reported as a processing failure.
    pub async fn process(&self, operation: &str, args: &serde_json::Value) -> Result<Value> {
        self.run(operation, args).await.map_err(BridgeError::process)
    }

    async fn run(&self, operation: &str, args: &serde_json::Value) -> Result<Value> {
        let response = self.invoker.retrieve(operation, args).await?;
        let markup = markup_text(&response)?;
        self.decoder.decode(markup).await
    }
}

/// Markup carried by a primary result element.
///
/// Document/literal services usually wrap the payload in a single
/// `<Operation>Result` element, which is unwrapped here.
pub fn markup_text(response: &Value) -> Result<&str> {
    match response {
        Value::Scalar(text) => Ok(text.as_str()),
        Value::Mapping(map) if map.len() == 1 => match map.values().next() {
            Some(Value::Scalar(text)) => Ok(text.as_str()),
            _ => Err(not_markup()),
        },
        _ => Err(not_markup()),
    }
}

fn not_markup() -> BridgeError {
    BridgeError::parse(XmlError::Malformed("response is not markup text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoker::mocks::{MockTransport, Reply};
    use crate::utils::error::{ErrorKind, TransportError};
    use indexmap::IndexMap;
    use serde_json::json;

    fn wrapped(key: &str, markup: &str) -> Value {
        let mut map = IndexMap::new();
        map.insert(key.to_string(), Value::from(markup));
        Value::Mapping(map)
    }

    fn bridge(transport: MockTransport) -> SoapBridge<MockTransport> {
        SoapBridge::with_transport(transport, "http://svc/quotes.asmx?wsdl", ClientOptions::new())
    }

    #[tokio::test]
    async fn test_process_decodes_result_wrapper() {
        let transport = MockTransport::new().reply(
            "GetQuoteXml",
            Reply::Value(wrapped(
                "GetQuoteXmlResult",
                "<quote><symbol>ABC</symbol><price>12.50</price></quote>",
            )),
        );

        let value = bridge(transport)
            .process("GetQuoteXml", &json!({"symbol": "ABC"}))
            .await
            .unwrap();

        assert_eq!(
            value.to_json(),
            json!({"quote": {"symbol": "ABC", "price": "12.50"}})
        );
    }

    #[tokio::test]
    async fn test_process_decodes_bare_string_result() {
        let transport = MockTransport::new().reply(
            "Echo",
            Reply::Value(Value::from("<root><item>A</item><item>B</item></root>")),
        );

        let value = bridge(transport).process("Echo", &json!("x")).await.unwrap();
        assert_eq!(value.to_json(), json!({"root": {"item": ["A", "B"]}}));
    }

    #[tokio::test]
    async fn test_timeout_message_chain() {
        let transport = MockTransport::new().reply("GetPrice", Reply::Fail("timeout"));

        let err = bridge(transport).process("GetPrice", &json!({})).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "processing failed: retrieving failed: request failed: timeout"
        );
        assert_eq!(err.kind(), ErrorKind::Process);
        assert!(matches!(err.transport_error(), Some(TransportError::Timeout)));
    }

    #[tokio::test]
    async fn test_decode_failure_message_chain() {
        let transport = MockTransport::new().reply(
            "GetQuoteXml",
            Reply::Value(wrapped("GetQuoteXmlResult", "<quote><symbol>ABC</quote>")),
        );

        let err = bridge(transport)
            .process("GetQuoteXml", &json!({}))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("processing failed: parsing failed: "));
        assert_eq!(err.root_cause().kind(), ErrorKind::Parse);

        let root_message = match err.root_cause() {
            BridgeError::Parse { source } => source.to_string(),
            other => panic!("unexpected root cause: {other}"),
        };
        assert!(message.contains(&root_message));
    }

    #[tokio::test]
    async fn test_structured_result_is_not_markup() {
        let mut map = IndexMap::new();
        map.insert("Price".to_string(), Value::from("12.50"));
        map.insert("Currency".to_string(), Value::from("USD"));
        let transport = MockTransport::new().reply("GetPrice", Reply::Value(Value::Mapping(map)));

        let err = bridge(transport).process("GetPrice", &json!({})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "processing failed: parsing failed: response is not markup text"
        );
    }

    #[test]
    fn test_markup_text_variants() {
        assert_eq!(markup_text(&Value::from("<a/>")).unwrap(), "<a/>");
        assert_eq!(markup_text(&wrapped("R", "<b/>")).unwrap(), "<b/>");
        assert!(markup_text(&Value::Sequence(vec![])).is_err());
        assert!(markup_text(&Value::empty_mapping()).is_err());
    }
}
