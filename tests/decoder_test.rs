use serde_json::json;
use soap_bridge::{BridgeError, Value, XmlDecoder};

fn contains_attribute_key(value: &Value, attribute: &str) -> bool {
    match value {
        Value::Scalar(_) => false,
        Value::Sequence(items) => items.iter().any(|v| contains_attribute_key(v, attribute)),
        Value::Mapping(map) => map
            .iter()
            .any(|(k, v)| k == attribute || k == "$" || contains_attribute_key(v, attribute)),
    }
}

#[tokio::test]
async fn test_catalog_document() {
    let markup = r#"<?xml version="1.0" encoding="utf-8"?>
<catalog updated="2024-01-01">
  <book id="1">
    <title>Rust in Action</title>
    <author>Tim</author>
  </book>
  <book id="2">
    <title>Programming Rust</title>
    <author>Jim</author>
    <author>Jason</author>
  </book>
  <note/>
</catalog>"#;

    let value = XmlDecoder::new().decode(markup).await.unwrap();

    assert_eq!(
        value.to_json(),
        json!({"catalog": {
            "book": [
                {"title": "Rust in Action", "author": "Tim"},
                {"title": "Programming Rust", "author": ["Jim", "Jason"]}
            ],
            "note": ""
        }})
    );
    assert!(!contains_attribute_key(&value, "id"));
    assert!(!contains_attribute_key(&value, "updated"));
}

#[tokio::test]
async fn test_entities_and_cdata_are_decoded() {
    let value = XmlDecoder::new()
        .decode("<msg><body><![CDATA[a < b]]></body><sig>R&amp;D</sig></msg>")
        .await
        .unwrap();

    assert_eq!(value.to_json(), json!({"msg": {"body": "a < b", "sig": "R&D"}}));
}

#[tokio::test]
async fn test_decoder_is_reusable_and_independent() {
    let decoder = XmlDecoder::new();

    let first = decoder.decode("<a><x>1</x></a>").await.unwrap();
    let failed = decoder.decode("<a><x>1</a>").await;
    let second = decoder.decode("<a><x>1</x></a>").await.unwrap();

    assert!(matches!(failed, Err(BridgeError::Parse { .. })));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rejected_inputs() {
    let decoder = XmlDecoder::new();

    for markup in ["", "   ", "just text", "<a/><b/>", "<a><b></a>"] {
        let err = decoder.decode(markup).await.unwrap_err();
        assert!(
            err.to_string().starts_with("parsing failed: "),
            "unexpected error for {markup:?}: {err}"
        );
    }
}
