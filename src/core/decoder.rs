use crate::adapters::xml::{parse_document, DecodeOptions};
use crate::domain::model::Value;
use crate::utils::error::{BridgeError, Result};
use indexmap::IndexMap;

/// Decodes markup into a [`Value`] tree keyed by the root element name.
#[derive(Debug, Clone, Copy)]
pub struct XmlDecoder {
    options: DecodeOptions,
}

impl Default for XmlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDecoder {
    /// Single children stay bare, attributes are dropped and prefixes are kept.
    pub fn new() -> Self {
        Self {
            options: DecodeOptions::default(),
        }
    }

    pub async fn decode(&self, markup: &str) -> Result<Value> {
        let root = parse_document(markup).map_err(BridgeError::parse)?;
        tracing::debug!("Decoded <{}> ({} bytes)", root.name, markup.len());

        let mut map = IndexMap::with_capacity(1);
        let value = root.to_value(&self.options);
        map.insert(root.name, value);
        Ok(Value::Mapping(map))
    }
}
