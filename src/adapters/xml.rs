//! Element tree built from quick-xml events.
//!
//! Shared by the markup decoder, the WSDL reader and the envelope reader. The
//! tree keeps attributes so service descriptions can be inspected; conversion to
//! [`Value`] follows [`DecodeOptions`].

use crate::domain::model::Value;
use crate::utils::error::XmlError;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Key used for the text of an element that also has child elements.
///
/// A child element literally named `_` shares this key; the text is then
/// appended after the child's value(s) in a sequence.
pub const TEXT_KEY: &str = "_";

/// How an element tree is turned into a [`Value`]. Attributes are always dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Key children by local name instead of the prefixed name.
    pub strip_prefix: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Attribute value by exact or local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .or_else(|| self.attributes.iter().find(|(key, _)| local_part(key) == name))
            .map(|(_, value)| value.as_str())
    }

    /// Namespace URI bound to `prefix` on this element (`None` for the default namespace).
    pub fn namespace_declaration(&self, prefix: Option<&str>) -> Option<&str> {
        let wanted = match prefix {
            Some(p) => format!("xmlns:{}", p),
            None => "xmlns".to_string(),
        };
        self.attributes
            .iter()
            .find(|(key, _)| *key == wanted)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub fn elements_named<'a, 'n>(&'a self, local: &'n str) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.elements().filter(move |el| el.local_name() == local)
    }

    pub fn first_named(&self, local: &str) -> Option<&Element> {
        self.elements().find(|el| el.local_name() == local)
    }

    /// Concatenated text of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Converts the element content into a [`Value`].
    pub fn to_value(&self, options: &DecodeOptions) -> Value {
        let mut map = IndexMap::new();
        let mut text = String::new();

        for node in &self.children {
            match node {
                Node::Text(t) => text.push_str(t),
                Node::Element(child) => {
                    let key = if options.strip_prefix {
                        child.local_name().to_string()
                    } else {
                        child.name.clone()
                    };
                    Value::push_child(&mut map, key, child.to_value(options));
                }
            }
        }

        if map.is_empty() {
            return Value::Scalar(text);
        }
        if !text.trim().is_empty() {
            Value::push_child(&mut map, TEXT_KEY.to_string(), Value::Scalar(text));
        }
        Value::Mapping(map)
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

fn utf8(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::Malformed(format!("invalid UTF-8 in markup: {}", e)))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) -> Result<(), XmlError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(XmlError::MultipleRoots(element.name));
        }
        self.stack.push(element);
        Ok(())
    }

    fn close(&mut self) -> Result<(), XmlError> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| XmlError::Malformed("closing tag without matching opening tag".to_string()))?;
        self.attach(element)
    }

    fn attach(&mut self, element: Element) -> Result<(), XmlError> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(Node::Element(element));
                Ok(())
            }
            None if self.root.is_some() => Err(XmlError::MultipleRoots(element.name)),
            None => {
                self.root = Some(element);
                Ok(())
            }
        }
    }

    fn text(&mut self, text: String) -> Result<(), XmlError> {
        match self.stack.last_mut() {
            Some(parent) => {
                if let Some(Node::Text(prev)) = parent.children.last_mut() {
                    prev.push_str(&text);
                } else {
                    parent.children.push(Node::Text(text));
                }
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(XmlError::TextOutsideRoot),
        }
    }
}

/// Parses a complete document into its root element.
pub fn parse_document(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder {
        stack: Vec::new(),
        root: None,
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => builder.open(open_element(&start)?)?,
            Event::Empty(start) => builder.attach(open_element(&start)?)?,
            Event::End(_) => builder.close()?,
            Event::Text(text) => builder.text(text.unescape()?.into_owned())?,
            Event::CData(data) => builder.text(utf8(&data.into_inner())?)?,
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = builder.stack.last() {
        return Err(XmlError::UnclosedElement(open.name.clone()));
    }
    builder.root.ok_or(XmlError::MissingRoot)
}

/// Escapes text for use inside an element or a double-quoted attribute.
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}
