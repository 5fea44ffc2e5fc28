// Minimal XML property-list reader
// Library exports are one big <plist><dict>...</dict></plist>; this turns them into a value tree

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlistError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("no <plist> root element")]
    NotPlist,

    #[error("unexpected end of document")]
    UnexpectedEof,

    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),

    #[error("unexpected text outside a value")]
    UnexpectedText,

    #[error("key '{0}' has no value")]
    MissingValue(String),

    #[error("invalid integer '{0}'")]
    InvalidInteger(String),

    #[error("invalid real '{0}'")]
    InvalidReal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    /// Keys keep document order
    Dict(Vec<(String, PlistValue)>),
    Array(Vec<PlistValue>),
    String(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Date(String),
    Data(String),
}

impl PlistValue {
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        match self {
            PlistValue::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PlistValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlistValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            PlistValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(String, PlistValue)]> {
        match self {
            PlistValue::Dict(entries) => Some(entries),
            _ => None,
        }
    }
}

/// Parse a whole plist document and return its root value
pub fn parse(xml: &str) -> Result<PlistValue, PlistError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"plist" => {
                return match next_node(&mut reader)? {
                    Some(Node::Value(value)) => Ok(value),
                    Some(Node::Key(_)) => Err(PlistError::UnexpectedElement("key".to_string())),
                    None => Err(PlistError::NotPlist),
                };
            }
            Event::Start(e) => {
                return Err(PlistError::UnexpectedElement(tag_name(e.name().as_ref())));
            }
            Event::Eof => return Err(PlistError::NotPlist),
            // declaration, doctype, comments, whitespace
            _ => {}
        }
    }
}

enum Node {
    Key(String),
    Value(PlistValue),
}

/// Next key or value inside the current container; `None` once its end tag is reached
fn next_node(reader: &mut Reader<&[u8]>) -> Result<Option<Node>, PlistError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = tag_name(e.name().as_ref());
                return element_body(reader, &tag).map(Some);
            }
            Event::Empty(e) => {
                let tag = tag_name(e.name().as_ref());
                return empty_element(&tag).map(Some);
            }
            Event::End(_) => return Ok(None),
            Event::Text(t) => {
                if !t.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(PlistError::UnexpectedText);
                }
            }
            Event::Eof => return Err(PlistError::UnexpectedEof),
            _ => {}
        }
    }
}

fn element_body(reader: &mut Reader<&[u8]>, tag: &str) -> Result<Node, PlistError> {
    let value = match tag {
        "key" => return Ok(Node::Key(read_text(reader)?)),
        "dict" => {
            let mut entries = Vec::new();
            while let Some(node) = next_node(reader)? {
                let key = match node {
                    Node::Key(key) => key,
                    Node::Value(_) => return Err(PlistError::UnexpectedElement("value without key".to_string())),
                };
                match next_node(reader)? {
                    Some(Node::Value(value)) => entries.push((key, value)),
                    _ => return Err(PlistError::MissingValue(key)),
                }
            }
            PlistValue::Dict(entries)
        }
        "array" => {
            let mut items = Vec::new();
            while let Some(node) = next_node(reader)? {
                match node {
                    Node::Value(value) => items.push(value),
                    Node::Key(_) => return Err(PlistError::UnexpectedElement("key".to_string())),
                }
            }
            PlistValue::Array(items)
        }
        "string" => PlistValue::String(read_text(reader)?),
        "date" => PlistValue::Date(read_text(reader)?),
        "data" => PlistValue::Data(read_text(reader)?),
        "integer" => {
            let text = read_text(reader)?;
            let parsed = text.trim().parse().map_err(|_| PlistError::InvalidInteger(text.clone()))?;
            PlistValue::Integer(parsed)
        }
        "real" => {
            let text = read_text(reader)?;
            let parsed = text.trim().parse().map_err(|_| PlistError::InvalidReal(text.clone()))?;
            PlistValue::Real(parsed)
        }
        "true" | "false" => {
            read_text(reader)?;
            PlistValue::Boolean(tag == "true")
        }
        other => return Err(PlistError::UnexpectedElement(other.to_string())),
    };

    Ok(Node::Value(value))
}

fn empty_element(tag: &str) -> Result<Node, PlistError> {
    let value = match tag {
        "true" => PlistValue::Boolean(true),
        "false" => PlistValue::Boolean(false),
        "key" => return Ok(Node::Key(String::new())),
        "string" => PlistValue::String(String::new()),
        "data" => PlistValue::Data(String::new()),
        "date" => PlistValue::Date(String::new()),
        "integer" => PlistValue::Integer(0),
        "real" => PlistValue::Real(0.0),
        "dict" => PlistValue::Dict(Vec::new()),
        "array" => PlistValue::Array(Vec::new()),
        other => return Err(PlistError::UnexpectedElement(other.to_string())),
    };
    Ok(Node::Value(value))
}

/// Collect character data up to the closing tag. Whitespace is kept as-is.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, PlistError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(_) => return Ok(text),
            Event::Start(e) | Event::Empty(e) => {
                return Err(PlistError::UnexpectedElement(tag_name(e.name().as_ref())));
            }
            Event::Eof => return Err(PlistError::UnexpectedEof),
            _ => {}
        }
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
