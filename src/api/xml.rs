//! XML to JSON value bridge
//!
//! The Platform API answers in XML by default and in JSON when asked.
//! Normalization works on `serde_json::Value` for both, so XML bodies are
//! walked into the same value model: elements become objects, attributes
//! become string entries, repeated child names collapse into arrays, and
//! text-only elements become strings.

use serde_json::{Map, Value};

/// Parse an XML document into a `Value` rooted at the document element,
/// e.g. `<FileCabinets>...</FileCabinets>` becomes
/// `{"FileCabinets": {...}}`.
pub fn xml_to_value(text: &str) -> Result<Value, roxmltree::Error> {
    let doc = roxmltree::Document::parse(text)?;
    let root = doc.root_element();
    let mut map = Map::new();
    map.insert(root.tag_name().name().to_string(), element_to_value(root));
    Ok(Value::Object(map))
}

fn element_to_value(node: roxmltree::Node) -> Value {
    let mut map = Map::new();

    for attr in node.attributes() {
        map.insert(attr.name().to_string(), Value::String(attr.value().to_string()));
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            insert_child(
                &mut map,
                child.tag_name().name().to_string(),
                element_to_value(child),
            );
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or(""));
        }
    }

    let text = text.trim();
    if map.is_empty() {
        if text.is_empty() {
            Value::Object(Map::new())
        } else {
            Value::String(text.to_string())
        }
    } else {
        if !text.is_empty() {
            map.insert("#text".to_string(), Value::String(text.to_string()));
        }
        Value::Object(map)
    }
}

/// A second child with the same name turns the entry into an array.
fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}
