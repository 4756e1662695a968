//! Response normalization
//!
//! Server versions disagree on how the same logical resource is shaped:
//! collections may be nested one level deeper, single-element collections
//! arrive as a bare object, identifiers appear directly or wrapped. Each
//! resource has an ordered table of candidate shapes; the first *present*
//! value wins, where an empty list counts as present and only key absence
//! falls through to the next candidate.

use serde_json::Value;

use super::error::ApiError;
use super::models::{Cabinet, DocumentRef};
use super::xml::xml_to_value;

/// Shapes for the cabinet collection.
const CABINET_SHAPES: &[&[&str]] = &[&["FileCabinets", "FileCabinet"]];

/// Shapes for the document collection, newest layout first.
const DOCUMENT_SHAPES: &[&[&str]] = &[
    &["Documents", "Items", "Document"],
    &["Documents", "Document"],
    &["Items", "Document"],
];

/// Shapes for a document's field collection.
const FIELD_SHAPES: &[&[&str]] = &[&["Fields", "Field"], &["Field"]];

/// Walk a key path into a value; `None` as soon as a key is absent.
pub(crate) fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |value, key| value.get(key))
}

/// First shape whose full path is present. Found-empty stops the search.
pub(crate) fn first_present<'a>(root: &'a Value, shapes: &[&[&str]]) -> Option<&'a Value> {
    shapes.iter().find_map(|path| lookup(root, path))
}

/// Render a scalar (string or number) as a string id; `None` for
/// containers.
pub(crate) fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Wrap a bare object as a one-element list; arrays pass through.
fn coerce_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

/// Parse a 2xx body into a value, accepting JSON or XML. A body that
/// parses as neither is protocol drift and fails the call.
pub fn parse_payload(text: &str) -> Result<Value, ApiError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(text).map_err(|e| ApiError::Malformed(format!("invalid JSON body: {e}")))
    } else {
        xml_to_value(text).map_err(|e| ApiError::Malformed(format!("invalid XML body: {e}")))
    }
}

/// Extract the cabinet list. A missing container means the user simply has
/// no cabinets; a cabinet record without an id is malformed.
pub fn cabinets(root: &Value) -> Result<Vec<Cabinet>, ApiError> {
    let found = match first_present(root, CABINET_SHAPES) {
        Some(value) => coerce_list(value),
        None => return Ok(Vec::new()),
    };
    found.iter().map(cabinet_from).collect()
}

fn cabinet_from(value: &Value) -> Result<Cabinet, ApiError> {
    let id = scalar_string(value.get("Id"))
        .ok_or_else(|| ApiError::Malformed("cabinet record without Id".to_string()))?;
    let name = scalar_string(value.get("Name")).unwrap_or_default();
    let is_basket = value.get("IsBasket").map(truthy).unwrap_or(false);
    Ok(Cabinet { id, name, is_basket })
}

/// Case-insensitive textual boolean; XML delivers "true"/"False"/etc.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Extract document references, tolerating every known listing shape.
pub fn documents(root: &Value) -> Vec<DocumentRef> {
    let items = first_present(root, DOCUMENT_SHAPES)
        .map(coerce_list)
        .unwrap_or_default();
    items
        .iter()
        .filter(|value| !value.is_null())
        .map(document_from)
        .collect()
}

fn document_from(value: &Value) -> DocumentRef {
    // Prefer a direct Id, then the nested wrapper; a raw scalar record is
    // its own id.
    let id = scalar_string(value.get("Id"))
        .or_else(|| scalar_string(lookup(value, &["Document", "Id"])))
        .or_else(|| scalar_string(Some(value)))
        .unwrap_or_default();
    let fields = lookup(value, &["Fields", "Field"]).map(coerce_list);
    DocumentRef { id, fields }
}

/// Extract a document's fields as opaque values.
pub fn fields(root: &Value) -> Vec<Value> {
    first_present(root, FIELD_SHAPES)
        .map(coerce_list)
        .unwrap_or_default()
}
