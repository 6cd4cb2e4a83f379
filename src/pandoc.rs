//! Minimal view over the pandoc JSON AST.
//!
//! Only code blocks are modelled; every other node is kept as untyped JSON and
//! passed through untouched, so the filter works across pandoc API versions.

use crate::error::{FilterError, Result};
use serde_json::{Map, Value, json};

/// A pandoc `CodeBlock`: `[[id, [classes], [[key, value]]], text]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlock {
    pub id: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl CodeBlock {
    /// Parse the `c` field of a `CodeBlock` node.
    pub fn from_content(content: &Value) -> Result<Self> {
        let invalid = |what: &str| FilterError::InvalidDocument(format!("malformed CodeBlock: {what}"));

        let [attr, text] = content.as_array().map(Vec::as_slice).unwrap_or_default() else {
            return Err(invalid("expected [attr, text]"));
        };
        let [id, classes, attributes] = attr.as_array().map(Vec::as_slice).unwrap_or_default() else {
            return Err(invalid("expected [id, classes, attributes]"));
        };

        let classes = classes
            .as_array()
            .ok_or_else(|| invalid("classes must be a list"))?
            .iter()
            .map(|c| c.as_str().map(str::to_string).ok_or_else(|| invalid("class must be a string")))
            .collect::<Result<Vec<_>>>()?;

        let attributes = attributes
            .as_array()
            .ok_or_else(|| invalid("attributes must be a list"))?
            .iter()
            .map(|pair| match pair.as_array().map(Vec::as_slice) {
                Some([Value::String(k), Value::String(v)]) => Ok((k.clone(), v.clone())),
                _ => Err(invalid("attribute must be a [key, value] pair")),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: id.as_str().ok_or_else(|| invalid("id must be a string"))?.to_string(),
            classes,
            attributes,
            text: text.as_str().ok_or_else(|| invalid("text must be a string"))?.to_string(),
        })
    }

    pub fn to_content(&self) -> Value {
        let attributes: Vec<Value> = self.attributes.iter().map(|(k, v)| json!([k, v])).collect();
        json!([[self.id, self.classes, attributes], self.text])
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value for `key`.
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }
}

/// Visit every `CodeBlock` under the document's `blocks`, in document order.
///
/// The visitor returns whether it changed the block; changed blocks are written
/// back into the AST. The first error stops the walk.
pub fn walk_code_blocks<F>(document: &mut Value, visit: &mut F) -> Result<()>
where
    F: FnMut(&mut CodeBlock) -> Result<bool>,
{
    let blocks = document
        .get_mut("blocks")
        .ok_or_else(|| FilterError::InvalidDocument("missing 'blocks'".to_string()))?;
    walk_value(blocks, visit)
}

fn walk_value<F>(value: &mut Value, visit: &mut F) -> Result<()>
where
    F: FnMut(&mut CodeBlock) -> Result<bool>,
{
    match value {
        Value::Object(node) if node.get("t").and_then(Value::as_str) == Some("CodeBlock") => {
            let content = node
                .get_mut("c")
                .ok_or_else(|| FilterError::InvalidDocument("CodeBlock without content".to_string()))?;
            let mut block = CodeBlock::from_content(content)?;
            if visit(&mut block)? {
                *content = block.to_content();
            }
            Ok(())
        }
        Value::Object(node) => node.values_mut().try_for_each(|v| walk_value(v, visit)),
        Value::Array(items) => items.iter_mut().try_for_each(|v| walk_value(v, visit)),
        _ => Ok(()),
    }
}

/// Convert plain JSON into a pandoc `MetaValue`.
pub fn to_meta_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let entries: Map<String, Value> = map.iter().map(|(k, v)| (k.clone(), to_meta_value(v))).collect();
            json!({ "t": "MetaMap", "c": entries })
        }
        Value::Array(items) => json!({ "t": "MetaList", "c": items.iter().map(to_meta_value).collect::<Vec<_>>() }),
        Value::Bool(b) => json!({ "t": "MetaBool", "c": b }),
        Value::String(s) => json!({ "t": "MetaString", "c": s }),
        Value::Number(n) => json!({ "t": "MetaString", "c": n.to_string() }),
        Value::Null => json!({ "t": "MetaString", "c": "" }),
    }
}

/// Store `value` under `key` in the document metadata.
pub fn set_meta(document: &mut Value, key: &str, value: &Value) -> Result<()> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| FilterError::InvalidDocument("document must be an object".to_string()))?;
    let meta = root.entry("meta").or_insert_with(|| Value::Object(Map::new()));
    let meta = meta
        .as_object_mut()
        .ok_or_else(|| FilterError::InvalidDocument("'meta' must be an object".to_string()))?;
    meta.insert(key.to_string(), to_meta_value(value));
    Ok(())
}
