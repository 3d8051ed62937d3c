//! Decoding an order document (`{"orders": [...]}`) into typed orders.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use ordercheck_core::{DocumentError, DocumentResult};

use crate::order::Order;

/// The decoded, read-only document. Decode once, then share by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDocument {
    orders: Vec<Order>,
}

impl OrderDocument {
    pub fn from_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Decode an already-parsed JSON tree.
    ///
    /// Only the top-level shape is fatal: the root must be an object whose
    /// `orders` is a sequence of objects. Inside an order, absent fields and
    /// fields of the wrong type both read as absent, and a sub-object that is
    /// not an object reads as empty.
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        let mut root = match value {
            Value::Object(root) => root,
            other => {
                return Err(DocumentError::malformed(format!(
                    "document root must be an object, found {}",
                    kind_of(&other)
                )));
            }
        };

        let items = match root.remove("orders") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(DocumentError::malformed(format!(
                    "`orders` must be a sequence, found {}",
                    kind_of(&other)
                )));
            }
            None => return Err(DocumentError::malformed("`orders` is missing")),
        };

        let orders = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| decode_order(index, item))
            .collect::<DocumentResult<Vec<_>>>()?;

        tracing::debug!(orders = orders.len(), "decoded order document");
        Ok(Self { orders })
    }

    pub fn from_json_str(text: &str) -> DocumentResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| DocumentError::parse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_reader(reader: impl Read) -> DocumentResult<Self> {
        let value: Value = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                DocumentError::io(e.to_string())
            } else {
                DocumentError::parse(e.to_string())
            }
        })?;
        Self::from_value(value)
    }

    pub fn from_path(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| DocumentError::io(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loading order document");
        Self::from_reader(BufReader::new(file))
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn into_orders(self) -> Vec<Order> {
        self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl FromStr for OrderDocument {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

fn decode_order(index: usize, item: Value) -> DocumentResult<Order> {
    if !item.is_object() {
        return Err(DocumentError::malformed(format!(
            "orders[{index}] must be an object, found {}",
            kind_of(&item)
        )));
    }
    serde_json::from_value(item)
        .map_err(|e| DocumentError::malformed(format!("orders[{index}]: {e}")))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}
