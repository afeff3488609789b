//! Envelope normalization.
//!
//! The backend wraps collections inconsistently: a bare array, one or two
//! levels of `data`, or occasionally an object keyed by id whose values are
//! the records. [`ShapeNormalizer`] extracts the collection from any of these
//! and degrades to an empty list for anything else.

use serde::Serialize;
use serde_json::Value;

/// Which envelope case matched a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// The response is the collection itself
    BareArray,
    /// `{data: [...]}`
    Data,
    /// `{data: {data: [...]}}`
    NestedData,
    /// `{data: {k1: {...}, k2: {...}}}`, values taken as records
    KeyedObject,
    /// Nothing recognizable; normalizes to an empty list
    Unrecognized,
}

impl Shape {
    /// Whether this shape indicates an unexpected backend contract.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Shape::KeyedObject | Shape::Unrecognized)
    }
}

/// Extracts the record collection from a response envelope.
#[derive(Debug, Clone)]
pub struct ShapeNormalizer {
    data_key: String,
}

impl ShapeNormalizer {
    /// Create a normalizer that unwraps the `data` key.
    pub fn new() -> Self {
        Self::with_data_key("data")
    }

    /// Create a normalizer that unwraps a custom envelope key.
    pub fn with_data_key(data_key: impl Into<String>) -> Self {
        Self {
            data_key: data_key.into(),
        }
    }

    /// Classify a response without extracting anything.
    pub fn detect(&self, response: &Value) -> Shape {
        if response.is_array() {
            return Shape::BareArray;
        }
        match response.get(&self.data_key) {
            Some(Value::Array(_)) => Shape::Data,
            Some(inner @ Value::Object(_)) => match inner.get(&self.data_key) {
                Some(Value::Array(_)) => Shape::NestedData,
                _ => Shape::KeyedObject,
            },
            _ => Shape::Unrecognized,
        }
    }

    /// Extract the collection. First matching case wins; never fails.
    pub fn normalize(&self, response: &Value) -> Vec<Value> {
        let shape = self.detect(response);
        match shape {
            Shape::BareArray => response.as_array().cloned().unwrap_or_default(),
            Shape::Data => self.inner_array(response),
            Shape::NestedData => response
                .get(&self.data_key)
                .map(|inner| self.inner_array(inner))
                .unwrap_or_default(),
            Shape::KeyedObject => {
                let items: Vec<Value> = response
                    .get(&self.data_key)
                    .and_then(Value::as_object)
                    .map(|map| map.values().filter(|v| v.is_object()).cloned().collect())
                    .unwrap_or_default();
                log::warn!(
                    "Unexpected envelope: '{}' is an object, using its {} record value(s)",
                    self.data_key,
                    items.len()
                );
                items
            }
            Shape::Unrecognized => {
                log::warn!(
                    "Unrecognized envelope ({}), normalizing to an empty collection",
                    describe(response)
                );
                Vec::new()
            }
        }
    }

    /// Same as [`normalize`](Self::normalize) but consumes the response,
    /// avoiding a copy of the collection.
    pub fn normalize_owned(&self, response: Value) -> Vec<Value> {
        match self.detect(&response) {
            Shape::BareArray => match response {
                Value::Array(items) => items,
                _ => Vec::new(),
            },
            Shape::Data => match response {
                Value::Object(mut map) => match map.remove(&self.data_key) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            },
            _ => self.normalize(&response),
        }
    }

    fn inner_array(&self, value: &Value) -> Vec<Value> {
        value
            .get(&self.data_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for ShapeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without a usable data key",
    }
}

/// Normalize a response with the default `data` key.
pub fn normalize(response: &Value) -> Vec<Value> {
    ShapeNormalizer::new().normalize(response)
}

/// Classify a response with the default `data` key.
pub fn detect_shape(response: &Value) -> Shape {
    ShapeNormalizer::new().detect(response)
}
