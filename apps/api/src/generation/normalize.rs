//! Shape validation for model output, with default substitution and provenance.
//!
//! Every read goes through `Fields`. When a required field is absent, of the wrong type,
//! or empty, the reader returns the caller's default and records the field path in
//! `Provenance`, so callers can tell generated values from substituted defaults.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// The model returned valid JSON of the wrong overall shape.
#[derive(Debug, Error)]
#[error("expected {expected} at `{path}`, found {found}")]
pub struct ShapeError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

/// Field paths whose values were substituted by defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
    defaulted: BTreeSet<String>,
}

impl Provenance {
    pub fn record(&mut self, path: impl Into<String>) {
        self.defaulted.insert(path.into());
    }

    #[cfg(test)]
    pub fn is_defaulted(&self, path: &str) -> bool {
        self.defaulted.contains(path)
    }

    pub fn len(&self) -> usize {
        self.defaulted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaulted.is_empty()
    }

    pub fn into_fields(self) -> Vec<String> {
        self.defaulted.into_iter().collect()
    }
}

/// A normalized document together with the fields that were defaulted.
#[derive(Debug, Clone, Serialize)]
pub struct Normalized<T> {
    pub document: T,
    pub defaulted_fields: Vec<String>,
}

impl<T> Normalized<T> {
    pub fn new(document: T, provenance: Provenance) -> Self {
        Self {
            document,
            defaulted_fields: provenance.into_fields(),
        }
    }

    pub fn is_fully_generated(&self) -> bool {
        self.defaulted_fields.is_empty()
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read-only view over one JSON object at a known path.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
}

/// Owned variant used for array items, whose paths are built at runtime.
#[derive(Debug, Clone)]
pub struct ItemFields<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    /// The root of a model reply. Anything but an object is a shape error.
    pub fn root(value: &'a Value) -> Result<Self, ShapeError> {
        match value {
            Value::Object(map) => Ok(Self { map, path: "" }),
            other => Err(ShapeError {
                path: "$".to_string(),
                expected: "object",
                found: json_type_name(other),
            }),
        }
    }
}

macro_rules! field_readers {
    ($ty:ident) => {
        impl<'a> $ty<'a> {
            fn path_of(&self, key: &str) -> String {
                if self.path.is_empty() {
                    key.to_string()
                } else {
                    format!("{}.{}", self.path, key)
                }
            }

            pub fn path(&self) -> &str {
                &self.path
            }

            pub fn get(&self, key: &str) -> Option<&'a Value> {
                self.map.get(key)
            }

            pub fn text(&self, provenance: &mut Provenance, key: &str, default: &str) -> String {
                match self.optional_text(key) {
                    Some(text) => text,
                    None => {
                        provenance.record(self.path_of(key));
                        default.to_string()
                    }
                }
            }

            /// Non-empty string, never recorded as defaulted.
            pub fn optional_text(&self, key: &str) -> Option<String> {
                match self.map.get(key) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    _ => None,
                }
            }

            pub fn text_list(
                &self,
                provenance: &mut Provenance,
                key: &str,
                default: &[&str],
            ) -> Vec<String> {
                let items = self.optional_text_list(key);
                if items.is_empty() {
                    provenance.record(self.path_of(key));
                    default.iter().map(|s| s.to_string()).collect()
                } else {
                    items
                }
            }

            /// Non-empty string items; a bare string is treated as a one-item list.
            pub fn optional_text_list(&self, key: &str) -> Vec<String> {
                match self.map.get(key) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                    Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
                    _ => Vec::new(),
                }
            }

            /// An explicit array is the model's answer, even when empty. Anything else is
            /// recorded and read as an empty list.
            pub fn declared_text_list(&self, provenance: &mut Provenance, key: &str) -> Vec<String> {
                match self.map.get(key) {
                    Some(Value::Array(_)) => self.optional_text_list(key),
                    _ => {
                        provenance.record(self.path_of(key));
                        Vec::new()
                    }
                }
            }

            /// Accepts JSON numbers and numeric strings ("85", "85%", "85.4").
            pub fn integer(&self, provenance: &mut Provenance, key: &str, default: i64) -> i64 {
                match self.optional_integer(key) {
                    Some(n) => n,
                    None => {
                        provenance.record(self.path_of(key));
                        default
                    }
                }
            }

            pub fn optional_integer(&self, key: &str) -> Option<i64> {
                match self.map.get(key)? {
                    Value::Number(n) => n
                        .as_i64()
                        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
                    Value::String(s) => s
                        .trim()
                        .trim_end_matches('%')
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.round() as i64),
                    _ => None,
                }
            }

            pub fn optional_number(&self, key: &str) -> Option<f64> {
                let number = match self.map.get(key)? {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                number.filter(|f| f.is_finite())
            }

            pub fn object(&self, key: &str) -> Option<ItemFields<'a>> {
                match self.map.get(key) {
                    Some(Value::Object(map)) => Some(ItemFields {
                        map,
                        path: self.path_of(key),
                    }),
                    _ => None,
                }
            }

            /// Object items of the array at `key`, with indexed paths. Non-object items
            /// are skipped.
            pub fn object_list(&self, key: &str) -> Vec<ItemFields<'a>> {
                let base = self.path_of(key);
                match self.map.get(key) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .enumerate()
                        .filter_map(|(i, v)| match v {
                            Value::Object(map) => Some(ItemFields {
                                map,
                                path: format!("{base}[{i}]"),
                            }),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                }
            }

            /// Maps every object item at `key`. An absent or empty list becomes `default()`
            /// and the list path is recorded.
            pub fn records<T>(
                &self,
                provenance: &mut Provenance,
                key: &str,
                mut map: impl FnMut(&ItemFields<'a>, &mut Provenance) -> T,
                default: impl FnOnce() -> Vec<T>,
            ) -> Vec<T> {
                let items = self.object_list(key);
                if items.is_empty() {
                    provenance.record(self.path_of(key));
                    return default();
                }
                items.iter().map(|item| map(item, provenance)).collect()
            }

            /// Like `records`, but an explicit empty array stands. Only an absent or
            /// wrong-typed list is recorded.
            pub fn declared_records<T>(
                &self,
                provenance: &mut Provenance,
                key: &str,
                mut map: impl FnMut(&ItemFields<'a>, &mut Provenance) -> T,
            ) -> Vec<T> {
                if !matches!(self.map.get(key), Some(Value::Array(_))) {
                    provenance.record(self.path_of(key));
                    return Vec::new();
                }
                self.object_list(key)
                    .iter()
                    .map(|item| map(item, provenance))
                    .collect()
            }
        }
    };
}

field_readers!(Fields);
field_readers!(ItemFields);
