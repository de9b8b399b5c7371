//! Core type system for tfplug
//!
//! This module provides the attribute tree used for configuration and state
//! (`Dynamic` / `DynamicValue`), attribute paths, diagnostics and the
//! persisted `ResourceState`.

use crate::error::{Result, TfplugError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dynamic represents Terraform values that can be of any type
/// This is the core type for all configuration and state data
/// IMPORTANT: Prefer the typed accessors on DynamicValue over matching directly
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value (attribute not set)
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// String value
    String(String),
    /// List of values (ordered, allows duplicates)
    List(Vec<Dynamic>),
    /// Set of values (unordered, no duplicates)
    Set(Vec<Dynamic>),
    /// Map of string keys to values of one element type
    Map(HashMap<String, Dynamic>),
    /// Nested block with a fixed set of named attributes
    Object(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Dynamic)>) -> Self {
        Dynamic::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Dynamic::List(
            items
                .into_iter()
                .map(|s| Dynamic::String(s.into()))
                .collect(),
        )
    }

    pub fn string_map<K: Into<String>, V: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Dynamic::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), Dynamic::String(v.into())))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Dynamic::Unknown)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Dynamic::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Elements of a list or a set
    pub fn as_elements(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::List(items) | Dynamic::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map or an object
    pub fn as_entries(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Dynamic::Map(m) | Dynamic::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Int(_) => "int",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Set(_) => "set",
            Dynamic::Map(_) => "map",
            Dynamic::Object(_) => "object",
            Dynamic::Unknown => "unknown",
        }
    }

    /// Equality used for diffing: sets compare without regard to order,
    /// lists and sets compare by elements, maps and objects by entries.
    pub fn semantic_eq(&self, other: &Dynamic) -> bool {
        match (self, other) {
            (Dynamic::Set(a), Dynamic::Set(b)) => {
                a.len() == b.len()
                    && a.iter().all(|x| b.iter().any(|y| x.semantic_eq(y)))
                    && b.iter().all(|y| a.iter().any(|x| x.semantic_eq(y)))
            }
            (Dynamic::List(a), Dynamic::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.semantic_eq(y))
            }
            (Dynamic::Map(a), Dynamic::Map(b)) | (Dynamic::Object(a), Dynamic::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|v2| v.semantic_eq(v2)))
            }
            _ => self == other,
        }
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<i64> for Dynamic {
    fn from(value: i64) -> Self {
        Dynamic::Int(value)
    }
}

impl From<i32> for Dynamic {
    fn from(value: i32) -> Self {
        Dynamic::Int(value as i64)
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Int(n) => serializer.serialize_i64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) | Dynamic::Set(l) => l.serialize(serializer),
            Dynamic::Map(m) | Dynamic::Object(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str("__unknown__"),
        }
    }
}

// Sets and objects are indistinguishable on the wire: they decode as lists
// and maps. Schema::conform restores the declared shape.
impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Dynamic, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                Dynamic::deserialize(deserializer)
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                Ok(Dynamic::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Dynamic::Int)
                    .map_err(|_| E::custom(format!("integer {} out of range", value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    Ok(Dynamic::Int(value as i64))
                } else {
                    Err(E::custom(format!("non-integer number {}", value)))
                }
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Dynamic, E>
            where
                E: de::Error,
            {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValue wraps the root of an attribute tree and provides path-based
/// access plus encoding for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    /// An empty object, the usual starting point for building state
    pub fn empty_object() -> Self {
        Self {
            value: Dynamic::Object(HashMap::new()),
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        match &self.value {
            Dynamic::Null => Ok(vec![]),
            _ => rmp_serde::encode::to_vec_named(&self.value)
                .map_err(|e| TfplugError::EncodingError(format!("msgpack encoding failed: {}", e))),
        }
    }

    pub fn decode_msgpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }

        rmp_serde::decode::from_slice::<Dynamic>(data)
            .map(Self::new)
            .map_err(|e| TfplugError::DecodingError(format!("msgpack decoding failed: {}", e)))
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfplugError::EncodingError(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(data)
            .map_err(|e| TfplugError::DecodingError(format!("json decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    /// Raw lookup, None when any step of the path is missing
    pub fn get(&self, path: &AttributePath) -> Option<&Dynamic> {
        self.navigate_path(path).ok()
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", value)),
        }
    }

    pub fn get_int(&self, path: &AttributePath) -> Result<i64> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Int(n) => Ok(*n),
            _ => Err(mismatch("int", value)),
        }
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Bool(b) => Ok(*b),
            _ => Err(mismatch("bool", value)),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        let value = self.navigate_path(path)?;
        value
            .as_elements()
            .map(|items| items.to_vec())
            .ok_or_else(|| mismatch("list", value))
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        let value = self.navigate_path(path)?;
        value
            .as_entries()
            .cloned()
            .ok_or_else(|| mismatch("map", value))
    }

    pub fn set_string(&mut self, path: &AttributePath, value: impl Into<String>) -> Result<()> {
        self.set_value(path, Dynamic::String(value.into()))
    }

    pub fn set_int(&mut self, path: &AttributePath, value: i64) -> Result<()> {
        self.set_value(path, Dynamic::Int(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_map(&mut self, path: &AttributePath, value: HashMap<String, Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::Map(value))
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_unknown()
    }

    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Unknown)
    }

    fn navigate_path<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (
                    Dynamic::Map(m) | Dynamic::Object(m),
                    AttributePathStep::AttributeName(name) | AttributePathStep::ElementKeyString(name),
                ) => m.get(name).ok_or_else(|| {
                    TfplugError::Custom(format!("attribute '{}' not found", name))
                })?,
                (Dynamic::List(l) | Dynamic::Set(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    l.get(idx).ok_or_else(|| {
                        TfplugError::Custom(format!("list index {} out of bounds", idx))
                    })?
                }
                _ => return Err(TfplugError::Custom("invalid path navigation".to_string())),
            };
        }

        Ok(current)
    }

    /// Sets a value, creating intermediate objects for attribute steps.
    /// List indices must already exist.
    pub fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        let Some((last, parents)) = path.steps.split_last() else {
            self.value = new_value;
            return Ok(());
        };

        if !matches!(self.value, Dynamic::Map(_) | Dynamic::Object(_)) {
            self.value = Dynamic::Object(HashMap::new());
        }

        let mut current = &mut self.value;
        for step in parents {
            current = match (current, step) {
                (
                    Dynamic::Map(m) | Dynamic::Object(m),
                    AttributePathStep::AttributeName(name) | AttributePathStep::ElementKeyString(name),
                ) => {
                    let entry = m
                        .entry(name.clone())
                        .or_insert_with(|| Dynamic::Object(HashMap::new()));
                    if entry.is_null() {
                        *entry = Dynamic::Object(HashMap::new());
                    }
                    entry
                }
                (Dynamic::List(l) | Dynamic::Set(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let len = l.len();
                    l.get_mut(*idx as usize).ok_or_else(|| {
                        TfplugError::Custom(format!("list index {} out of bounds ({})", idx, len))
                    })?
                }
                _ => return Err(TfplugError::Custom("invalid path navigation".to_string())),
            };
        }

        match (current, last) {
            (
                Dynamic::Map(m) | Dynamic::Object(m),
                AttributePathStep::AttributeName(name) | AttributePathStep::ElementKeyString(name),
            ) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Dynamic::List(l) | Dynamic::Set(l), AttributePathStep::ElementKeyInt(idx)) => {
                let len = l.len();
                let slot = l.get_mut(*idx as usize).ok_or_else(|| {
                    TfplugError::Custom(format!("list index {} out of bounds ({})", idx, len))
                })?;
                *slot = new_value;
                Ok(())
            }
            _ => Err(TfplugError::Custom("invalid path navigation".to_string())),
        }
    }
}

fn mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                AttributePathStep::AttributeName(name) => write!(f, ".{}", name)?,
                AttributePathStep::ElementKeyString(key) => write!(f, "[{:?}]", key)?,
                AttributePathStep::ElementKeyInt(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributePathStep {
    /// Access attribute by name in object/map
    AttributeName(String),
    /// Access element by string key (for maps)
    ElementKeyString(String),
    /// Access element by integer index (for lists)
    ElementKeyInt(i64),
}

/// One live remote object as last observed: its identity plus attributes.
/// An empty id means the object is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: String,
    pub attributes: DynamicValue,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, attributes: DynamicValue) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    pub fn absent() -> Self {
        Self {
            id: String::new(),
            attributes: DynamicValue::null(),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    /// Top-level string attribute, None when unset or empty
    pub fn string_attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .get_string(&AttributePath::new(name))
            .ok()
            .filter(|s| !s.is_empty())
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| TfplugError::EncodingError(format!("state encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| TfplugError::DecodingError(format!("state decoding failed: {}", e)))
    }

    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::encode::to_vec_named(self)
            .map_err(|e| TfplugError::EncodingError(format!("state encoding failed: {}", e)))
    }

    pub fn decode_msgpack(data: &[u8]) -> Result<Self> {
        rmp_serde::decode::from_slice(data)
            .map_err(|e| TfplugError::DecodingError(format!("state decoding failed: {}", e)))
    }
}

/// Diagnostic represents a warning or error from the provider
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl From<&TfplugError> for Diagnostic {
    fn from(err: &TfplugError) -> Self {
        let diagnostic = Diagnostic::error(err.summary(), err.to_string());
        match err {
            TfplugError::Validation { attribute, .. } => {
                diagnostic.with_attribute(AttributePath::new(attribute))
            }
            _ => diagnostic,
        }
    }
}

impl From<TfplugError> for Diagnostic {
    fn from(err: TfplugError) -> Self {
        Diagnostic::from(&err)
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// True when any diagnostic is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Config represents configuration values
pub type Config = DynamicValue;
