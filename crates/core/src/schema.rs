// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiled payload schemas.
//!
//! Templates carry an optional JSON-Schema document. Only a subset of the
//! vocabulary is understood:
//!
//! - `type` (single name or list), `enum`, `const`
//! - objects: `properties`, `required`, `additionalProperties: false`
//! - strings: `pattern`, `minLength`, `maxLength`, `format` (email, ipv4, uuid)
//! - numbers: `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`
//! - arrays: `items`, `minItems`, `maxItems`
//!
//! Unknown keywords are ignored. Patterns are compiled once, when the schema
//! is compiled, so a bad pattern is reported at catalog load time.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Errors raised while compiling a schema document
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema at {path} must be an object")]
    NotAnObject { path: String },

    #[error("unknown type '{name}' at {path}")]
    UnknownType { path: String, name: String },

    #[error("invalid pattern '{pattern}' at {path}: {source}")]
    Pattern {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("keyword '{keyword}' at {path} expects {expected}")]
    InvalidKeyword {
        path: String,
        keyword: &'static str,
        expected: &'static str,
    },

    #[error("unknown format '{format}' at {path}")]
    UnknownFormat { path: String, format: String },
}

/// A schema ready to check values against
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    root: Node,
}

impl CompiledSchema {
    pub fn compile(schema: &Value) -> Result<Self, SchemaError> {
        Ok(Self {
            root: compile_node(schema, "#")?,
        })
    }

    /// Check `value`, returning one message per violation.
    ///
    /// `path` is the location reported for the root value, e.g. `/payload`.
    pub fn check(&self, value: &Value, path: &str) -> Vec<String> {
        let mut errors = Vec::new();
        self.root.check(value, path, None, &mut errors);
        errors
    }

    /// Like [`check`](Self::check), but ignores the top-level property
    /// `skip` entirely (neither required nor checked).
    pub fn check_except(&self, value: &Value, path: &str, skip: &str) -> Vec<String> {
        let mut errors = Vec::new();
        self.root.check(value, path, Some(skip), &mut errors);
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    fn parse(name: &str, path: &str) -> Result<Self, SchemaError> {
        Ok(match name {
            "string" => JsonType::String,
            "number" => JsonType::Number,
            "integer" => JsonType::Integer,
            "boolean" => JsonType::Boolean,
            "object" => JsonType::Object,
            "array" => JsonType::Array,
            "null" => JsonType::Null,
            other => {
                return Err(SchemaError::UnknownType {
                    path: path.to_string(),
                    name: other.to_string(),
                })
            }
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Number => value.is_number(),
            JsonType::Integer => is_integer(value),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Object => value.is_object(),
            JsonType::Array => value.is_array(),
            JsonType::Null => value.is_null(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Email,
    Ipv4,
    Uuid,
}

impl Format {
    fn parse(name: &str, path: &str) -> Result<Self, SchemaError> {
        match name {
            "email" => Ok(Format::Email),
            "ipv4" => Ok(Format::Ipv4),
            "uuid" => Ok(Format::Uuid),
            other => Err(SchemaError::UnknownFormat {
                path: path.to_string(),
                format: other.to_string(),
            }),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Ipv4 => "ipv4",
            Format::Uuid => "uuid",
        }
    }

    fn accepts(&self, s: &str) -> bool {
        match self {
            Format::Email => is_email(s),
            Format::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    types: Vec<JsonType>,
    required: Vec<String>,
    properties: BTreeMap<String, Node>,
    additional_properties: bool,
    enumeration: Option<Vec<Value>>,
    constant: Option<Value>,
    pattern: Option<Regex>,
    format: Option<Format>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_minimum: Option<f64>,
    exclusive_maximum: Option<f64>,
    items: Option<Box<Node>>,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            required: Vec::new(),
            properties: BTreeMap::new(),
            additional_properties: true,
            enumeration: None,
            constant: None,
            pattern: None,
            format: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            items: None,
            min_items: None,
            max_items: None,
        }
    }
}

fn invalid(path: &str, keyword: &'static str, expected: &'static str) -> SchemaError {
    SchemaError::InvalidKeyword {
        path: path.to_string(),
        keyword,
        expected,
    }
}

fn compile_node(schema: &Value, path: &str) -> Result<Node, SchemaError> {
    let obj = schema.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_string(),
    })?;
    let mut node = Node::default();

    if let Some(ty) = obj.get("type") {
        node.types = match ty {
            Value::String(name) => vec![JsonType::parse(name, path)?],
            Value::Array(names) => names
                .iter()
                .map(|n| {
                    n.as_str()
                        .ok_or_else(|| invalid(path, "type", "a type name or list of type names"))
                        .and_then(|n| JsonType::parse(n, path))
                })
                .collect::<Result<_, _>>()?,
            _ => return Err(invalid(path, "type", "a type name or list of type names")),
        };
    }

    if let Some(required) = obj.get("required") {
        node.required = required
            .as_array()
            .and_then(|keys| {
                keys.iter()
                    .map(|k| k.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or_else(|| invalid(path, "required", "a list of property names"))?;
    }

    if let Some(properties) = obj.get("properties") {
        let properties = properties
            .as_object()
            .ok_or_else(|| invalid(path, "properties", "an object"))?;
        for (key, sub) in properties {
            let sub_path = format!("{}/properties/{}", path, key);
            node.properties
                .insert(key.clone(), compile_node(sub, &sub_path)?);
        }
    }

    match obj.get("additionalProperties") {
        None => {}
        Some(Value::Bool(allowed)) => node.additional_properties = *allowed,
        Some(_) => return Err(invalid(path, "additionalProperties", "a boolean")),
    }

    if let Some(options) = obj.get("enum") {
        let options = options
            .as_array()
            .ok_or_else(|| invalid(path, "enum", "a list of values"))?;
        node.enumeration = Some(options.clone());
    }

    node.constant = obj.get("const").cloned();

    if let Some(pattern) = obj.get("pattern") {
        let pattern = pattern
            .as_str()
            .ok_or_else(|| invalid(path, "pattern", "a string"))?;
        let regex = Regex::new(pattern).map_err(|source| SchemaError::Pattern {
            path: path.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        node.pattern = Some(regex);
    }

    if let Some(format) = obj.get("format") {
        let format = format
            .as_str()
            .ok_or_else(|| invalid(path, "format", "a string"))?;
        node.format = Some(Format::parse(format, path)?);
    }

    node.min_length = count_keyword(obj, "minLength", path)?;
    node.max_length = count_keyword(obj, "maxLength", path)?;
    node.min_items = count_keyword(obj, "minItems", path)?;
    node.max_items = count_keyword(obj, "maxItems", path)?;
    node.minimum = number_keyword(obj, "minimum", path)?;
    node.maximum = number_keyword(obj, "maximum", path)?;
    node.exclusive_minimum = number_keyword(obj, "exclusiveMinimum", path)?;
    node.exclusive_maximum = number_keyword(obj, "exclusiveMaximum", path)?;

    if let Some(items) = obj.get("items") {
        if !items.is_object() {
            return Err(invalid(path, "items", "a schema object"));
        }
        let items_path = format!("{}/items", path);
        node.items = Some(Box::new(compile_node(items, &items_path)?));
    }

    Ok(node)
}

fn count_keyword(
    obj: &Map<String, Value>,
    keyword: &'static str,
    path: &str,
) -> Result<Option<usize>, SchemaError> {
    obj.get(keyword)
        .map(|v| {
            v.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid(path, keyword, "a non-negative integer"))
        })
        .transpose()
}

fn number_keyword(
    obj: &Map<String, Value>,
    keyword: &'static str,
    path: &str,
) -> Result<Option<f64>, SchemaError> {
    obj.get(keyword)
        .map(|v| v.as_f64().ok_or_else(|| invalid(path, keyword, "a number")))
        .transpose()
}

impl Node {
    fn check(&self, value: &Value, path: &str, skip: Option<&str>, errors: &mut Vec<String>) {
        if !self.types.is_empty() && !self.types.iter().any(|t| t.accepts(value)) {
            let expected: Vec<&str> = self.types.iter().map(JsonType::as_str).collect();
            errors.push(format!(
                "{}: expected {}, got {}",
                path,
                expected.join(" or "),
                type_name(value)
            ));
            // Remaining keywords are meaningless for a value of the wrong type
            return;
        }

        if let Some(constant) = &self.constant {
            if value != constant {
                errors.push(format!("{}: must equal {}", path, constant));
            }
        }

        if let Some(options) = &self.enumeration {
            if !options.contains(value) {
                let rendered: Vec<String> = options.iter().map(Value::to_string).collect();
                errors.push(format!(
                    "{}: {} is not one of [{}]",
                    path,
                    value,
                    rendered.join(", ")
                ));
            }
        }

        match value {
            Value::String(s) => self.check_string(s, path, errors),
            Value::Number(n) => {
                if let Some(x) = n.as_f64() {
                    self.check_number(x, path, errors);
                }
            }
            Value::Array(items) => self.check_array(items, path, errors),
            Value::Object(map) => self.check_object(map, path, skip, errors),
            Value::Bool(_) | Value::Null => {}
        }
    }

    fn check_string(&self, s: &str, path: &str, errors: &mut Vec<String>) {
        let len = s.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                errors.push(format!(
                    "{}: must be at least {} characters long, got {}",
                    path, min, len
                ));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                errors.push(format!(
                    "{}: must be at most {} characters long, got {}",
                    path, max, len
                ));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                errors.push(format!(
                    "{}: '{}' does not match pattern '{}'",
                    path,
                    s,
                    pattern.as_str()
                ));
            }
        }
        if let Some(format) = self.format {
            if !format.accepts(s) {
                errors.push(format!(
                    "{}: '{}' is not a valid {}",
                    path,
                    s,
                    format.as_str()
                ));
            }
        }
    }

    fn check_number(&self, x: f64, path: &str, errors: &mut Vec<String>) {
        if let Some(min) = self.minimum {
            if x < min {
                errors.push(format!("{}: {} is less than the minimum of {}", path, x, min));
            }
        }
        if let Some(max) = self.maximum {
            if x > max {
                errors.push(format!("{}: {} is greater than the maximum of {}", path, x, max));
            }
        }
        if let Some(min) = self.exclusive_minimum {
            if x <= min {
                errors.push(format!("{}: {} must be greater than {}", path, x, min));
            }
        }
        if let Some(max) = self.exclusive_maximum {
            if x >= max {
                errors.push(format!("{}: {} must be less than {}", path, x, max));
            }
        }
    }

    fn check_array(&self, items: &[Value], path: &str, errors: &mut Vec<String>) {
        if let Some(min) = self.min_items {
            if items.len() < min {
                errors.push(format!(
                    "{}: must contain at least {} items, got {}",
                    path,
                    min,
                    items.len()
                ));
            }
        }
        if let Some(max) = self.max_items {
            if items.len() > max {
                errors.push(format!(
                    "{}: must contain at most {} items, got {}",
                    path,
                    max,
                    items.len()
                ));
            }
        }
        if let Some(item_schema) = &self.items {
            for (i, item) in items.iter().enumerate() {
                item_schema.check(item, &format!("{}/{}", path, i), None, errors);
            }
        }
    }

    fn check_object(
        &self,
        map: &Map<String, Value>,
        path: &str,
        skip: Option<&str>,
        errors: &mut Vec<String>,
    ) {
        let skipped = |key: &str| skip == Some(key);

        for key in &self.required {
            if !skipped(key) && !map.contains_key(key) {
                errors.push(format!("{}: missing required property '{}'", path, key));
            }
        }

        for (key, value) in map {
            if skipped(key) {
                continue;
            }
            match self.properties.get(key) {
                Some(sub) => sub.check(value, &format!("{}/{}", path, key), None, errors),
                None if !self.additional_properties => {
                    errors.push(format!("{}: unexpected property '{}'", path, key));
                }
                None => {}
            }
        }
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) if is_integer(value) => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
