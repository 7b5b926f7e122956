//! Declarative response shapes
//!
//! Shapes describe which fields a provider payload must carry and what JSON
//! kind each one has. Checking a value walks the shape and collects every
//! violation instead of stopping at the first one, so a single error message
//! can describe everything that is wrong with a response.


use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The JSON kind a field is expected to have
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    /// Any JSON number
    Number,
    /// A JSON number without a fractional part
    Integer,
    String,
    Object(&'static Shape),
    /// An array whose items all have `item` kind, with at least `min_len` items
    Array {
        item: &'static Kind,
        min_len: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub required: bool,
}

impl Field {
    #[inline]
    pub const fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    #[inline]
    pub const fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A named set of fields. Fields not listed are ignored.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// A single field that does not conform to its shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for Violation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Every violation found while checking a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationFailure {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationFailure {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        f.write_str(&joined.join("; "))
    }
}

impl ValidationFailure {
    /// Returns true if any violation is reported for `path`
    #[inline]
    pub fn mentions(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

/// Types with a declared wire shape
pub trait Shaped: DeserializeOwned {
    const SHAPE: &'static Shape;
}

/// Check `value` against `T`'s shape and build the typed value
#[inline]
pub fn validate<T: Shaped>(value: Value) -> Result<T, ValidationFailure> {
    let violations = check(T::SHAPE, &value);
    if !violations.is_empty() {
        return Err(ValidationFailure { violations });
    }

    // A conforming value can still be rejected by serde when the shape is
    // looser than the target type, so report that as a violation too
    serde_json::from_value(value).map_err(|e| ValidationFailure {
        violations: vec![Violation {
            path: T::SHAPE.name.to_string(),
            reason: e.to_string(),
        }],
    })
}

/// Collect all violations of `shape` in `value`
#[inline]
pub fn check(shape: &Shape, value: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_object(shape, value, "", &mut violations);
    violations
}

fn check_object(shape: &Shape, value: &Value, path: &str, violations: &mut Vec<Violation>) {
    let Some(object) = value.as_object() else {
        violations.push(Violation {
            path: display_path(path, shape.name),
            reason: format!("expected object, found {}", kind_name(value)),
        });
        return;
    };

    for field in shape.fields {
        let field_path = join_path(path, field.name);
        match object.get(field.name) {
            None | Some(Value::Null) if !field.required => {}
            None => violations.push(Violation {
                path: field_path,
                reason: "required field is missing".to_string(),
            }),
            Some(field_value) => check_kind(&field.kind, field_value, &field_path, violations),
        }
    }
}

fn check_kind(kind: &Kind, value: &Value, path: &str, violations: &mut Vec<Violation>) {
    match kind {
        Kind::Number => {
            if !value.is_number() {
                violations.push(mismatch(path, "number", value));
            }
        }
        Kind::Integer => {
            if !(value.is_i64() || value.is_u64()) {
                violations.push(mismatch(path, "integer", value));
            }
        }
        Kind::String => {
            if !value.is_string() {
                violations.push(mismatch(path, "string", value));
            }
        }
        Kind::Object(shape) => {
            if value.is_object() {
                check_object(shape, value, path, violations);
            } else {
                violations.push(mismatch(path, "object", value));
            }
        }
        Kind::Array { item, min_len } => {
            let Some(items) = value.as_array() else {
                violations.push(mismatch(path, "array", value));
                return;
            };

            if items.len() < *min_len {
                violations.push(Violation {
                    path: path.to_string(),
                    reason: format!(
                        "expected at least {} item(s), found {}",
                        min_len,
                        items.len()
                    ),
                });
            }

            for (index, entry) in items.iter().enumerate() {
                check_kind(item, entry, &format!("{}[{}]", path, index), violations);
            }
        }
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> Violation {
    Violation {
        path: path.to_string(),
        reason: format!("expected {}, found {}", expected, kind_name(found)),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn display_path(path: &str, shape_name: &str) -> String {
    if path.is_empty() {
        format!("<{}>", shape_name)
    } else {
        path.to_string()
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
