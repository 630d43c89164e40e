//! Structural comparison that ignores empty desired fields.
//!
//! Both sides are compared in their JSON form. A desired value of `null`,
//! `""`, `0`, `false`, `[]` or `{}` expresses no opinion: it is never
//! reported as a difference and never overwrites the existing value.
//! Objects are walked key by key, arrays and scalars compare as a whole.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// True for values treated as "no opinion" in a desired object
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Field paths where a non-empty desired value differs from the existing one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecDiff {
    fields: BTreeMap<String, (Option<Value>, Value)>,
}

impl SpecDiff {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Dotted paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Display for SpecDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (path, (existing, desired))) in self.fields.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            match existing {
                Some(existing) => write!(f, "{}: {} -> {}", path, existing, desired)?,
                None => write!(f, "{}: <none> -> {}", path, desired)?,
            }
        }
        Ok(())
    }
}

/// Compare `existing` against `desired`, skipping fields empty in `desired`
pub fn compare_ignore_target_empties(existing: &Value, desired: &Value) -> SpecDiff {
    let mut diff = SpecDiff::default();
    walk("", Some(existing), desired, &mut diff.fields);
    diff
}

fn walk(
    path: &str,
    existing: Option<&Value>,
    desired: &Value,
    out: &mut BTreeMap<String, (Option<Value>, Value)>,
) {
    if is_empty_value(desired) {
        return;
    }

    if let Value::Object(fields) = desired {
        for (key, value) in fields {
            let child = if path.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };
            walk(&child, existing.and_then(|e| e.get(key)), value, out);
        }
        return;
    }

    if existing != Some(desired) {
        out.insert(path.to_string(), (existing.cloned(), desired.clone()));
    }
}

/// `existing` with every non-empty value of `desired` laid on top
///
/// Applying the result and comparing again yields an empty diff.
pub fn overlay_non_empty(existing: &Value, desired: &Value) -> Value {
    if is_empty_value(desired) {
        return existing.clone();
    }

    match desired {
        Value::Object(fields) => {
            let mut merged = match existing {
                Value::Object(current) => current.clone(),
                _ => Map::new(),
            };
            for (key, value) in fields {
                if is_empty_value(value) {
                    continue;
                }
                let base = merged.get(key).cloned().unwrap_or(Value::Null);
                merged.insert(key.clone(), overlay_non_empty(&base, value));
            }
            Value::Object(merged)
        }
        other => other.clone(),
    }
}
