//! The two-scope variable store threaded through one build.
//!
//! Lifetime is exactly one build invocation: the caller seeds both scopes,
//! the pipeline mutates them in place, and the final maps are returned for
//! caller-managed persistence. There is no ambient store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which scope a variable operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    Local,
    Global,
}

/// Local and global key/value maps, mutated in place during a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableContext {
    pub local: HashMap<String, Value>,
    pub global: HashMap<String, Value>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed both scopes from caller-owned maps.
    pub fn seeded(local: HashMap<String, Value>, global: HashMap<String, Value>) -> Self {
        Self { local, global }
    }

    fn store(&self, scope: VariableScope) -> &HashMap<String, Value> {
        match scope {
            VariableScope::Local => &self.local,
            VariableScope::Global => &self.global,
        }
    }

    fn store_mut(&mut self, scope: VariableScope) -> &mut HashMap<String, Value> {
        match scope {
            VariableScope::Local => &mut self.local,
            VariableScope::Global => &mut self.global,
        }
    }

    pub fn get(&self, scope: VariableScope, name: &str) -> Option<&Value> {
        self.store(scope).get(name)
    }

    pub fn set(&mut self, scope: VariableScope, name: impl Into<String>, value: Value) {
        self.store_mut(scope).insert(name.into(), value);
    }

    pub fn delete(&mut self, scope: VariableScope, name: &str) -> Option<Value> {
        self.store_mut(scope).remove(name)
    }

    /// Snapshot of one scope's map.
    pub fn list(&self, scope: VariableScope) -> HashMap<String, Value> {
        self.store(scope).clone()
    }

    /// Add `value` to an existing variable: numeric addition when both
    /// sides coerce to numbers, string concatenation otherwise. A missing
    /// variable takes `value` as-is.
    pub fn add(&mut self, scope: VariableScope, name: &str, value: Value) {
        let store = self.store_mut(scope);
        let next = match store.get(name) {
            None => value,
            Some(current) => match (as_number(current), as_number(&value)) {
                (Some(a), Some(b)) => json_number(a + b),
                _ => Value::String(format!(
                    "{}{}",
                    stringify_value(Some(current)),
                    stringify_value(Some(&value))
                )),
            },
        };
        store.insert(name.to_string(), next);
    }

    /// Increment a variable by one; non-numeric values restart from 0.
    pub fn inc(&mut self, scope: VariableScope, name: &str) {
        let store = self.store_mut(scope);
        let base = store.get(name).and_then(as_number).unwrap_or(0.0);
        store.insert(name.to_string(), json_number(base + 1.0));
    }

    /// Decrement a variable by one; non-numeric values restart from 0.
    pub fn dec(&mut self, scope: VariableScope, name: &str) {
        let store = self.store_mut(scope);
        let base = store.get(name).and_then(as_number).unwrap_or(0.0);
        store.insert(name.to_string(), json_number(base - 1.0));
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn json_number(n: f64) -> Value {
    // Integral results stay integral so `1 + 1` prints as `2`, not `2.0`.
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Render a variable value for macro output: missing or null is empty,
/// strings are literal, numbers and booleans print plainly, and structured
/// values render as compact JSON.
pub fn stringify_value(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}
