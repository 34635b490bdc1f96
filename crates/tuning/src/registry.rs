//! The authoritative store of live parameters.
//!
//! Entries are declared once through [`ParamSpec`] and keep their kind for
//! the lifetime of the registry. Iteration always follows declaration order,
//! which is what the overlay and the frame synchronizer rely on.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{ConsoleError, Result};
use crate::value::{Bounds, Value, ValueKind};

/// Maximum element count for bounded sequences unless a spec overrides it.
pub const SEQUENCE_CAPACITY: usize = 100;

/// Declaration of a single named parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    name: String,
    default: Value,
    uniform: Option<String>,
    bounds: Option<Bounds>,
    capacity: usize,
    count_uniform: Option<String>,
    last_uniform: Option<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default,
            uniform: None,
            bounds: None,
            capacity: SEQUENCE_CAPACITY,
            count_uniform: None,
            last_uniform: None,
        }
    }

    pub fn float(name: impl Into<String>, default: f32) -> Self {
        Self::new(name, Value::Float(default))
    }

    pub fn int(name: impl Into<String>, default: i32) -> Self {
        Self::new(name, Value::Int(default))
    }

    pub fn flag(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, Value::Bool(default))
    }

    pub fn vec3(name: impl Into<String>, default: [f32; 3]) -> Self {
        Self::new(name, Value::Vec3(default))
    }

    pub fn float_seq(name: impl Into<String>, default: Vec<f32>) -> Self {
        Self::new(name, Value::FloatSeq(default))
    }

    pub fn vec3_seq(name: impl Into<String>, default: Vec<[f32; 3]>) -> Self {
        Self::new(name, Value::Vec3Seq(default))
    }

    /// Shader uniform that receives this parameter every frame.
    pub fn uniform(mut self, uniform: impl Into<String>) -> Self {
        self.uniform = Some(uniform.into());
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some(Bounds::new(min, max));
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Uniform receiving the current element count of a sequence.
    pub fn count_uniform(mut self, uniform: impl Into<String>) -> Self {
        self.count_uniform = Some(uniform.into());
        self
    }

    /// Uniform receiving the last element of a float sequence.
    pub fn last_uniform(mut self, uniform: impl Into<String>) -> Self {
        self.last_uniform = Some(uniform.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn uniform_name(&self) -> Option<&str> {
        self.uniform.as_deref()
    }

    pub fn bounds_range(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn sequence_capacity(&self) -> usize {
        self.capacity
    }

    pub fn count_uniform_name(&self) -> Option<&str> {
        self.count_uniform.as_deref()
    }

    pub fn last_uniform_name(&self) -> Option<&str> {
        self.last_uniform.as_deref()
    }

    fn uniform_names(&self) -> impl Iterator<Item = &str> {
        [
            self.uniform.as_deref(),
            self.count_uniform.as_deref(),
            self.last_uniform.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    fn validate(&self, value: &Value) -> Result<()> {
        if value.kind() != self.kind() {
            return Err(ConsoleError::TypeMismatch {
                name: self.name.clone(),
                expected: self.kind(),
                found: value.kind(),
            });
        }
        if let Some(len) = value.len() {
            if len > self.capacity {
                return Err(ConsoleError::CapacityExceeded {
                    name: self.name.clone(),
                    len,
                    capacity: self.capacity,
                });
            }
        }
        if let Some(bounds) = self.bounds {
            if let Some(outside) = value.first_out_of(bounds) {
                return Err(ConsoleError::OutOfRange {
                    name: self.name.clone(),
                    value: outside,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Entry {
    spec: ParamSpec,
    value: Value,
}

/// Ordered, typed set of live parameters.
#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ParameterRegistry {
    /// Builds a registry from declarations, validating every default.
    ///
    /// A default that violates its own capacity or bounds is rejected here so
    /// a session can never start from an invalid registry.
    pub fn new(specs: impl IntoIterator<Item = ParamSpec>) -> Result<Self> {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        let mut uniforms: HashMap<String, String> = HashMap::new();

        for spec in specs {
            if index.contains_key(spec.name()) {
                return Err(ConsoleError::DuplicateParameter(spec.name.clone()));
            }
            for uniform in spec.uniform_names() {
                if uniforms
                    .insert(uniform.to_string(), spec.name.clone())
                    .is_some()
                {
                    return Err(ConsoleError::DuplicateParameter(uniform.to_string()));
                }
            }
            spec.validate(&spec.default)?;
            index.insert(spec.name.clone(), entries.len());
            entries.push(Entry {
                value: spec.default.clone(),
                spec,
            });
        }

        Ok(Self { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn spec(&self, name: &str) -> Result<&ParamSpec> {
        self.entry(name).map(|entry| &entry.spec)
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.entry(name).map(|entry| &entry.value)
    }

    pub fn float(&self, name: &str) -> Result<f32> {
        match self.get(name)? {
            Value::Float(v) => Ok(*v),
            other => Err(self.mismatch(name, ValueKind::Float, other.kind())),
        }
    }

    pub fn int(&self, name: &str) -> Result<i32> {
        match self.get(name)? {
            Value::Int(v) => Ok(*v),
            other => Err(self.mismatch(name, ValueKind::Int, other.kind())),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.get(name)? {
            Value::Bool(v) => Ok(*v),
            other => Err(self.mismatch(name, ValueKind::Bool, other.kind())),
        }
    }

    /// Stores an already validated value.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let entry = self.entry_mut(name)?;
        entry.spec.validate(&value)?;
        entry.value = value;
        Ok(())
    }

    /// Clamps numeric components into the declared bounds, then stores.
    pub fn set_clamped(&mut self, name: &str, value: Value) -> Result<()> {
        let value = match self.spec(name)?.bounds {
            Some(bounds) => value.clamped(bounds),
            None => value,
        };
        self.set(name, value)
    }

    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let entry = self.entry_mut(name)?;
        match &mut entry.value {
            Value::Bool(flag) => {
                *flag = !*flag;
                Ok(*flag)
            }
            other => Err(ConsoleError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Bool,
                found: other.kind(),
            }),
        }
    }

    /// Advances an integer mode index, wrapping at `modulus`.
    pub fn cycle(&mut self, name: &str, modulus: i32) -> Result<i32> {
        let current = self.int(name)?;
        if modulus <= 0 {
            return Err(ConsoleError::OutOfRange {
                name: name.to_string(),
                value: f64::from(modulus),
                min: 1.0,
                max: f64::from(i32::MAX),
            });
        }
        let next = (current.rem_euclid(modulus) + 1) % modulus;
        self.set(name, Value::Int(next))?;
        Ok(next)
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&ParamSpec, &Value)> {
        self.entries.iter().map(|entry| (&entry.spec, &entry.value))
    }

    /// `name=value` pairs in declaration order, formatted for display.
    pub fn summary(&self) -> Vec<String> {
        self.entries()
            .map(|(spec, value)| format!("{}={}", spec.name(), value))
            .collect()
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.index
            .get(name)
            .map(|&slot| &self.entries[slot])
            .ok_or_else(|| ConsoleError::UnknownParameter(name.to_string()))
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut Entry> {
        match self.index.get(name) {
            Some(&slot) => Ok(&mut self.entries[slot]),
            None => Err(ConsoleError::UnknownParameter(name.to_string())),
        }
    }

    fn mismatch(&self, name: &str, expected: ValueKind, found: ValueKind) -> ConsoleError {
        ConsoleError::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
        }
    }
}
