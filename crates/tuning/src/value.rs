use std::fmt;

use serde::Serialize;

/// Declared type of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Float,
    Int,
    Bool,
    Vec3,
    FloatSeq,
    Vec3Seq,
}

impl ValueKind {
    pub fn is_sequence(self) -> bool {
        matches!(self, ValueKind::FloatSeq | ValueKind::Vec3Seq)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Float => f.write_str("float"),
            ValueKind::Int => f.write_str("int"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Vec3 => f.write_str("vec3"),
            ValueKind::FloatSeq => f.write_str("float[]"),
            ValueKind::Vec3Seq => f.write_str("vec3[]"),
        }
    }
}

/// A tagged parameter value.
///
/// Sequences are bounded by the capacity of the parameter that holds them;
/// the value itself carries no limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec3([f32; 3]),
    FloatSeq(Vec<f32>),
    Vec3Seq(Vec<[f32; 3]>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::FloatSeq(_) => ValueKind::FloatSeq,
            Value::Vec3Seq(_) => ValueKind::Vec3Seq,
        }
    }

    /// Element count for sequences, `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::FloatSeq(items) => Some(items.len()),
            Value::Vec3Seq(items) => Some(items.len()),
            _ => None,
        }
    }

    /// First numeric component lying outside `bounds`, if any.
    pub(crate) fn first_out_of(&self, bounds: Bounds) -> Option<f64> {
        let outside = |v: f64| !bounds.contains(v);
        match self {
            Value::Float(v) => Some(f64::from(*v)).filter(|v| outside(*v)),
            Value::Int(v) => Some(f64::from(*v)).filter(|v| outside(*v)),
            Value::Bool(_) => None,
            Value::Vec3(v) => v.iter().map(|c| f64::from(*c)).find(|c| outside(*c)),
            Value::FloatSeq(items) => items.iter().map(|c| f64::from(*c)).find(|c| outside(*c)),
            Value::Vec3Seq(items) => items
                .iter()
                .flat_map(|item| item.iter())
                .map(|c| f64::from(*c))
                .find(|c| outside(*c)),
        }
    }

    /// Returns a copy with every numeric component clamped into `bounds`.
    pub fn clamped(&self, bounds: Bounds) -> Value {
        let clamp = |v: f32| bounds.clamp_f32(v);
        match self {
            Value::Float(v) => Value::Float(clamp(*v)),
            Value::Int(v) => Value::Int(bounds.clamp_i32(*v)),
            Value::Bool(v) => Value::Bool(*v),
            Value::Vec3(v) => Value::Vec3(v.map(clamp)),
            Value::FloatSeq(items) => Value::FloatSeq(items.iter().copied().map(clamp).collect()),
            Value::Vec3Seq(items) => {
                Value::Vec3Seq(items.iter().map(|item| item.map(clamp)).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Vec3([r, g, b]) => write!(f, "({r:.2}, {g:.2}, {b:.2})"),
            Value::FloatSeq(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:.2}")?;
                }
                f.write_str("]")
            }
            Value::Vec3Seq(items) => {
                f.write_str("[")?;
                for (index, [a, b, c]) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({a}, {b}, {c})")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Inclusive numeric range enforced on every component of a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        debug_assert!(min <= max, "bounds must be ordered");
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn clamp_f32(&self, value: f32) -> f32 {
        (f64::from(value).clamp(self.min, self.max)) as f32
    }

    fn clamp_i32(&self, value: i32) -> i32 {
        let min = self.min.ceil().max(f64::from(i32::MIN)) as i32;
        let max = self.max.floor().min(f64::from(i32::MAX)) as i32;
        value.clamp(min, max.max(min))
    }
}
