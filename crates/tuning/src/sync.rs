//! Per-frame transfer of registry values into named shader uniforms.

use crate::registry::{ParamSpec, ParameterRegistry};
use crate::value::{Value, ValueKind};

/// Named-uniform interface of a render backend.
///
/// Names are the uniform names declared by the parameter specs; a backend
/// sizes its storage from [`FrameSynchronizer::layout`] beforehand.
pub trait UniformSink {
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_vec3(&mut self, name: &str, value: [f32; 3]);
    fn set_float_at(&mut self, name: &str, index: usize, value: f32);
    fn set_vec3_at(&mut self, name: &str, index: usize, value: [f32; 3]);

    /// Booleans travel as integers (0 or 1).
    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_int(name, i32::from(value));
    }
}

/// Storage type of one uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Bool,
    Vec3,
    FloatArray(usize),
    Vec3Array(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub ty: UniformType,
}

impl UniformDecl {
    pub fn new(name: impl Into<String>, ty: UniformType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Pushes registry entries to a [`UniformSink`] in declaration order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameSynchronizer;

impl FrameSynchronizer {
    /// Every uniform [`sync`](Self::sync) may push, in push order.
    pub fn layout(&self, registry: &ParameterRegistry) -> Vec<UniformDecl> {
        let mut decls = Vec::new();
        for (spec, _) in registry.entries() {
            if let Some(count) = spec.count_uniform_name() {
                decls.push(UniformDecl::new(count, UniformType::Int));
            }
            if let Some(uniform) = spec.uniform_name() {
                decls.push(UniformDecl::new(uniform, storage_type(spec)));
            }
            if let Some(last) = spec.last_uniform_name() {
                let ty = match spec.kind() {
                    ValueKind::Vec3Seq => UniformType::Vec3,
                    _ => UniformType::Float,
                };
                decls.push(UniformDecl::new(last, ty));
            }
        }
        decls
    }

    pub fn sync(&self, registry: &ParameterRegistry, sink: &mut dyn UniformSink) {
        for (spec, value) in registry.entries() {
            if let (Some(count), Some(len)) = (spec.count_uniform_name(), value.len()) {
                sink.set_int(count, i32::try_from(len).unwrap_or(i32::MAX));
            }
            if let Some(uniform) = spec.uniform_name() {
                push_value(sink, uniform, value);
            }
            if let Some(last) = spec.last_uniform_name() {
                match value {
                    Value::FloatSeq(items) => {
                        sink.set_float(last, items.last().copied().unwrap_or_default())
                    }
                    Value::Vec3Seq(items) => {
                        sink.set_vec3(last, items.last().copied().unwrap_or_default())
                    }
                    _ => {}
                }
            }
        }
    }
}

fn storage_type(spec: &ParamSpec) -> UniformType {
    match spec.kind() {
        ValueKind::Float => UniformType::Float,
        ValueKind::Int => UniformType::Int,
        ValueKind::Bool => UniformType::Bool,
        ValueKind::Vec3 => UniformType::Vec3,
        ValueKind::FloatSeq => UniformType::FloatArray(spec.sequence_capacity()),
        ValueKind::Vec3Seq => UniformType::Vec3Array(spec.sequence_capacity()),
    }
}

fn push_value(sink: &mut dyn UniformSink, name: &str, value: &Value) {
    match value {
        Value::Float(v) => sink.set_float(name, *v),
        Value::Int(v) => sink.set_int(name, *v),
        Value::Bool(v) => sink.set_bool(name, *v),
        Value::Vec3(v) => sink.set_vec3(name, *v),
        Value::FloatSeq(items) => {
            for (index, item) in items.iter().enumerate() {
                sink.set_float_at(name, index, *item);
            }
        }
        Value::Vec3Seq(items) => {
            for (index, item) in items.iter().enumerate() {
                sink.set_vec3_at(name, index, *item);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::registry::ParamSpec;

    /// Sink that keeps only what the latest frame pushed.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub order: Vec<String>,
        pub floats: BTreeMap<String, f32>,
        pub ints: BTreeMap<String, i32>,
        pub vec3s: BTreeMap<String, [f32; 3]>,
        pub float_arrays: BTreeMap<String, BTreeMap<usize, f32>>,
        pub vec3_arrays: BTreeMap<String, BTreeMap<usize, [f32; 3]>>,
    }

    impl RecordingSink {
        pub fn begin_frame(&mut self) {
            *self = Self::default();
        }

        fn note(&mut self, name: &str) {
            if self.order.last().map(String::as_str) != Some(name) {
                self.order.push(name.to_string());
            }
        }
    }

    impl UniformSink for RecordingSink {
        fn set_float(&mut self, name: &str, value: f32) {
            self.note(name);
            self.floats.insert(name.to_string(), value);
        }

        fn set_int(&mut self, name: &str, value: i32) {
            self.note(name);
            self.ints.insert(name.to_string(), value);
        }

        fn set_vec3(&mut self, name: &str, value: [f32; 3]) {
            self.note(name);
            self.vec3s.insert(name.to_string(), value);
        }

        fn set_float_at(&mut self, name: &str, index: usize, value: f32) {
            self.note(name);
            self.float_arrays
                .entry(name.to_string())
                .or_default()
                .insert(index, value);
        }

        fn set_vec3_at(&mut self, name: &str, index: usize, value: [f32; 3]) {
            self.note(name);
            self.vec3_arrays
                .entry(name.to_string())
                .or_default()
                .insert(index, value);
        }
    }

    fn registry() -> ParameterRegistry {
        ParameterRegistry::new([
            ParamSpec::float("ratio", 1.5).uniform("uRatio"),
            ParamSpec::flag("blink_toggle", true).uniform("uBlinkToggle"),
            ParamSpec::float("scratch", 0.0),
            ParamSpec::float_seq("ring_edges", vec![0.2, 0.5, 0.9])
                .uniform("uRingEdges")
                .count_uniform("uNumRings")
                .last_uniform("uMaxR"),
            ParamSpec::vec3_seq("selected_patches", vec![[0.0, 1.0, 10.0]])
                .uniform("uSelectedPatches")
                .count_uniform("uNumSelectedPatches")
                .capacity(8),
        ])
        .unwrap()
    }

    #[test]
    fn pushes_in_declaration_order() {
        let registry = registry();
        let mut sink = RecordingSink::default();
        FrameSynchronizer.sync(&registry, &mut sink);
        assert_eq!(
            sink.order,
            [
                "uRatio",
                "uBlinkToggle",
                "uNumRings",
                "uRingEdges",
                "uMaxR",
                "uNumSelectedPatches",
                "uSelectedPatches"
            ]
        );
        assert_eq!(sink.ints["uBlinkToggle"], 1);
        assert_eq!(sink.floats["uMaxR"], 0.9);
    }

    #[test]
    fn sequence_counts_match_and_nothing_stale() {
        let mut registry = registry();
        let mut sink = RecordingSink::default();
        FrameSynchronizer.sync(&registry, &mut sink);
        assert_eq!(sink.ints["uNumRings"], 3);
        assert_eq!(sink.float_arrays["uRingEdges"].len(), 3);

        registry
            .set("ring_edges", Value::FloatSeq(vec![0.4]))
            .unwrap();
        registry
            .set("selected_patches", Value::Vec3Seq(Vec::new()))
            .unwrap();
        sink.begin_frame();
        FrameSynchronizer.sync(&registry, &mut sink);

        assert_eq!(sink.ints["uNumRings"], 1);
        let rings: Vec<(usize, f32)> = sink.float_arrays["uRingEdges"]
            .iter()
            .map(|(i, v)| (*i, *v))
            .collect();
        assert_eq!(rings, vec![(0, 0.4)]);
        assert_eq!(sink.floats["uMaxR"], 0.4);
        assert_eq!(sink.ints["uNumSelectedPatches"], 0);
        assert!(!sink.vec3_arrays.contains_key("uSelectedPatches"));
    }

    #[test]
    fn layout_sizes_arrays_by_capacity() {
        let layout = FrameSynchronizer.layout(&registry());
        assert_eq!(
            layout,
            vec![
                UniformDecl::new("uRatio", UniformType::Float),
                UniformDecl::new("uBlinkToggle", UniformType::Bool),
                UniformDecl::new("uNumRings", UniformType::Int),
                UniformDecl::new("uRingEdges", UniformType::FloatArray(100)),
                UniformDecl::new("uMaxR", UniformType::Float),
                UniformDecl::new("uNumSelectedPatches", UniformType::Int),
                UniformDecl::new("uSelectedPatches", UniformType::Vec3Array(8)),
            ]
        );
    }
}
