use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use bytemuck::Pod;
use tracing::warn;
use tuning::{UniformDecl, UniformSink, UniformType};

/// Byte stride of array elements and alignment of vec3/arrays under std140.
const STD140_SLOT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Field {
    offset: usize,
    ty: UniformType,
}

/// CPU-side image of the console uniform block, laid out with std140 rules.
///
/// The block is rebuilt from zero every frame: callers `clear` it, let the
/// session push its values, then upload `as_bytes` in one write. Array
/// slots past the current sequence length therefore read as zero.
#[derive(Debug)]
pub(crate) struct UniformBlock {
    fields: Vec<(String, Field)>,
    index: HashMap<String, usize>,
    data: Vec<u8>,
    reported: HashSet<String>,
}

impl UniformBlock {
    pub(crate) fn new(layout: &[UniformDecl]) -> Self {
        let mut fields = Vec::with_capacity(layout.len());
        let mut index = HashMap::new();
        let mut cursor = 0usize;

        for decl in layout {
            if index.contains_key(&decl.name) {
                continue;
            }
            let (align, size) = std140_extent(decl.ty);
            let offset = align_up(cursor, align);
            cursor = offset + size;
            index.insert(decl.name.clone(), fields.len());
            fields.push((decl.name.clone(), Field { offset, ty: decl.ty }));
        }

        let size = align_up(cursor, STD140_SLOT).max(STD140_SLOT);
        Self {
            fields,
            index,
            data: vec![0; size],
            reported: HashSet::new(),
        }
    }

    pub(crate) fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub(crate) fn clear(&mut self) {
        self.data.fill(0);
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    #[cfg(test)]
    fn offset_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|&slot| self.fields[slot].1.offset)
    }

    /// GLSL declaration of the block plus `#define` aliases so shaders can
    /// refer to uniforms by their bare names.
    pub(crate) fn glsl_declaration(&self) -> String {
        let mut out = String::from("layout(std140, set = 0, binding = 0) uniform ConsoleParams {\n");
        if self.fields.is_empty() {
            out.push_str("    float _console_unused;\n");
        }
        for (name, field) in &self.fields {
            let line = match field.ty {
                UniformType::Float => format!("    float _{name};"),
                UniformType::Int | UniformType::Bool => format!("    int _{name};"),
                UniformType::Vec3 => format!("    vec3 _{name};"),
                UniformType::FloatArray(len) => format!("    float _{name}[{}];", len.max(1)),
                UniformType::Vec3Array(len) => format!("    vec3 _{name}[{}];", len.max(1)),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("} ubo;\n\n");
        for (name, _) in &self.fields {
            let _ = writeln!(out, "#define {name} ubo._{name}");
        }
        out
    }

    fn field(&mut self, name: &str) -> Option<Field> {
        match self.index.get(name) {
            Some(&slot) => Some(self.fields[slot].1),
            None => {
                if self.reported.insert(name.to_string()) {
                    warn!(uniform = name, "uniform is not part of the shader block; ignoring");
                }
                None
            }
        }
    }

    fn mismatch(&mut self, name: &str, ty: UniformType) {
        if self.reported.insert(name.to_string()) {
            warn!(uniform = name, declared = ?ty, "uniform written with the wrong type; ignoring");
        }
    }

    fn write<T: Pod>(&mut self, offset: usize, value: &T) {
        let bytes = bytemuck::bytes_of(value);
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl UniformSink for UniformBlock {
    fn set_float(&mut self, name: &str, value: f32) {
        match self.field(name) {
            Some(Field {
                offset,
                ty: UniformType::Float,
            }) => self.write(offset, &value),
            Some(field) => self.mismatch(name, field.ty),
            None => {}
        }
    }

    fn set_int(&mut self, name: &str, value: i32) {
        match self.field(name) {
            Some(Field {
                offset,
                ty: UniformType::Int | UniformType::Bool,
            }) => self.write(offset, &value),
            Some(field) => self.mismatch(name, field.ty),
            None => {}
        }
    }

    fn set_vec3(&mut self, name: &str, value: [f32; 3]) {
        match self.field(name) {
            Some(Field {
                offset,
                ty: UniformType::Vec3,
            }) => self.write(offset, &value),
            Some(field) => self.mismatch(name, field.ty),
            None => {}
        }
    }

    fn set_float_at(&mut self, name: &str, index: usize, value: f32) {
        match self.field(name) {
            Some(Field {
                offset,
                ty: UniformType::FloatArray(len),
            }) if index < len => self.write(offset + index * STD140_SLOT, &value),
            Some(Field {
                ty: UniformType::FloatArray(_),
                ..
            }) => {}
            Some(field) => self.mismatch(name, field.ty),
            None => {}
        }
    }

    fn set_vec3_at(&mut self, name: &str, index: usize, value: [f32; 3]) {
        match self.field(name) {
            Some(Field {
                offset,
                ty: UniformType::Vec3Array(len),
            }) if index < len => self.write(offset + index * STD140_SLOT, &value),
            Some(Field {
                ty: UniformType::Vec3Array(_),
                ..
            }) => {}
            Some(field) => self.mismatch(name, field.ty),
            None => {}
        }
    }
}

fn std140_extent(ty: UniformType) -> (usize, usize) {
    match ty {
        UniformType::Float | UniformType::Int | UniformType::Bool => (4, 4),
        UniformType::Vec3 => (STD140_SLOT, 12),
        UniformType::FloatArray(len) | UniformType::Vec3Array(len) => {
            (STD140_SLOT, STD140_SLOT * len.max(1))
        }
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<UniformDecl> {
        vec![
            UniformDecl::new("uRatio", UniformType::Float),
            UniformDecl::new("uNumRings", UniformType::Int),
            UniformDecl::new("uRingEdges", UniformType::FloatArray(4)),
            UniformDecl::new("uMaxR", UniformType::Float),
            UniformDecl::new("uFocusColor", UniformType::Vec3),
            UniformDecl::new("uBlinkToggle", UniformType::Bool),
            UniformDecl::new("uSelectedPatches", UniformType::Vec3Array(2)),
        ]
    }

    fn read_f32(block: &UniformBlock, offset: usize) -> f32 {
        bytemuck::pod_read_unaligned(&block.as_bytes()[offset..offset + 4])
    }

    fn read_i32(block: &UniformBlock, offset: usize) -> i32 {
        bytemuck::pod_read_unaligned(&block.as_bytes()[offset..offset + 4])
    }

    #[test]
    fn follows_std140_offsets() {
        let block = UniformBlock::new(&layout());
        assert_eq!(block.offset_of("uRatio"), Some(0));
        assert_eq!(block.offset_of("uNumRings"), Some(4));
        assert_eq!(block.offset_of("uRingEdges"), Some(16));
        assert_eq!(block.offset_of("uMaxR"), Some(80));
        assert_eq!(block.offset_of("uFocusColor"), Some(96));
        assert_eq!(block.offset_of("uBlinkToggle"), Some(108));
        assert_eq!(block.offset_of("uSelectedPatches"), Some(112));
        assert_eq!(block.size(), 144);
    }

    #[test]
    fn writes_land_at_their_offsets() {
        let mut block = UniformBlock::new(&layout());
        block.set_float("uRatio", 1.5);
        block.set_int("uNumRings", 3);
        block.set_float_at("uRingEdges", 2, 0.5);
        block.set_vec3("uFocusColor", [0.25, 0.5, 1.0]);
        block.set_bool("uBlinkToggle", true);
        block.set_vec3_at("uSelectedPatches", 1, [1.0, 2.0, 20.0]);

        assert_eq!(read_f32(&block, 0), 1.5);
        assert_eq!(read_i32(&block, 4), 3);
        assert_eq!(read_f32(&block, 16 + 2 * 16), 0.5);
        assert_eq!(read_f32(&block, 96 + 8), 1.0);
        assert_eq!(read_i32(&block, 108), 1);
        assert_eq!(read_f32(&block, 112 + 16 + 8), 20.0);
    }

    #[test]
    fn ignores_out_of_range_and_mistyped_writes() {
        let mut block = UniformBlock::new(&layout());
        block.set_float_at("uRingEdges", 4, 9.0);
        block.set_int("uRatio", 7);
        block.set_float("uUnknown", 1.0);
        assert!(block.as_bytes().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn clear_zeroes_stale_slots() {
        let mut block = UniformBlock::new(&layout());
        block.set_float_at("uRingEdges", 3, 0.9);
        block.clear();
        block.set_float_at("uRingEdges", 0, 0.2);
        assert_eq!(read_f32(&block, 16), 0.2);
        assert_eq!(read_f32(&block, 16 + 3 * 16), 0.0);
    }

    #[test]
    fn declares_glsl_block_and_aliases() {
        let glsl = UniformBlock::new(&layout()).glsl_declaration();
        assert!(glsl.contains("layout(std140, set = 0, binding = 0) uniform ConsoleParams {"));
        assert!(glsl.contains("    float _uRingEdges[4];"));
        assert!(glsl.contains("    int _uBlinkToggle;"));
        assert!(glsl.contains("    vec3 _uSelectedPatches[2];"));
        assert!(glsl.contains("#define uMaxR ubo._uMaxR"));
    }
}
