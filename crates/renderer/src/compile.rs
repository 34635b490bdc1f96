use std::borrow::Cow;

use anyhow::{bail, Result};
use tracing::debug;
use wgpu::naga::ShaderStage;

use crate::gpu::uniforms::UniformBlock;
use crate::types::ShaderCompiler;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule> {
    create_module(
        device,
        "fullscreen triangle vertex",
        Cow::Borrowed(VERTEX_SHADER_GLSL),
        ShaderStage::Vertex,
        compiler,
    )
}

/// Compiles a fragment shader that has already been passed through [`wrap_fragment`].
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    label: &str,
    wrapped: String,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule> {
    debug!(shader = label, %compiler, bytes = wrapped.len(), "compiling fragment shader");
    create_module(
        device,
        label,
        Cow::Owned(wrapped),
        ShaderStage::Fragment,
        compiler,
    )
}

fn create_module(
    device: &wgpu::Device,
    label: &str,
    source: Cow<'_, str>,
    stage: ShaderStage,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule> {
    match compiler {
        ShaderCompiler::NagaGlsl => Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Glsl {
                shader: source,
                stage,
                defines: &[],
            },
        })),
        ShaderCompiler::Shaderc => compile_with_shaderc(device, label, &source, stage),
    }
}

#[cfg(feature = "shaderc")]
fn compile_with_shaderc(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    use anyhow::{anyhow, Context};

    let kind = match stage {
        ShaderStage::Vertex => shaderc::ShaderKind::Vertex,
        _ => shaderc::ShaderKind::Fragment,
    };
    let compiler = shaderc::Compiler::new().context("failed to initialise shaderc")?;
    let artifact = compiler
        .compile_into_spirv(source, kind, label, "main", None)
        .map_err(|err| anyhow!("shaderc rejected {label}: {err}"))?;
    if artifact.get_num_warnings() > 0 {
        debug!(shader = label, warnings = %artifact.get_warning_messages(), "shaderc warnings");
    }
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::SpirV(Cow::Borrowed(artifact.as_binary())),
    }))
}

#[cfg(not(feature = "shaderc"))]
fn compile_with_shaderc(
    _device: &wgpu::Device,
    label: &str,
    _source: &str,
    _stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    bail!("cannot compile {label}: this build does not include the shaderc feature; use the naga compiler")
}

/// Produces a self-contained GLSL fragment shader from a `mainImage` body.
///
/// Steps performed:
///
/// 1. Strip `#version` directives and `uniform` declarations of names the
///    block already provides so demos can keep standalone declarations.
/// 2. Prepend [`HEADER`] plus the generated uniform block and its aliases.
/// 3. Append [`FOOTER`] which maps `v_uv` to `[-1, 1]`, calls `mainImage`
///    and writes to `outColor`.
pub(crate) fn wrap_fragment(source: &str, block: &UniformBlock) -> String {
    let provided: Vec<&str> = block.names().collect();
    let mut sanitized = String::new();
    let mut skipped_version = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        if trimmed.starts_with("uniform ") && declares_any(trimmed, &provided) {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!(
        "{HEADER}\n{block}\n#line 1\n{sanitized}{FOOTER}",
        block = block.glsl_declaration()
    )
}

fn declares_any(line: &str, names: &[&str]) -> bool {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|token| names.contains(&token))
}

const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;
";

const FOOTER: &str = r"void main() {
    vec4 color = vec4(0.0, 0.0, 0.0, 1.0);
    mainImage(color, v_uv * 2.0 - 1.0);
    outColor = vec4(color.rgb, 1.0);
}
";

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
