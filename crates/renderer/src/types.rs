/// Shader compilation backend requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderCompiler {
    /// Compile wrapped GLSL through shaderc into SPIR-V.
    Shaderc,
    /// Hand GLSL to naga's built-in frontend.
    NagaGlsl,
}

impl Default for ShaderCompiler {
    fn default() -> Self {
        if cfg!(feature = "shaderc") {
            ShaderCompiler::Shaderc
        } else {
            ShaderCompiler::NagaGlsl
        }
    }
}

impl std::fmt::Display for ShaderCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderCompiler::Shaderc => f.write_str("shaderc"),
            ShaderCompiler::NagaGlsl => f.write_str("naga"),
        }
    }
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Fragment shader handed to the renderer.
#[derive(Debug, Clone)]
pub struct FragmentShader {
    /// Label used in logs and GPU debug markers.
    pub label: String,
    /// GLSL body defining `void mainImage(out vec4 color, in vec2 p)`.
    pub source: String,
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Base window title; the parameter overlay is appended to it.
    pub title: String,
    pub shader: FragmentShader,
    /// Optional FPS cap; `None` or `0` renders as fast as the surface allows.
    pub target_fps: Option<f32>,
    pub antialiasing: Antialiasing,
    pub shader_compiler: ShaderCompiler,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            title: "circles".to_string(),
            shader: FragmentShader {
                label: String::new(),
                source: String::new(),
            },
            target_fps: None,
            antialiasing: Antialiasing::default(),
            shader_compiler: ShaderCompiler::default(),
        }
    }
}
