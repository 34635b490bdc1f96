//! Renderer crate for the circle shading demos.
//!
//! Glues a `winit` window, a single-pass `wgpu` pipeline and the live tuning
//! console together. The overall flow is:
//!
//! ```text
//!   circles CLI
//!        │ RendererConfig + ConsoleSession
//!        ▼
//!   Renderer::run ──▶ winit event loop ──▶ key events ──▶ ConsoleSession
//!                                    │
//!                                    └─▶ RedrawRequested ──▶ session.sync() ─▶ GPU UBO
//! ```
//!
//! The demo fragment shader only defines `mainImage`. It is wrapped at
//! runtime with a uniform block generated from the session's parameter
//! layout, so every registry entry reaches the shader under its uniform name.

mod compile;
mod gpu;
mod overlay;
mod types;
mod window;

use anyhow::Result;
use tuning::ConsoleSession;

pub use types::{Antialiasing, FragmentShader, RendererConfig, ShaderCompiler};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and drives `session` until it shuts down.
    ///
    /// Blocks the calling thread, which must be the main thread on platforms
    /// that require it. Returns an error if the window, device or shader
    /// cannot be created.
    pub fn run(self, session: ConsoleSession) -> Result<()> {
        window::run_window(self.config, session)
    }
}
