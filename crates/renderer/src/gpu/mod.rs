//! GPU side of the console renderer.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `uniforms` lays out the console parameters as a std140 block and
//!   generates the matching GLSL declaration.
//! - `pipeline` compiles the wrapped demo shader into a render pipeline with a
//!   single bind group.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;
pub(crate) mod uniforms;

pub(crate) use state::GpuState;
