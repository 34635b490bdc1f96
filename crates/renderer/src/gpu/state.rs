use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use tuning::ConsoleSession;
use winit::dpi::PhysicalSize;

use crate::types::RendererConfig;

use super::context::GpuContext;
use super::pipeline::{PipelineLayouts, ShaderPipeline};
use super::uniforms::UniformBlock;

pub(crate) struct GpuState {
    context: GpuContext,
    _layouts: PipelineLayouts,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    block: UniformBlock,
    pipeline: ShaderPipeline,
    multisample_target: Option<MultisampleTarget>,
    frame_count: u64,
    last_fps_update: Instant,
    frames_since_last_update: u32,
}

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
        session: &ConsoleSession,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, config.antialiasing)?;
        let layouts = PipelineLayouts::new(&context.device, config.shader_compiler)?;

        let block = UniformBlock::new(&session.uniform_layout());
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("console uniform buffer"),
            size: block.size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("console uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let pipeline = ShaderPipeline::new(
            &context.device,
            &layouts,
            context.surface_format,
            context.sample_count,
            &config.shader,
            &block,
            config.shader_compiler,
        )?;

        let multisample_target = (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        debug!(
            shader = %config.shader.label,
            uniform_bytes = block.size(),
            sample_count = context.sample_count,
            "renderer ready"
        );

        Ok(Self {
            context,
            _layouts: layouts,
            uniform_buffer,
            uniform_bind_group,
            block,
            pipeline,
            multisample_target,
            frame_count: 0,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        if self.context.sample_count > 1 {
            self.multisample_target = Some(MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                new_size,
                self.context.sample_count,
            ));
        }
    }

    /// Uploads the session's parameters in a single buffer write and draws one frame.
    pub(crate) fn render(&mut self, session: &ConsoleSession) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        self.block.clear();
        session.sync(&mut self.block);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, self.block.as_bytes());

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        {
            let (attachment, resolve_target) = match self.multisample_target.as_ref() {
                Some(target) => (&target.view, Some(&view)),
                None => (&view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("console pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        self.record_frame();
        Ok(())
    }

    fn record_frame(&mut self) {
        self.frame_count += 1;
        self.frames_since_last_update += 1;
        let elapsed = self.last_fps_update.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            debug!(fps = fps.round(), frame_count = self.frame_count, "render stats");
            self.frames_since_last_update = 0;
            self.last_fps_update = Instant::now();
        }
    }
}
