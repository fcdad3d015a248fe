//! Instanced splash draw pass.
//!
//! One indexed draw per frame: the source mesh in vertex slot 0, and the
//! four animated per-instance streams (`positions`, `scales`, `rotation`,
//! `broken`) in slots 1 to 4. `opacity` is allocated on the CPU side but
//! nothing reads it, so it is never uploaded.

use glam::Mat4;

use crate::{
    error::SplashError,
    geometry::BaseGeometry,
    gpu::{
        buffer::GpuBuffer,
        render_context::RenderContext,
        shader_composer::{ShaderComposer, SPLASH_SHADER, SPLASH_SHADER_PATH},
        texture::GpuTexture,
    },
    options::RenderOptions,
    renderer::pipeline_util,
    splash::Splash,
};

/// Interleaved source-mesh vertex. Must match `VertexInput` in
/// `splash.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplashVertex {
    /// Object-space position, before the shrink factor.
    pub position: [f32; 3],
    /// Unused by the shader but kept in the layout.
    pub normal: [f32; 3],
    /// Sprite and noise texture coordinate.
    pub uv: [f32; 2],
}

/// Uniform block of the splash shader. Must match `SplashUniforms` in
/// `splash.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplashUniforms {
    /// Camera projection times view.
    pub view_proj: [[f32; 4]; 4],
    /// World matrix of the group holding the mesh.
    pub model: [[f32; 4]; 4],
    /// Seconds, from [`SplashMaterial::time`](crate::splash::SplashMaterial::time).
    pub time: f32,
    /// [`RenderOptions::vertex_shrink`].
    pub shrink: f32,
    /// [`RenderOptions::discard_epsilon`].
    pub discard_epsilon: f32,
    /// Padding to a 16-byte multiple.
    pub _pad: f32,
}

impl SplashUniforms {
    /// Pack camera, model transform and material state.
    #[must_use]
    pub fn new(view_proj: Mat4, model: Mat4, time: f32, render: &RenderOptions) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            time,
            shrink: render.vertex_shrink,
            discard_epsilon: render.discard_epsilon,
            _pad: 0.0,
        }
    }
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<SplashVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 24,
                shader_location: 2,
            },
        ],
    }
}

// Instance streams, in `SplashAttributes::animated()` order.
const POSITIONS_ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 3,
}];
const SCALES_ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 4,
}];
const ROTATION_ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32,
    offset: 0,
    shader_location: 5,
}];
const BROKEN_ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32,
    offset: 0,
    shader_location: 6,
}];

fn instance_layout(
    item_size: usize,
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (item_size * size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

/// Interleave the source mesh into [`SplashVertex`] records.
///
/// Missing normals or UVs are zero-filled; missing positions are an error.
///
/// # Errors
///
/// Returns [`SplashError::MissingAttribute`] when `base` has no position
/// stream.
pub fn interleave_vertices(base: &BaseGeometry) -> Result<Vec<SplashVertex>, SplashError> {
    let positions = base
        .positions
        .as_ref()
        .ok_or(SplashError::MissingAttribute("position"))?;

    if base.normals.is_none() {
        log::warn!("splash mesh has no normals; zero-filling");
    }
    if base.uvs.is_none() {
        log::warn!("splash mesh has no UVs; zero-filling");
    }

    Ok(positions
        .iter()
        .enumerate()
        .map(|(i, &position)| SplashVertex {
            position,
            normal: base
                .normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or_default(),
            uv: base
                .uvs
                .as_ref()
                .and_then(|uv| uv.get(i).copied())
                .unwrap_or_default(),
        })
        .collect())
}

/// Index list for the source mesh; non-indexed meshes get `0..vertex_count`.
#[must_use]
pub fn mesh_indices(base: &BaseGeometry) -> Vec<u32> {
    base.indices
        .clone()
        .unwrap_or_else(|| (0..base.vertex_count() as u32).collect())
}

/// Clear the dirty flag of every uploaded instance stream and report which
/// ones were set, in `SplashAttributes::animated()` order.
pub fn take_dirty_streams(splash: &mut Splash) -> [bool; 4] {
    let streams = splash.slots().animated();
    let geometry = splash.geometry_mut();
    streams.map(|slot| geometry.attribute_at_mut(slot).take_dirty())
}

/// Owns the splash pipeline and every GPU buffer it draws from.
pub struct SplashRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: GpuBuffer,
    index_buffer: GpuBuffer,
    index_count: u32,
    instance_buffers: [GpuBuffer; 4],
    instance_count: u32,
    uniform_buffer: GpuBuffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    render: RenderOptions,
    // Kept alive for the bind group.
    _sprite: GpuTexture,
    _noise: GpuTexture,
}

impl SplashRenderer {
    /// Build the pipeline and upload the mesh, textures and initial
    /// instance data of `splash`.
    ///
    /// `depth_format` is the host's depth attachment, if the pass has one.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::MissingAttribute`] if the source mesh has no
    /// positions, or [`SplashError::Shader`] if the shader fails to compose.
    pub fn new(
        context: &RenderContext,
        splash: &Splash,
        render: &RenderOptions,
        depth_format: Option<wgpu::TextureFormat>,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, SplashError> {
        let device = &context.device;
        let base = splash.geometry().base();

        let vertices = interleave_vertices(base)?;
        let indices = mesh_indices(base);
        let vertex_buffer = GpuBuffer::new_with_data(
            device,
            "Splash Vertices",
            &vertices,
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = GpuBuffer::new_with_data(
            device,
            "Splash Indices",
            &indices,
            wgpu::BufferUsages::INDEX,
        );

        let streams = splash.slots().animated();
        let instance_buffers = streams.map(|slot| {
            let attr = splash.geometry().attribute_at(slot);
            GpuBuffer::new_with_data(
                device,
                &format!("Splash Instance {}", attr.name()),
                attr.as_slice(),
                wgpu::BufferUsages::VERTEX,
            )
        });

        let uniforms = SplashUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            splash.material().time,
            render,
        );
        let uniform_buffer = GpuBuffer::new_with_data(
            device,
            "Splash Uniforms",
            &[uniforms],
            wgpu::BufferUsages::UNIFORM,
        );

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Splash Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Splash Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.buffer().as_entire_binding(),
            }],
        });

        let material = splash.material();
        let sprite = GpuTexture::from_image(device, &context.queue, &material.sprite, true);
        let noise = GpuTexture::from_image(device, &context.queue, &material.noise, false);

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Splash Texture Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Splash Texture Bind Group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sprite.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sprite.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&noise.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&noise.sampler),
                },
            ],
        });

        let shader = shader_composer.compose(
            device,
            "Splash Shader",
            SPLASH_SHADER,
            SPLASH_SHADER_PATH,
        )?;
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Splash Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            vertex_layout(),
            instance_layout(3, &POSITIONS_ATTRS),
            instance_layout(3, &SCALES_ATTRS),
            instance_layout(1, &ROTATION_ATTRS),
            instance_layout(1, &BROKEN_ATTRS),
        ];
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Splash Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(pipeline_util::additive_fragment_target(context.format()))],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Both faces: the dome is seen from inside and out.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: depth_format.map(pipeline_util::read_only_depth_state),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!(
            "splash renderer ready: {} vertices, {} indices, {} instances",
            vertices.len(),
            indices.len(),
            splash.instance_count()
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            instance_buffers,
            instance_count: splash.instance_count() as u32,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            render: render.clone(),
            _sprite: sprite,
            _noise: noise,
        })
    }

    /// Upload the instance streams the animator touched since the last call
    /// and refresh the uniforms. Returns the number of streams uploaded.
    pub fn prepare(
        &mut self,
        context: &RenderContext,
        splash: &mut Splash,
        view_proj: Mat4,
        model: Mat4,
    ) -> usize {
        let dirty = take_dirty_streams(splash);
        let streams = splash.slots().animated();

        let mut uploaded = 0;
        for ((buffer, slot), is_dirty) in self.instance_buffers.iter_mut().zip(streams).zip(dirty) {
            if !is_dirty {
                continue;
            }
            let attr = splash.geometry().attribute_at(slot);
            if buffer.write_bytes(&context.device, &context.queue, attr.as_bytes()) {
                log::debug!("reallocated instance buffer '{}'", attr.name());
            }
            uploaded += 1;
        }

        let uniforms =
            SplashUniforms::new(view_proj, model, splash.material().time, &self.render);
        let _ = self
            .uniform_buffer
            .write(&context.device, &context.queue, &[uniforms]);

        uploaded
    }

    /// Record the instanced draw into `render_pass`.
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.index_count == 0 || self.instance_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
        for (i, buffer) in self.instance_buffers.iter().enumerate() {
            render_pass.set_vertex_buffer(i as u32 + 1, buffer.buffer().slice(..));
        }
        render_pass.set_index_buffer(
            self.index_buffer.buffer().slice(..),
            wgpu::IndexFormat::Uint32,
        );
        render_pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        assets::{TextureImage, WrapMode},
        options::AnimationOptions,
        splash::SplashMaterial,
    };

    fn triangle() -> BaseGeometry {
        BaseGeometry {
            positions: Some(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            normals: None,
            uvs: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
            indices: None,
        }
    }

    fn splash() -> Splash {
        Splash::new(
            &Arc::new(triangle()),
            SplashMaterial::new(
                Arc::new(TextureImage::placeholder("sprite", WrapMode::ClampToEdge)),
                Arc::new(TextureImage::placeholder("noise", WrapMode::Repeat)),
            ),
            &AnimationOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn vertex_layouts_match_wgsl() {
        assert_eq!(size_of::<SplashVertex>(), 32);
        assert_eq!(size_of::<SplashUniforms>(), 144);
        assert_eq!(size_of::<SplashUniforms>() % 16, 0);
    }

    #[test]
    fn interleave_zero_fills_missing_normals() {
        let vertices = interleave_vertices(&triangle()).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0; 3]);
        assert_eq!(vertices[2].uv, [0.0, 1.0]);
    }

    #[test]
    fn interleave_requires_positions() {
        let err = interleave_vertices(&BaseGeometry::default()).unwrap_err();
        assert!(matches!(err, SplashError::MissingAttribute("position")));
    }

    #[test]
    fn non_indexed_mesh_gets_sequential_indices() {
        assert_eq!(mesh_indices(&triangle()), vec![0, 1, 2]);
        let indexed = BaseGeometry {
            indices: Some(vec![2, 1, 0]),
            ..triangle()
        };
        assert_eq!(mesh_indices(&indexed), vec![2, 1, 0]);
    }

    #[test]
    fn uniforms_carry_render_options() {
        let render = RenderOptions::default();
        let model = Mat4::from_scale(glam::Vec3::splat(2.0));
        let u = SplashUniforms::new(Mat4::IDENTITY, model, 1.5, &render);
        assert_eq!(u.time, 1.5);
        assert_eq!(u.shrink, render.vertex_shrink);
        assert_eq!(u.discard_epsilon, render.discard_epsilon);
        assert_eq!(u.model[0][0], 2.0);
        assert_eq!(u.view_proj[3][3], 1.0);
    }

    #[test]
    fn only_animated_streams_are_taken_after_a_tick() {
        let mut splash = splash();
        // Freshly built buffers are clean.
        assert_eq!(take_dirty_streams(&mut splash), [false; 4]);

        let mut rng = StdRng::seed_from_u64(3);
        let _ = splash.tick(16.0, &mut rng);
        assert_eq!(take_dirty_streams(&mut splash), [true; 4]);
        // Taking clears them.
        assert_eq!(take_dirty_streams(&mut splash), [false; 4]);

        let opacity = splash.slots().opacity;
        assert!(!splash.geometry().attribute_at(opacity).is_dirty());
    }
}
