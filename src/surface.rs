use std::{
    collections::HashMap,
    mem::size_of,
    rc::{Rc, Weak},
};

use bytemuck::{Pod, Zeroable};
use log::info;
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    vertex_attr_array, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Buffer, BufferBindingType, BufferDescriptor, BufferUsages, ColorTargetState, ColorWrites,
    Device, Extent3d, FilterMode, FragmentState, ImageCopyTexture, ImageDataLayout,
    MultisampleState, Origin3d, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PrimitiveState, Queue, RenderPass, RenderPipeline, RenderPipelineDescriptor, Sampler,
    SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor, ShaderStages, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages,
    TextureViewDescriptor, TextureViewDimension, VertexAttribute, VertexBufferLayout,
    VertexState, VertexStepMode,
};

use crate::{
    atlas::GlyphAtlas,
    error::{Result, TextError},
    text::{label::Label, Point},
    texture::Texture,
};

const POINT_ATTRIBUTES: [VertexAttribute; 2] = vertex_attr_array![
    // position
    0 => Float32x2,
    // uv
    1 => Float32x2,
];

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct LabelUniform {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

struct AtlasTexture {
    _texture: wgpu::Texture,
    bind_group: BindGroup,
}

/// One uploaded resource per pixel size, tied to the atlas it was made from.
///
/// A label that switches fonts gets new atlases at the same sizes, so the size alone
/// can't tell whether an upload is still current.
struct AtlasSlots<T> {
    slots: HashMap<u32, (Weak<GlyphAtlas>, T)>,
}

impl<T> AtlasSlots<T> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Runs `upload` unless the slot for the atlas's size already holds this exact atlas.
    /// Returns whether it ran.
    fn refresh<F>(&mut self, atlas: &Rc<GlyphAtlas>, upload: F) -> Result<bool>
    where
        F: FnOnce() -> Result<T>,
    {
        let pixel_size = atlas.pixel_size();
        // the weak pointer keeps the allocation, so its address can't be reused by another atlas
        let current = matches!(
            self.slots.get(&pixel_size),
            Some((uploaded, _)) if uploaded.as_ptr() == Rc::as_ptr(atlas)
        );
        if current {
            return Ok(false);
        }

        let value = upload()?;
        self.slots.insert(pixel_size, (Rc::downgrade(atlas), value));
        Ok(true)
    }

    fn get(&self, pixel_size: u32) -> Option<&T> {
        self.slots.get(&pixel_size).map(|(_, value)| value)
    }
}

/// Fails when a texture is bigger than the device allows along either side.
fn check_texture_size(texture: &Texture, max_dimension: u32) -> Result<()> {
    if texture.width > max_dimension || texture.height > max_dimension {
        return Err(TextError::GraphicsResource(format!(
            "{}x{} atlas is larger than the device limit of {}",
            texture.width, texture.height, max_dimension
        )));
    }
    Ok(())
}

/// GPU side of a [Label]: pipeline, one uploaded texture per pixel size the label has
/// used, and the vertex buffer of its latest layout.
pub struct LabelSurface {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
    uniform_buffer: Buffer,
    atlases: AtlasSlots<AtlasTexture>,
    pixel_size: Option<u32>,
    vertex_buffer: Option<Buffer>,
    vertex_count: u32,
}

impl LabelSurface {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("label bind group layout"),
            entries: &[
                // mvp + colour
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // glyph atlas
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // sampler
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("label shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/label.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("label pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("label pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &module,
                entry_point: "vertex",
                buffers: &[VertexBufferLayout {
                    array_stride: size_of::<Point>() as u64,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &POINT_ATTRIBUTES,
                }],
                compilation_options: PipelineCompilationOptions::default(),
            },
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fragment",
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::all(),
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            multiview: None,
        });

        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("label atlas sampler"),
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("label uniform"),
            size: size_of::<LabelUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            atlases: AtlasSlots::new(),
            pixel_size: None,
            vertex_buffer: None,
            vertex_count: 0,
        }
    }

    /// Uploads whatever the label changed since the last call. Run it before drawing.
    ///
    /// Fails with [TextError::GraphicsResource] when the atlas doesn't fit in a device texture.
    pub fn prepare(&mut self, device: &Device, queue: &Queue, label: &Label) -> Result<()> {
        let atlas = label.atlas();
        check_texture_size(atlas.texture(), device.limits().max_texture_dimension_2d)?;

        let bind_group_layout = &self.bind_group_layout;
        let uniform_buffer = &self.uniform_buffer;
        let sampler = &self.sampler;
        let uploaded = self.atlases.refresh(atlas, || {
            Ok(upload_atlas(
                device,
                queue,
                bind_group_layout,
                uniform_buffer,
                sampler,
                atlas.texture(),
            ))
        })?;
        if uploaded {
            info!("Uploaded {}px glyph atlas", atlas.pixel_size());
        }
        self.pixel_size = Some(atlas.pixel_size());

        let uniform = LabelUniform {
            mvp: label.mvp().into(),
            color: label.color(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        self.vertex_count = label.vertex_count();
        self.vertex_buffer = (self.vertex_count > 0).then(|| {
            device.create_buffer_init(&BufferInitDescriptor {
                label: Some("label vertices"),
                contents: bytemuck::cast_slice(label.vertices()),
                usage: BufferUsages::VERTEX,
            })
        });
        Ok(())
    }

    pub fn draw<'a>(&'a self, pass: &mut RenderPass<'a>) {
        let Some(vertex_buffer) = &self.vertex_buffer else {
            return;
        };
        let Some(atlas) = self.pixel_size.and_then(|size| self.atlases.get(size)) else {
            return;
        };

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &atlas.bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }

}

fn upload_atlas(
    device: &Device,
    queue: &Queue,
    bind_group_layout: &BindGroupLayout,
    uniform_buffer: &Buffer,
    sampler: &Sampler,
    texture: &Texture,
) -> AtlasTexture {
    // a face with no glyphs at all still needs something to bind
    let fallback = Texture::blank(1, 1);
    let texture = if texture.is_empty() { &fallback } else { texture };

    let size = Extent3d {
        width: texture.width,
        height: texture.height,
        depth_or_array_layers: 1,
    };
    let gpu_texture = device.create_texture(&TextureDescriptor {
        label: Some("label atlas"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::R8Unorm,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        ImageCopyTexture {
            texture: &gpu_texture,
            mip_level: 0,
            origin: Origin3d::ZERO,
            aspect: TextureAspect::All,
        },
        &texture.data,
        ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(texture.width),
            rows_per_image: Some(texture.height),
        },
        size,
    );

    let view = gpu_texture.create_view(&TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("label bind group"),
        layout: bind_group_layout,
        entries: &[
            BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::TextureView(&view),
            },
            BindGroupEntry {
                binding: 2,
                resource: BindingResource::Sampler(sampler),
            },
        ],
    });

    AtlasTexture {
        _texture: gpu_texture,
        bind_group,
    }
}
