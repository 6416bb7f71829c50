use synth_core::CloudUniforms;

pub(crate) static CLOUD_WGSL: &str = include_str!("../shaders/cloud.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CloudPacked {
    pub(crate) resolution: [f32; 2],
    pub(crate) time: f32,
    pub(crate) energy: f32,
    pub(crate) freq: f32,
    pub(crate) midi_norm: f32,
    pub(crate) _pad: [f32; 2],
}

impl From<&CloudUniforms> for CloudPacked {
    fn from(u: &CloudUniforms) -> Self {
        Self {
            resolution: u.resolution.to_array(),
            time: u.time,
            energy: u.energy,
            freq: u.freq,
            midi_norm: u.midi_norm,
            _pad: [0.0; 2],
        }
    }
}

pub(crate) struct CloudResources {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

pub(crate) fn create_cloud_resources(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
) -> CloudResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("cloud_shader"),
        source: wgpu::ShaderSource::Wgsl(CLOUD_WGSL.into()),
    });
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("cloud_bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("cloud_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("cloud_pipeline"),
        layout: Some(&pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_cloud"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("cloud_uniforms"),
        size: std::mem::size_of::<CloudPacked>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("cloud_bg"),
        layout: &bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    CloudResources {
        pipeline,
        uniform_buffer,
        bind_group,
    }
}
