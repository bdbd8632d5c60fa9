//! SDF-based WebGPU render pipeline
//!
//! Renders the entire scene in the fragment shader using signed distance
//! fields over a single fullscreen triangle.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::assets::Templates;
use crate::sim::GameState;

const MAX_STARS: usize = 256;
/// The simulation evicts one mine per frame above its cap, so spawns that
/// pile up while frames are paused can briefly overshoot it
const MAX_MINES: usize = 4 * crate::consts::MAX_MINES;
const MAX_LASERS: usize = 256;
const MAX_EXPLOSIONS: usize = 64;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],  // offset 0
    area: [f32; 2],        // offset 8 - play area in world units
    time: f32,             // offset 16
    star_count: u32,       // offset 20
    mine_count: u32,       // offset 24
    laser_count: u32,      // offset 28
    explosion_count: u32,  // offset 32
    ship_outline_len: u32, // offset 36
    mine_outline_len: u32, // offset 40
    mine_extent: f32,      // offset 44
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShipUniform {
    pos: [f32; 2],
    rotation: f32, // degrees
    extent: f32,
}

/// Shared layout for every entity list: stars and explosions leave
/// rotation at zero, lasers and mines leave scale at one
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct EntityData {
    pos: [f32; 2],
    rotation: f32,
    scale: f32,
}

/// Copy up to `max` entities into a buffer-sized vec, returning the live count.
///
/// Entities past `max` are not drawn. The first time that happens for a list
/// `truncated` is set and a warning is logged.
fn pack<T>(
    label: &str,
    items: &[T],
    max: usize,
    truncated: &mut bool,
    f: impl Fn(&T) -> EntityData,
) -> (Vec<EntityData>, u32) {
    if items.len() > max && !*truncated {
        *truncated = true;
        log::warn!(
            "{} {} exceed the render buffer, drawing the first {}",
            items.len(),
            label,
            max
        );
    }
    let mut data = vec![EntityData::zeroed(); max];
    let count = items.len().min(max);
    for (slot, item) in data.iter_mut().zip(items) {
        *slot = f(item);
    }
    (data, count as u32)
}

fn entity_buffer(device: &wgpu::Device, label: &str, max: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<EntityData>() * max) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn layout_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Per-list flags so each overflow is logged once per session
#[derive(Debug, Default)]
struct Truncated {
    stars: bool,
    mines: bool,
    lasers: bool,
    explosions: bool,
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    ship_buffer: wgpu::Buffer,
    stars_buffer: wgpu::Buffer,
    mines_buffer: wgpu::Buffer,
    lasers_buffer: wgpu::Buffer,
    explosions_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    start_time: f64,

    ship_outline_len: u32,
    mine_outline_len: u32,
    ship_extent: f32,
    mine_extent: f32,

    truncated: Truncated,
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        templates: &Templates,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        // Six storage buffers exceeds the downlevel defaults, so take what
        // the adapter offers
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let ship_outline_len = templates.ship.outline.len() as u32;
        let mine_outline_len = templates.mine.outline.len() as u32;
        let ship_extent = templates.ship.extent();
        let mine_extent = templates.mine.extent();

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                area: [width as f32, height as f32],
                time: 0.0,
                star_count: 0,
                mine_count: 0,
                laser_count: 0,
                explosion_count: 0,
                ship_outline_len,
                mine_outline_len,
                mine_extent,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let ship_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ship"),
            contents: bytemuck::bytes_of(&ShipUniform {
                pos: [width as f32 / 2.0, height as f32 / 2.0],
                rotation: 0.0,
                extent: ship_extent,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Ship outline first, mine outline after it
        let outline: Vec<[f32; 2]> = templates
            .ship
            .outline
            .iter()
            .chain(&templates.mine.outline)
            .map(|p| p.to_array())
            .collect();
        let outline_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("outlines"),
            contents: bytemuck::cast_slice(&outline),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let stars_buffer = entity_buffer(&device, "stars", MAX_STARS);
        let mines_buffer = entity_buffer(&device, "mines", MAX_MINES);
        let lasers_buffer = entity_buffer(&device, "lasers", MAX_LASERS);
        let explosions_buffer = entity_buffer(&device, "explosions", MAX_EXPLOSIONS);

        let storage = wgpu::BufferBindingType::Storage { read_only: true };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[
                layout_entry(0, wgpu::BufferBindingType::Uniform),
                layout_entry(1, wgpu::BufferBindingType::Uniform),
                layout_entry(2, storage),
                layout_entry(3, storage),
                layout_entry(4, storage),
                layout_entry(5, storage),
                layout_entry(6, storage),
            ],
        });

        let buffers = [
            &globals_buffer,
            &ship_buffer,
            &outline_buffer,
            &stars_buffer,
            &mines_buffer,
            &lasers_buffer,
            &explosions_buffer,
        ];
        let entries: Vec<wgpu::BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            ship_buffer,
            stars_buffer,
            mines_buffer,
            lasers_buffer,
            explosions_buffer,
            bind_group,
            size: (width, height),
            start_time: 0.0,
            ship_outline_len,
            mine_outline_len,
            ship_extent,
            mine_extent,
            truncated: Truncated::default(),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    /// Update GPU buffers from game state and render
    pub fn render(&mut self, state: &GameState, time: f64) -> Result<(), wgpu::SurfaceError> {
        // requestAnimationFrame time is in ms
        let elapsed = ((time - self.start_time) / 1000.0) as f32;

        let truncated = &mut self.truncated;
        let (stars, star_count) =
            pack("stars", &state.stars, MAX_STARS, &mut truncated.stars, |s| {
                EntityData {
                    pos: s.pos.to_array(),
                    rotation: 0.0,
                    scale: s.scale,
                }
            });
        let (mines, mine_count) =
            pack("mines", &state.mines, MAX_MINES, &mut truncated.mines, |m| {
                EntityData {
                    pos: m.pos.to_array(),
                    rotation: m.rotation,
                    scale: 1.0,
                }
            });
        let (lasers, laser_count) =
            pack("lasers", state.lasers(), MAX_LASERS, &mut truncated.lasers, |l| {
                EntityData {
                    pos: l.pos.to_array(),
                    rotation: l.rotation,
                    scale: 1.0,
                }
            });
        let (explosions, explosion_count) = pack(
            "explosions",
            &state.explosions,
            MAX_EXPLOSIONS,
            &mut truncated.explosions,
            |e| EntityData {
                pos: e.pos.to_array(),
                rotation: 0.0,
                scale: e.scale,
            },
        );

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            area: [state.area.width, state.area.height],
            time: elapsed,
            star_count,
            mine_count,
            laser_count,
            explosion_count,
            ship_outline_len: self.ship_outline_len,
            mine_outline_len: self.mine_outline_len,
            mine_extent: self.mine_extent,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let ship = ShipUniform {
            pos: state.ship.pos.to_array(),
            rotation: state.ship.rotation,
            extent: self.ship_extent,
        };
        self.queue
            .write_buffer(&self.ship_buffer, 0, bytemuck::bytes_of(&ship));

        self.queue
            .write_buffer(&self.stars_buffer, 0, bytemuck::cast_slice(&stars));
        self.queue
            .write_buffer(&self.mines_buffer, 0, bytemuck::cast_slice(&mines));
        self.queue
            .write_buffer(&self.lasers_buffer, 0, bytemuck::cast_slice(&lasers));
        self.queue.write_buffer(
            &self.explosions_buffer,
            0,
            bytemuck::cast_slice(&explosions),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
