use std::sync::Arc;

use anyhow::{anyhow, Result};
use gggg_label::{
    surface::LabelSurface,
    window::{make_window, AppLoop},
    FontFlags, FontHandle, Label,
};
use log::{error, info, warn};
use wgpu::{
    Color, CommandEncoderDescriptor, Device, DeviceDescriptor, Instance, LoadOp, Operations,
    Queue, RenderPassColorAttachment, RenderPassDescriptor, RequestAdapterOptions, StoreOp,
    Surface, SurfaceConfiguration, SurfaceError, TextureViewDescriptor,
};
use winit::window::Window;

const DEFAULT_FONT: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../resources/DejaVuSansMono.ttf"
);
const ATLAS_DUMP_VAR: &str = "HELLO_LABEL_ATLAS_PNG";

const TEXT: &str = "The quick brown fox jumps over the lazy dog. \
    Pack my box with five dozen liquor jugs, then wrap it all to the box.";

struct HelloLabel {
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    label: Label,
    label_surface: LabelSurface,
}

impl AppLoop for HelloLabel {
    fn init(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;

        let (adapter, device, queue) = pollster::block_on(async {
            let adapter = instance
                .request_adapter(&RequestAdapterOptions {
                    compatible_surface: Some(&surface),
                    ..Default::default()
                })
                .await
                .ok_or(anyhow!("No suitable adapter found."))?;

            let (device, queue) = adapter
                .request_device(&DeviceDescriptor::default(), None)
                .await?;

            Ok::<(wgpu::Adapter, wgpu::Device, wgpu::Queue), anyhow::Error>((
                adapter, device, queue,
            ))
        })?;

        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(anyhow!("Surface isn't supported by the adapter."))?;
        surface.configure(&device, &config);

        let font_path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_FONT.into());
        let font = FontHandle::open(&font_path)?;

        let label = Label::new(font, config.width, config.height)
            .with_pixel_size(32)
            .with_position(config.width as f32 / 2.0, 40.0)
            .with_size(480, 400)
            .with_flags(FontFlags::CENTER_ALIGNED | FontFlags::WORD_WRAP)
            .with_color([0.1, 0.1, 0.2, 1.0])
            .with_text(TEXT);
        info!("Laid out {} vertices", label.vertex_count());

        if let Ok(path) = std::env::var(ATLAS_DUMP_VAR) {
            label.atlas().texture().save_png(&path)?;
            info!("Wrote {}px atlas to {}", label.pixel_size(), path);
        }

        let mut label_surface = LabelSurface::new(&device, config.format);
        label_surface.prepare(&device, &queue, &label)?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            label,
            label_surface,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.label.set_window_size(width, height);
        self.label.set_position(width as f32 / 2.0, 40.0);
        if let Err(err) = self
            .label_surface
            .prepare(&self.device, &self.queue, &self.label)
        {
            error!("Couldn't upload the label: {}", err);
        }
    }

    fn draw(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                warn!("Skipping frame: {}", err);
                return;
            }
        };
        let view = frame.texture.create_view(&TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("hello label"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::WHITE),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.label_surface.draw(&mut pass);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }
}

fn main() -> Result<()> {
    make_window()
        .with_title("hello label")
        .with_framerate(30.0)
        .run::<HelloLabel>()
}
