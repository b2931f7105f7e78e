//! Headless GPU rendering: no window, frame read back to the CPU.

use crate::camera::{CameraBasis, CameraUniform};
use crate::render::Frame;
use crate::scene::Scene;
use crate::trace::ShadeMode;
use crate::util::{Error, Result};

use super::SphereTraceCompute;

/// Render one frame on the GPU and read it back.
///
/// Fails with [`Error::UnsupportedPlatform`] when no compute-capable
/// adapter or device is available.
pub fn render_headless(scene: &Scene, basis: &CameraBasis, mode: ShadeMode) -> Result<Frame> {
    pollster::block_on(render_async(scene, basis, mode))
}

async fn render_async(scene: &Scene, basis: &CameraBasis, mode: ShadeMode) -> Result<Frame> {
    let _span = tracing::info_span!(
        "gpu_render",
        width = basis.width,
        height = basis.height,
        spheres = scene.len(),
        mode = %mode,
    )
    .entered();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| Error::unsupported(format!("no compute adapter available: {e}")))?;
    tracing::debug!(adapter = %adapter.get_info().name, "adapter selected");

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("headless_trace_device"),
            ..Default::default()
        })
        .await
        .map_err(|e| Error::unsupported(format!("device request failed: {e}")))?;

    let width = basis.width;
    let height = basis.height;

    // The blit pipeline goes unused here; the kernel writes the output
    // texture and we copy that straight out.
    let mut tracer =
        SphereTraceCompute::new(&device, width, height, wgpu::TextureFormat::Rgba8Unorm);
    tracer.upload_scene(&device, scene)?;
    let uniform = CameraUniform::new(basis, scene.len() as u32, mode.wire(), 0);
    tracer.update_camera(&queue, &uniform);

    // bytes_per_row must be aligned to 256 (COPY_BYTES_PER_ROW_ALIGNMENT)
    let bytes_per_row = (width * 4 + 255) & !255;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("trace_staging"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("trace_headless_encoder"),
    });
    if !tracer.dispatch(&mut encoder) {
        return Err(Error::unsupported("compute pipeline not ready"));
    }
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: tracer.output_texture(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let buffer_slice = staging.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, |_| {});
    let _ = device.poll(wgpu::PollType::wait_indefinitely());

    // Strip the row padding while copying out.
    let row_bytes = width as usize * 4;
    let mut pixels = vec![0u8; row_bytes * height as usize];
    {
        let data = buffer_slice.get_mapped_range();
        for y in 0..height as usize {
            let src = y * bytes_per_row as usize;
            let dst = y * row_bytes;
            pixels[dst..dst + row_bytes].copy_from_slice(&data[src..src + row_bytes]);
        }
    }
    staging.unmap();

    Ok(Frame {
        width,
        height,
        pixels,
    })
}
