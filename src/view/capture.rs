use std::sync::mpsc;

use image::RgbaImage;
use tracing::debug;

use crate::controller::FrameCapture;
use crate::error::CaptureError;
use crate::utils::image_from_padded_rows;

/// A pending copy of the swapchain texture into a mappable buffer.
pub struct FrameReadback {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
    swap_red_blue: bool,
}

impl FrameReadback {
    /// Record the copy into `encoder`. Must be encoded after every pass that draws into
    /// `texture` and submitted before the frame is presented.
    pub fn encode(
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
    ) -> Result<Self, CaptureError> {
        if !texture.usage().contains(wgpu::TextureUsages::COPY_SRC) {
            return Err(CaptureError::NotCopyable);
        }
        let swap_red_blue = match texture.format() {
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => true,
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => false,
            other => return Err(CaptureError::UnsupportedFormat(format!("{other:?}"))),
        };

        let width = texture.width().max(1);
        let height = texture.height().max(1);
        let unpadded_bytes_per_row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("photo_readback"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        Ok(Self {
            buffer,
            width,
            height,
            padded_bytes_per_row,
            swap_red_blue,
        })
    }

    /// Block until the copy has landed and convert it. Call after `queue.submit`.
    pub fn read(self, device: &wgpu::Device) -> Result<RgbaImage, CaptureError> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| CaptureError::Map(e.to_string()))?;
        rx.recv()
            .map_err(|e| CaptureError::Map(e.to_string()))?
            .map_err(|e| CaptureError::Map(e.to_string()))?;

        let image = {
            let data = slice.get_mapped_range();
            image_from_padded_rows(
                &data,
                self.width,
                self.height,
                self.padded_bytes_per_row,
                self.swap_red_blue,
            )
        };
        self.buffer.unmap();
        debug!(width = self.width, height = self.height, "frame read back");
        image
    }
}

/// The result of this frame's read-back, handed to the snap sequence.
pub struct SurfaceCapture {
    frame: Option<Result<RgbaImage, CaptureError>>,
}

impl SurfaceCapture {
    pub fn new(frame: Option<Result<RgbaImage, CaptureError>>) -> Self {
        Self { frame }
    }
}

impl FrameCapture for SurfaceCapture {
    fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        self.frame.take().unwrap_or(Err(CaptureError::NoFrame))
    }
}
