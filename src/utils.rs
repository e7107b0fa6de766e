use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use image::RgbaImage;

use crate::error::CaptureError;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices.
    pub fn extend(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Axis-aligned box between `min` and `max` with outward normals.
    pub fn cuboid(min: Vec3, max: Vec3, color: [f32; 4]) -> Self {
        // (normal, four corners counter-clockwise seen from outside)
        let faces: [([f32; 3], [Vec3; 4]); 6] = [
            ([1.0, 0.0, 0.0], [
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(max.x, min.y, min.z),
                Vec3::new(max.x, max.y, min.z),
                Vec3::new(max.x, max.y, max.z),
            ]),
            ([-1.0, 0.0, 0.0], [
                Vec3::new(min.x, min.y, min.z),
                Vec3::new(min.x, min.y, max.z),
                Vec3::new(min.x, max.y, max.z),
                Vec3::new(min.x, max.y, min.z),
            ]),
            ([0.0, 1.0, 0.0], [
                Vec3::new(min.x, max.y, max.z),
                Vec3::new(max.x, max.y, max.z),
                Vec3::new(max.x, max.y, min.z),
                Vec3::new(min.x, max.y, min.z),
            ]),
            ([0.0, -1.0, 0.0], [
                Vec3::new(min.x, min.y, min.z),
                Vec3::new(max.x, min.y, min.z),
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(min.x, min.y, max.z),
            ]),
            ([0.0, 0.0, 1.0], [
                Vec3::new(min.x, min.y, max.z),
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(max.x, max.y, max.z),
                Vec3::new(min.x, max.y, max.z),
            ]),
            ([0.0, 0.0, -1.0], [
                Vec3::new(max.x, min.y, min.z),
                Vec3::new(min.x, min.y, min.z),
                Vec3::new(min.x, max.y, min.z),
                Vec3::new(max.x, max.y, min.z),
            ]),
        ];

        let mut mesh = Mesh::empty();
        for (normal, corners) in faces.iter() {
            let base = mesh.vertices.len() as u32;
            for corner in corners {
                mesh.vertices.push(Vertex {
                    pos: corner.to_array(),
                    normal: *normal,
                    color,
                });
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Flat checkerboard on y = 0 centred on the origin.
    pub fn checker_ground(tiles: i32, tile_size: f32, light: [f32; 4], dark: [f32; 4]) -> Self {
        let mut mesh = Mesh::empty();
        let half = tiles as f32 * tile_size / 2.0;
        for x in 0..tiles {
            for z in 0..tiles {
                let x0 = x as f32 * tile_size - half;
                let z0 = z as f32 * tile_size - half;
                let color = if (x + z) % 2 == 0 { light } else { dark };
                let base = mesh.vertices.len() as u32;
                for (px, pz) in [(x0, z0 + tile_size), (x0 + tile_size, z0 + tile_size), (x0 + tile_size, z0), (x0, z0)] {
                    mesh.vertices.push(Vertex {
                        pos: [px, 0.0, pz],
                        normal: [0.0, 1.0, 0.0],
                        color,
                    });
                }
                mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }
        mesh
    }
}

/// Strip row padding from a GPU read-back and build an RGBA image.
///
/// `swap_red_blue` converts BGRA surfaces. Alpha is forced opaque since swapchain alpha
/// is not meaningful for a photo.
pub fn image_from_padded_rows(
    data: &[u8],
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
    swap_red_blue: bool,
) -> Result<RgbaImage, CaptureError> {
    let row_bytes = width as usize * 4;
    let padded = padded_bytes_per_row as usize;
    let expected = padded * height as usize;
    if padded < row_bytes || data.len() < expected {
        return Err(CaptureError::SizeMismatch {
            expected,
            actual: data.len(),
        });
    }

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(padded).take(height as usize) {
        for px in row[..row_bytes].chunks_exact(4) {
            if swap_red_blue {
                pixels.extend_from_slice(&[px[2], px[1], px[0], 255]);
            } else {
                pixels.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
    }

    RgbaImage::from_raw(width, height, pixels).ok_or(CaptureError::SizeMismatch {
        expected: row_bytes * height as usize,
        actual: 0,
    })
}
