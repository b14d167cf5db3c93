//! Model loading for the scene geometry.
//!
//! The demo draws one model (loaded from a hardcoded STL path) at two
//! placements. STL triangles come in with per-face normals and no UVs, so
//! the loaded geometry is flat-shaded and samples the albedo texture at a
//! single texel unless re-wrapped.
//!
//! [`RawGeometry`] is the CPU-side intermediate: it supports the centering
//! and normalizing adjustments the demo applies before upload, and its math
//! is testable without a GPU.

use std::io::BufReader;
use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("model contains no triangles")]
    Empty,
}

/// Triangle geometry before GPU upload.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Load an STL file into flat-shaded geometry.
    pub fn from_stl(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let file = std::fs::File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let stl = stl_io::read_stl(&mut reader)?;
        if stl.faces.is_empty() {
            return Err(ModelError::Empty);
        }

        let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
        let mut indices = Vec::with_capacity(stl.faces.len() * 3);
        for (i, face) in stl.faces.iter().enumerate() {
            let normal: [f32; 3] = face.normal.into();
            for &vertex_idx in &face.vertices {
                let position: [f32; 3] = stl.vertices[vertex_idx].into();
                vertices.push(Vertex3d::new(position, normal, [0.0, 0.0]));
            }
            let base = (i * 3) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        Ok(Self::new(vertices, indices))
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Extent of the bounding box.
    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    /// Translate the geometry so its bounding box is centered at the origin.
    pub fn recenter(&mut self) {
        let center = self.center();
        for v in &mut self.vertices {
            v.position[0] -= center.x;
            v.position[1] -= center.y;
            v.position[2] -= center.z;
        }
    }

    /// Uniformly scale the geometry to fit within a unit cube.
    pub fn normalize(&mut self) {
        let size = self.size();
        let max_dim = size.x.max(size.y).max(size.z);
        if max_dim > 0.0 {
            let factor = 1.0 / max_dim;
            for v in &mut self.vertices {
                v.position[0] *= factor;
                v.position[1] *= factor;
                v.position[2] *= factor;
            }
        }
    }

    /// Upload to the GPU.
    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

/// Load the scene model: the STL at `path`, centered and normalized.
pub fn load_scene_model(path: impl AsRef<Path>) -> Result<RawGeometry, ModelError> {
    let mut geometry = RawGeometry::from_stl(path)?;
    geometry.recenter();
    geometry.normalize();
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> RawGeometry {
        let n = [0.0, 1.0, 0.0];
        RawGeometry::new(
            vec![
                Vertex3d::new(a, n, [0.0, 0.0]),
                Vertex3d::new(b, n, [0.0, 0.0]),
                Vertex3d::new(c, n, [0.0, 0.0]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn bounds_span_all_vertices() {
        let geom = triangle([0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-1.0, -1.0, -1.0]);
        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn recenter_moves_bounding_box_to_origin() {
        let mut geom = triangle([0.0, 0.0, 0.0], [2.0, 4.0, 6.0], [2.0, 0.0, 0.0]);
        geom.recenter();
        assert!(geom.center().length() < 1e-6);
    }

    #[test]
    fn normalize_fits_in_unit_cube() {
        let mut geom = triangle([0.0, 0.0, 0.0], [10.0, 4.0, 2.0], [5.0, 4.0, 0.0]);
        geom.normalize();
        let size = geom.size();
        assert!((size.x - 1.0).abs() < 1e-6);
        assert!(size.y <= 1.0 + 1e-6);
        assert!(size.z <= 1.0 + 1e-6);
    }

    #[test]
    fn normalize_leaves_degenerate_geometry_alone() {
        let mut geom = triangle([1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        geom.normalize();
        assert_eq!(Vec3::from(geom.vertices[0].position), Vec3::ONE);
    }
}
