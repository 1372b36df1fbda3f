use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::scene::Geometry;

/// Triangle mesh ready for upload.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) {
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
    }
}

/// Tessellates a geometry descriptor.
pub fn tessellate(geometry: &Geometry) -> MeshData {
    match *geometry {
        Geometry::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => torus(radius, tube, radial_segments.max(3), tubular_segments.max(3)),
        Geometry::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(radius, width_segments.max(3), height_segments.max(2)),
        Geometry::Cuboid {
            width,
            height,
            depth,
        } => cuboid(Vec3::new(width, height, depth)),
        Geometry::Grid { size, divisions } => grid(size, divisions.max(1)),
    }
}

fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let ring = radius + tube * v.cos();
            let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.push_vertex(position, (position - center).normalize_or_zero());
        }
    }

    let stride = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

fn sphere(radius: f32, width: u32, height: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for iy in 0..=height {
        let v = iy as f32 / height as f32;
        for ix in 0..=width {
            let u = ix as f32 / width as f32;
            let normal = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            mesh.push_vertex(normal * radius, normal);
        }
    }

    let stride = width + 1;
    for iy in 0..height {
        for ix in 0..width {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            // poles collapse to a single triangle per quad
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn cuboid(size: Vec3) -> MeshData {
    let vertices = UNIT_CUBE_VERTICES
        .chunks_exact(6)
        .flat_map(|vertex| {
            let position = Vec3::new(vertex[0], vertex[1], vertex[2]) * size;
            [
                position.x, position.y, position.z, vertex[3], vertex[4], vertex[5],
            ]
        })
        .collect();
    MeshData {
        vertices,
        indices: UNIT_CUBE_INDICES.to_vec(),
    }
}

/// Each grid line becomes a thin flat quad so it fits the triangle pipeline.
fn grid(size: f32, divisions: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let half = size / 2.0;
    let step = size / divisions as f32;
    let half_width = step * GRID_LINE_WIDTH / 2.0;
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        // line parallel to z, then line parallel to x
        grid_line(
            &mut mesh,
            Vec3::new(offset, 0.0, -half),
            Vec3::new(offset, 0.0, half),
            Vec3::X * half_width,
        );
        grid_line(
            &mut mesh,
            Vec3::new(-half, 0.0, offset),
            Vec3::new(half, 0.0, offset),
            Vec3::Z * half_width,
        );
    }
    mesh
}

const GRID_LINE_WIDTH: f32 = 0.025;

fn grid_line(mesh: &mut MeshData, start: Vec3, end: Vec3, across: Vec3) {
    let base = mesh.vertex_count() as u32;
    for position in [start - across, start + across, end + across, end - across] {
        mesh.push_vertex(position, Vec3::Y);
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

const UNIT_CUBE_VERTICES: &[f32] = &[
    // positions        // normals
    -0.5, -0.5, 0.5, 0.0, 0.0, 1.0, 0.5, -0.5, 0.5, 0.0, 0.0, 1.0, 0.5, 0.5, 0.5, 0.0, 0.0, 1.0,
    -0.5, 0.5, 0.5, 0.0, 0.0, 1.0, -0.5, -0.5, -0.5, 0.0, 0.0, -1.0, 0.5, -0.5, -0.5, 0.0, 0.0,
    -1.0, 0.5, 0.5, -0.5, 0.0, 0.0, -1.0, -0.5, 0.5, -0.5, 0.0, 0.0, -1.0, -0.5, -0.5, -0.5, -1.0,
    0.0, 0.0, -0.5, -0.5, 0.5, -1.0, 0.0, 0.0, -0.5, 0.5, 0.5, -1.0, 0.0, 0.0, -0.5, 0.5, -0.5,
    -1.0, 0.0, 0.0, 0.5, -0.5, -0.5, 1.0, 0.0, 0.0, 0.5, -0.5, 0.5, 1.0, 0.0, 0.0, 0.5, 0.5, 0.5,
    1.0, 0.0, 0.0, 0.5, 0.5, -0.5, 1.0, 0.0, 0.0, -0.5, -0.5, -0.5, 0.0, -1.0, 0.0, 0.5, -0.5,
    -0.5, 0.0, -1.0, 0.0, 0.5, -0.5, 0.5, 0.0, -1.0, 0.0, -0.5, -0.5, 0.5, 0.0, -1.0, 0.0, -0.5,
    0.5, -0.5, 0.0, 1.0, 0.0, 0.5, 0.5, -0.5, 0.0, 1.0, 0.0, 0.5, 0.5, 0.5, 0.0, 1.0, 0.0, -0.5,
    0.5, 0.5, 0.0, 1.0, 0.0,
];

const UNIT_CUBE_INDICES: &[u32] = &[
    0, 1, 2, 0, 2, 3, // front
    4, 6, 5, 4, 7, 6, // back
    8, 9, 10, 8, 10, 11, // left
    12, 14, 13, 12, 15, 14, // right
    16, 18, 17, 16, 19, 18, // bottom
    20, 21, 22, 20, 22, 23, // top
];

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(mesh: &MeshData) -> impl Iterator<Item = Vec3> + '_ {
        mesh.vertices
            .chunks_exact(6)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    fn normals(mesh: &MeshData) -> impl Iterator<Item = Vec3> + '_ {
        mesh.vertices
            .chunks_exact(6)
            .map(|v| Vec3::new(v[3], v[4], v[5]))
    }

    fn indices_in_range(mesh: &MeshData) -> bool {
        let count = mesh.vertex_count() as u32;
        mesh.indices.iter().all(|&index| index < count)
    }

    #[test]
    fn torus_counts_match_segments() {
        let mesh = tessellate(&Geometry::Torus {
            radius: 10.0,
            tube: 3.0,
            radial_segments: 16,
            tubular_segments: 100,
        });
        assert_eq!(mesh.vertex_count(), 17 * 101);
        assert_eq!(mesh.indices.len(), 16 * 100 * 6);
        assert!(indices_in_range(&mesh));
        assert!(normals(&mesh).all(|n| (n.length() - 1.0).abs() < 1e-4));
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = tessellate(&Geometry::Sphere {
            radius: 3.0,
            width_segments: 32,
            height_segments: 32,
        });
        assert!(indices_in_range(&mesh));
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(positions(&mesh).all(|p| (p.length() - 3.0).abs() < 1e-4));
    }

    #[test]
    fn cuboid_scales_unit_cube() {
        let mesh = tessellate(&Geometry::Cuboid {
            width: 3.0,
            height: 3.0,
            depth: 3.0,
        });
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(positions(&mesh).all(|p| p.abs() == Vec3::splat(1.5)));
    }

    #[test]
    fn grid_lies_flat_within_its_size() {
        let mesh = tessellate(&Geometry::Grid {
            size: 200.0,
            divisions: 50,
        });
        // 51 lines per axis, one quad each
        assert_eq!(mesh.vertex_count(), 51 * 2 * 4);
        assert_eq!(mesh.indices.len(), 51 * 2 * 6);
        assert!(indices_in_range(&mesh));
        assert!(positions(&mesh)
            .all(|p| p.y == 0.0 && p.x.abs() <= 100.1 && p.z.abs() <= 100.1));
        assert!(normals(&mesh).all(|n| n == Vec3::Y));
    }
}
