//! Mesh data structures and functionality

use crate::point::*;
use crate::traits::Transformable;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub colors: Option<Vec<Rgb>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            colors: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            colors: None,
        }
    }

    /// Create a UV sphere centered at the origin.
    ///
    /// `stacks` counts latitude bands and `slices` longitude segments; both are
    /// clamped to the smallest values that still close the surface.
    pub fn uv_sphere(radius: f32, stacks: usize, slices: usize) -> Self {
        let stacks = stacks.max(2);
        let slices = slices.max(3);

        let mut vertices = Vec::with_capacity(2 + (stacks - 1) * slices);
        vertices.push(Point3f::new(0.0, 0.0, radius));
        for i in 1..stacks {
            let theta = PI * i as f32 / stacks as f32;
            for j in 0..slices {
                let phi = 2.0 * PI * j as f32 / slices as f32;
                vertices.push(Point3f::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.sin() * phi.sin(),
                    radius * theta.cos(),
                ));
            }
        }
        vertices.push(Point3f::new(0.0, 0.0, -radius));

        let south = vertices.len() - 1;
        let ring = |i: usize, j: usize| 1 + (i - 1) * slices + j % slices;

        let mut faces = Vec::with_capacity(2 * slices * (stacks - 1));
        for j in 0..slices {
            faces.push([0, ring(1, j), ring(1, j + 1)]);
        }
        for i in 1..stacks - 1 {
            for j in 0..slices {
                let (a, b) = (ring(i, j), ring(i, j + 1));
                let (c, d) = (ring(i + 1, j), ring(i + 1, j + 1));
                faces.push([a, c, b]);
                faces.push([b, c, d]);
            }
        }
        for j in 0..slices {
            faces.push([south, ring(stacks - 1, j + 1), ring(stacks - 1, j)]);
        }

        Self::from_vertices_and_faces(vertices, faces)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Give every vertex the same color
    pub fn paint_uniform_color(&mut self, color: Rgb) {
        self.colors = Some(vec![color; self.vertices.len()]);
    }

    /// Color of a vertex, white when the mesh is unpainted
    pub fn vertex_color(&self, index: usize) -> Rgb {
        self.colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
            .unwrap_or(WHITE)
    }

    /// Move every vertex by `offset`
    pub fn translate(&mut self, offset: &Vector3f) {
        self.transform(&Transform3D::translation(*offset));
    }

    /// Scale the mesh by `factor` keeping `center` fixed
    pub fn scale_about(&mut self, factor: f32, center: &Point3f) {
        self.transform(&Transform3D::scaling_about(center, factor));
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
