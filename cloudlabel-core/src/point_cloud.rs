//! Point cloud data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A generic point cloud container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get a point by index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.points.get(index)
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<T> {
        self.points.iter()
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

/// Point coordinates plus the optional per-point colors stored in the file
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCloud {
    pub points: PointCloud<Point3f>,
    pub colors: Option<Vec<Rgb>>,
}

impl LoadedCloud {
    /// Build a cloud, rejecting empty clouds and color arrays of the wrong length
    pub fn new(points: PointCloud<Point3f>, colors: Option<Vec<Rgb>>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyCloud);
        }
        if let Some(colors) = &colors {
            if colors.len() != points.len() {
                return Err(Error::InvalidData(format!(
                    "{} colors for {} points",
                    colors.len(),
                    points.len()
                )));
            }
        }
        Ok(Self { points, colors })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Display colors for every point, falling back to `default` when the file had none
    pub fn colors_or(&self, default: Rgb) -> Vec<Rgb> {
        match &self.colors {
            Some(colors) => colors.clone(),
            None => vec![default; self.points.len()],
        }
    }
}
