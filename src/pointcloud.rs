use nalgebra::Vector3;
use ndarray::prelude::*;

use super::io::Geometry;

/// Organized point cloud produced from a depth map. Points are stored one per
/// pixel in row-major order, so the point of pixel (x, y) is at `y * width + x`.
#[derive(Clone, Debug)]
pub struct PointCloud {
    /// The 3D points in camera space. Shape is (width * height, 3).
    pub points: Array2<f32>,
    pub width: usize,
    pub height: usize,
    /// True when no point is invalid (NaN).
    pub is_dense: bool,
}

impl PointCloud {
    /// Creates a cloud of `width * height` zero points.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            points: Array2::<f32>::zeros((width * height, 3)),
            width,
            height,
            is_dense: true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at the given index.
    pub fn point(&self, index: usize) -> Vector3<f32> {
        let row = self.points.row(index);
        Vector3::new(row[0], row[1], row[2])
    }

    /// Point of the pixel (x, y).
    pub fn point_at(&self, x: usize, y: usize) -> Vector3<f32> {
        self.point(y * self.width + x)
    }

    /// Iterates over the indices of points that have finite coordinates.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.points
            .outer_iter()
            .enumerate()
            .filter(|(_, point)| point.iter().all(|v| v.is_finite()))
            .map(|(i, _)| i)
    }

    pub fn valid_points_count(&self) -> usize {
        self.valid_indices().count()
    }
}

impl From<&PointCloud> for Geometry {
    /// Keeps only the finite points, as most viewers do not accept NaNs.
    fn from(pcl: &PointCloud) -> Geometry {
        let indices = pcl.valid_indices().collect::<Vec<usize>>();
        Geometry {
            points: pcl.points.select(Axis(0), &indices),
        }
    }
}
