use ndarray::prelude::*;

/// Generic representation of attributes found in 3D model/object/geometry files.
pub struct Geometry {
    /// The 3D points. Shape is (Nx3).
    pub points: Array2<f32>,
}

impl Geometry {
    pub fn len_vertices(&self) -> usize {
        self.points.nrows()
    }
}
