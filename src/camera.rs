use std::path::Path;

use nalgebra::Vector3;
use serde_derive::Deserialize;

use crate::error::ReaderError;

/// Pinhole intrinsic parameters of a depth sensor, together with its image size.
///
/// The model is immutable after construction. Both focal lengths are
/// guaranteed to be finite and non-zero, since they are used as divisors.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraModel {
    width: usize,
    height: usize,
    fx: f32,
    fy: f32,
    cx: f32,
    cy: f32,
}

#[derive(Deserialize, Debug)]
struct CameraConfig {
    width: usize,
    height: usize,
    fx: f32,
    fy: f32,
    cx: f32,
    cy: f32,
}

impl CameraModel {
    /// Creates a camera model, validating its parameters.
    ///
    /// # Arguments
    ///
    /// * width, height: Image size in pixels, must be positive.
    /// * fx, fy: Focal lengths in pixels, must be finite and non-zero.
    /// * cx, cy: Principal point.
    pub fn new(
        width: usize,
        height: usize,
        fx: f32,
        fy: f32,
        cx: f32,
        cy: f32,
    ) -> Result<Self, ReaderError> {
        if width == 0 || height == 0 {
            return Err(ReaderError::invalid_parameter(format!(
                "Image size must be positive, got {width}x{height}"
            )));
        }
        for (name, focal) in [("fx", fx), ("fy", fy)] {
            if focal == 0.0 || !focal.is_finite() {
                return Err(ReaderError::invalid_parameter(format!(
                    "{name} must be finite and non-zero, got {focal}"
                )));
            }
        }
        if !cx.is_finite() || !cy.is_finite() {
            return Err(ReaderError::invalid_parameter(format!(
                "Principal point must be finite, got ({cx}, {cy})"
            )));
        }

        Ok(Self {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
        })
    }

    /// Sensor of the ICL-NUIM synthetic benchmark.
    pub fn icl_nuim() -> Self {
        Self {
            width: 640,
            height: 480,
            fx: 481.2,
            fy: -480.0,
            cx: 319.5,
            cy: 239.5,
        }
    }

    /// Calibrated Kinect of the TUM RGB-D benchmark.
    pub fn tum() -> Self {
        Self {
            width: 640,
            height: 480,
            fx: 568.204_4,
            fy: 567.674_25,
            cx: 322.927_3,
            cy: 240.328_63,
        }
    }

    /// Nominal (uncalibrated) intrinsics published with the TUM RGB-D benchmark.
    pub fn tum_nominal() -> Self {
        Self {
            width: 640,
            height: 480,
            fx: 525.0,
            fy: 525.0,
            cx: 319.5,
            cy: 239.5,
        }
    }

    /// Loads a camera model from a JSON file with the keys
    /// `width`, `height`, `fx`, `fy`, `cx` and `cy`.
    pub fn from_json_file<P: AsRef<Path>>(filepath: P) -> Result<Self, ReaderError> {
        let reader = std::io::BufReader::new(std::fs::File::open(filepath)?);
        let config: CameraConfig = serde_json::from_reader(reader)?;
        Self::new(
            config.width,
            config.height,
            config.fx,
            config.fy,
            config.cx,
            config.cy,
        )
    }

    /// Returns a copy of the model with another image size.
    pub fn with_size(&self, width: usize, height: usize) -> Result<Self, ReaderError> {
        Self::new(width, height, self.fx, self.fy, self.cx, self.cy)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fx(&self) -> f32 {
        self.fx
    }

    pub fn fy(&self) -> f32 {
        self.fy
    }

    pub fn cx(&self) -> f32 {
        self.cx
    }

    pub fn cy(&self) -> f32 {
        self.cy
    }

    /// Number of pixels in the image.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Project a 3D point into image space.
    ///
    /// Rows are scaled by -fy, the same convention as both back-projections.
    ///
    /// # Arguments
    ///
    /// * point: The 3D point in camera space.
    ///
    /// # Returns
    ///
    /// * (x and y) coordinates.
    pub fn project(&self, point: &Vector3<f32>) -> (f32, f32) {
        (
            point[0] * self.fx / point[2] + self.cx,
            self.cy - point[1] * self.fy / point[2],
        )
    }

    /// Back-projects a pixel whose sample is the distance from the camera
    /// center along its ray (ICL-NUIM).
    pub fn backproject_ray_length(&self, x: f32, y: f32, ray_length: f32) -> Vector3<f32> {
        let dir_x = (x - self.cx) / self.fx;
        let dir_y = (y - self.cy) / -self.fy;
        let z = ray_length / (dir_x * dir_x + dir_y * dir_y + 1.0).sqrt();
        Vector3::new(dir_x * z, dir_y * z, z)
    }

    /// Back-projects a pixel whose sample is a scaled depth along the optical
    /// axis (TUM). A raw value of 0 means no measurement and yields a NaN point.
    ///
    /// # Arguments
    ///
    /// * x, y: Pixel coordinates.
    /// * raw_depth: The raw sensor value.
    /// * scale: Raw units per meter, e.g. [`crate::io::tum::DEPTH_SCALE`].
    pub fn backproject_axial_depth(
        &self,
        x: f32,
        y: f32,
        raw_depth: u16,
        scale: f32,
    ) -> Vector3<f32> {
        if raw_depth == 0 {
            return Vector3::repeat(f32::NAN);
        }

        let z = raw_depth as f32 / scale;
        Vector3::new((x - self.cx) * z / self.fx, (y - self.cy) * z / -self.fy, z)
    }
}
