//! Reader for the depth maps of the ICL-NUIM synthetic benchmark.
//!
//! Each depth file is plain text holding one floating point value per pixel,
//! whitespace-separated and in row-major order. The value is the distance
//! from the camera center to the surface (ray length), not the axial depth.

use std::path::Path;

use log::{debug, warn};
use ndarray::{Array1, Array2, Zip};

use crate::{
    camera::CameraModel, depth_image::DepthImage, error::ReaderError, pointcloud::PointCloud,
};

/// Reads `camera.len()` ray lengths from a depth file.
///
/// Extra values are ignored. When the file holds fewer values, the missing
/// samples are left at zero and a warning is logged.
pub fn read_depth_samples<P: AsRef<Path>>(
    filepath: P,
    camera: &CameraModel,
) -> Result<Array1<f32>, ReaderError> {
    let filepath = filepath.as_ref();
    let bytes = std::fs::read(filepath)?;
    let content = std::str::from_utf8(&bytes).map_err(|err| {
        ReaderError::decode(format!("{}: not a text file: {err}", filepath.display()))
    })?;

    let expected = camera.len();
    let (samples, count) = parse_depth_samples(content, expected)
        .map_err(|err| ReaderError::decode(format!("{}: {err}", filepath.display())))?;

    if count < expected {
        warn!(
            "{}: expected {expected} depth values but found {count}, \
             the remaining pixels are set to zero",
            filepath.display()
        );
    }

    Ok(samples)
}

/// Parses up to `expected` whitespace-separated ray lengths.
///
/// Returns the samples, zero padded to `expected`, and the number of values
/// actually found.
fn parse_depth_samples(content: &str, expected: usize) -> Result<(Array1<f32>, usize), String> {
    let mut samples = Array1::<f32>::zeros(expected);
    let mut count = 0;
    for (sample, token) in samples.iter_mut().zip(content.split_whitespace()) {
        let value = token
            .parse::<f32>()
            .map_err(|err| format!("invalid depth value {token:?} at index {count}: {err}"))?;
        if !value.is_finite() {
            return Err(format!("non-finite depth value {token:?} at index {count}"));
        }
        *sample = value;
        count += 1;
    }

    Ok((samples, count))
}

/// Reads an ICL-NUIM depth file into an organized point cloud.
///
/// The cloud is always dense since this dataset has no invalid samples.
pub fn read_cloud<P: AsRef<Path>>(
    filepath: P,
    camera: &CameraModel,
) -> Result<PointCloud, ReaderError> {
    let samples = read_depth_samples(filepath, camera)?;
    Ok(cloud_from_ray_lengths(&samples, camera))
}

/// Back-projects row-major ray lengths with the camera's image size.
pub fn cloud_from_ray_lengths(samples: &Array1<f32>, camera: &CameraModel) -> PointCloud {
    let width = camera.width();
    let mut cloud = PointCloud::zeros(width, camera.height());

    Zip::indexed(cloud.points.rows_mut())
        .and(samples)
        .par_for_each(|i, mut point, &ray_length| {
            let (x, y) = ((i % width) as f32, (i / width) as f32);
            let p = camera.backproject_ray_length(x, y, ray_length);
            point[0] = p[0];
            point[1] = p[1];
            point[2] = p[2];
        });

    debug!("Read ICL-NUIM cloud with {} points", cloud.len());
    cloud
}

/// Reads an ICL-NUIM depth file as a depth image normalized into [0, 1].
pub fn read_depth_image<P: AsRef<Path>>(
    filepath: P,
    camera: &CameraModel,
) -> Result<DepthImage, ReaderError> {
    let samples = read_depth_samples(filepath, camera)?;
    let raw = Array2::from_shape_vec((camera.height(), camera.width()), samples.into_raw_vec())
        .map_err(|err| ReaderError::decode(format!("Invalid depth image shape: {err}")))?;

    Ok(DepthImage::normalized(raw))
}
