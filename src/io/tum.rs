use std::{
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use image::DynamicImage;
use log::debug;
use ndarray::{Array2, ArrayView2, Zip};
use nshare::ToNdarray2;

use crate::{camera::CameraModel, error::ReaderError, pointcloud::PointCloud};

/// U16 depth values are scaled for better precision.
/// So 5000 in the 16 bits gray png corresponds to 1m.
pub const DEPTH_SCALE: f32 = 5000.0;

/// Loads a TUM depth image as raw 16 bits values, with shape (height, width).
///
/// Only single channel 16 bits images are accepted, so values are never
/// stretched from another bit depth.
pub fn load_depth_image<P: AsRef<Path>>(filepath: P) -> Result<Array2<u16>, ReaderError> {
    let filepath = filepath.as_ref();
    let reader = image::io::Reader::open(filepath)?.with_guessed_format()?;
    match reader.decode()? {
        DynamicImage::ImageLuma16(depth) => Ok(depth.into_ndarray2()),
        other => Err(ReaderError::decode(format!(
            "{}: expected a single channel 16 bits depth image, found {:?}",
            filepath.display(),
            other.color()
        ))),
    }
}

/// Reads a TUM depth image into an organized point cloud.
///
/// The cloud takes the size of the image, while the projection uses the
/// camera's focal lengths and principal point.
pub fn read_cloud<P: AsRef<Path>>(
    filepath: P,
    camera: &CameraModel,
) -> Result<PointCloud, ReaderError> {
    let depth = load_depth_image(filepath)?;
    Ok(cloud_from_depth(depth.view(), camera, DEPTH_SCALE))
}

/// Back-projects a raw depth image. Zero pixels become NaN points and make
/// the cloud non-dense.
///
/// # Arguments
///
/// * `depth` - Raw depth values, shape (height, width).
/// * `camera` - Projection parameters.
/// * `scale` - Raw units per meter.
pub fn cloud_from_depth(depth: ArrayView2<u16>, camera: &CameraModel, scale: f32) -> PointCloud {
    let (height, width) = depth.dim();
    let mut cloud = PointCloud::zeros(width, height);
    let has_invalid = AtomicBool::new(false);

    Zip::indexed(cloud.points.rows_mut()).par_for_each(|i, mut point| {
        let (x, y) = (i % width, i / width);
        let raw_depth = depth[[y, x]];
        if raw_depth == 0 {
            has_invalid.fetch_or(true, Ordering::Relaxed);
        }

        let p = camera.backproject_axial_depth(x as f32, y as f32, raw_depth, scale);
        point[0] = p[0];
        point[1] = p[1];
        point[2] = p[2];
    });

    cloud.is_dense = !has_invalid.into_inner();
    debug!("Read TUM cloud of {width}x{height}, dense: {}", cloud.is_dense);
    cloud
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Luma};
    use nalgebra::Vector3;
    use ndarray::{array, Array2};
    use rstest::*;
    use tempfile::TempDir;

    use super::{cloud_from_depth, load_depth_image, read_cloud, DEPTH_SCALE};
    use crate::{camera::CameraModel, error::ReaderError};

    #[fixture]
    fn camera() -> CameraModel {
        CameraModel::new(4, 3, 500.0, 500.0, 0.0, 0.0).unwrap()
    }

    fn save_depth(dir: &TempDir, depth: &Array2<u16>) -> std::path::PathBuf {
        let (height, width) = depth.dim();
        let image =
            ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(width as u32, height as u32, |x, y| {
                Luma([depth[[y as usize, x as usize]]])
            });
        let path = dir.path().join("depth.png");
        image.save(&path).unwrap();
        path
    }

    #[rstest]
    fn should_read_metric_depth_at_principal_point(camera: CameraModel) {
        let dir = tempfile::tempdir().unwrap();
        let path = save_depth(&dir, &array![[5000, 5000], [5000, 10000]]);

        let cloud = read_cloud(&path, &camera).unwrap();
        assert_eq!(cloud.point(0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(cloud.point_at(1, 1), Vector3::new(0.004, -0.004, 2.0));
        assert!(cloud.is_dense);
    }

    #[rstest]
    fn should_adopt_image_size(camera: CameraModel) {
        let dir = tempfile::tempdir().unwrap();
        let path = save_depth(&dir, &Array2::from_elem((2, 5), 1000));

        let cloud = read_cloud(&path, &camera).unwrap();
        assert_eq!((cloud.width, cloud.height), (5, 2));
        assert_eq!(cloud.len(), 10);
    }

    #[rstest]
    fn should_mark_zero_pixels_invalid(camera: CameraModel) {
        let depth = array![[5000, 5000, 5000], [5000, 0, 5000]];
        let cloud = cloud_from_depth(depth.view(), &camera, DEPTH_SCALE);

        assert!(!cloud.is_dense);
        let invalid = (0..cloud.len())
            .filter(|&i| !cloud.point(i).iter().all(|v| v.is_finite()))
            .collect::<Vec<_>>();
        assert_eq!(invalid, vec![4]);
        assert!(cloud.point_at(1, 1).iter().all(|v| v.is_nan()));
    }

    #[rstest]
    fn should_keep_dense_flag_on_large_images(camera: CameraModel) {
        let mut depth = Array2::<u16>::from_elem((480, 640), 1234);
        let cloud = cloud_from_depth(depth.view(), &camera, DEPTH_SCALE);
        assert!(cloud.is_dense);

        depth[[479, 639]] = 0;
        let cloud = cloud_from_depth(depth.view(), &camera, DEPTH_SCALE);
        assert!(!cloud.is_dense);
        assert_eq!(cloud.valid_points_count(), 640 * 480 - 1);
    }

    #[rstest]
    fn should_preserve_raw_values() {
        let dir = tempfile::tempdir().unwrap();
        let depth = array![[0, 1, 65535], [5000, 300, 12]];
        let path = save_depth(&dir, &depth);

        assert_eq!(load_depth_image(&path).unwrap(), depth);
    }

    #[rstest]
    fn should_reject_8_bits_images(camera: CameraModel) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(4, 3, Luma([10])).save(&path).unwrap();

        assert!(matches!(
            read_cloud(&path, &camera),
            Err(ReaderError::Decode(_))
        ));
    }

    #[rstest]
    fn should_fail_on_missing_file(camera: CameraModel) {
        assert!(matches!(
            read_cloud("does/not/exist.png", &camera),
            Err(ReaderError::Io(_))
        ));
    }

    #[rstest]
    fn should_be_deterministic(camera: CameraModel) {
        let depth = array![[5000, 0, 7000], [1, 2, 3]];
        let first = cloud_from_depth(depth.view(), &camera, DEPTH_SCALE);
        let second = cloud_from_depth(depth.view(), &camera, DEPTH_SCALE);

        for (a, b) in first.points.iter().zip(second.points.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(first.is_dense, second.is_dense);
    }
}
