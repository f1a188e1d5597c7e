use image::{ImageBuffer, Luma};
use ndarray::Array2;

/// Single channel floating point depth map for visualization.
/// Values are in [0, 1] once normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthImage {
    /// Depth values, as array with shape: (height, width)
    pub data: Array2<f32>,
}

impl DepthImage {
    /// Creates a depth image by min-max normalizing `raw` into [0, 1].
    /// The minimum maps to 0 and the maximum to 1. A constant image maps to 0,
    /// and so do non-finite values, which are left out of the range.
    pub fn normalized(mut raw: Array2<f32>) -> Self {
        let (min, max) = raw
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });

        let range = max - min;
        if range > 0.0 && range.is_finite() {
            raw.mapv_inplace(|v| {
                if v.is_finite() {
                    (v - min) / range
                } else {
                    0.0
                }
            });
        } else {
            raw.fill(0.0);
        }

        Self { data: raw }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Convert into a 16 bits grayscale image, mapping [0, 1] to [0, u16::MAX].
    pub fn to_luma16(&self) -> ImageBuffer<Luma<u16>, Vec<u16>> {
        ImageBuffer::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            let value = self.data[[y as usize, x as usize]].clamp(0.0, 1.0);
            Luma([(value * u16::MAX as f32).round() as u16])
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::DepthImage;

    #[test]
    fn should_map_extremes_to_unit_range() {
        let image = DepthImage::normalized(array![[1.0, 2.0], [3.0, 5.0]]);
        assert_eq!(image.data, array![[0.0, 0.25], [0.5, 1.0]]);
    }

    #[test]
    fn should_map_constant_image_to_zero() {
        let image = DepthImage::normalized(array![[2.5, 2.5, 2.5]]);
        assert_eq!(image.data, array![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn should_map_non_finite_values_to_zero() {
        let image = DepthImage::normalized(array![
            [1.0, f32::NAN],
            [3.0, 5.0],
            [f32::INFINITY, -f32::INFINITY]
        ]);
        assert!(image.data.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(image.data, array![[0.0, 0.0], [0.5, 1.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_to_luma16() {
        let image = DepthImage::normalized(array![[0.0, 1.0], [2.0, 4.0]]);
        let luma = image.to_luma16();
        assert_eq!(luma.dimensions(), (2, 2));
        assert_eq!(luma.get_pixel(0, 0)[0], 0);
        assert_eq!(luma.get_pixel(1, 1)[0], u16::MAX);
        assert_eq!(luma.get_pixel(0, 1)[0], 32768);
    }
}
