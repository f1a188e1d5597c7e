pub mod camera;
pub mod depth_image;
pub mod error;
pub mod io;
pub mod pointcloud;

pub use crate::camera::CameraModel;
pub use crate::depth_image::DepthImage;
pub use crate::error::ReaderError;
pub use crate::io::DepthFormat;
pub use crate::pointcloud::PointCloud;
