pub mod icl_nuim;
pub mod tum;

mod geometry;
pub use geometry::Geometry;
mod ply;
pub use ply::{read_ply, write_ply};

use std::{path::Path, str::FromStr};

use crate::{camera::CameraModel, error::ReaderError, pointcloud::PointCloud};

/// Supported depth map formats.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DepthFormat {
    /// ICL-NUIM text files with ray lengths.
    IclNuim,
    /// TUM RGB-D 16 bits PNG files.
    Tum,
}

impl DepthFormat {
    /// The camera model of the benchmark's sensor.
    pub fn default_camera(&self) -> CameraModel {
        match self {
            DepthFormat::IclNuim => CameraModel::icl_nuim(),
            DepthFormat::Tum => CameraModel::tum(),
        }
    }

    /// Reads a depth file of this format into a point cloud.
    pub fn read_cloud<P: AsRef<Path>>(
        &self,
        filepath: P,
        camera: &CameraModel,
    ) -> Result<PointCloud, ReaderError> {
        match self {
            DepthFormat::IclNuim => icl_nuim::read_cloud(filepath, camera),
            DepthFormat::Tum => tum::read_cloud(filepath, camera),
        }
    }
}

impl FromStr for DepthFormat {
    type Err = ReaderError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "icl" | "icl-nuim" => Ok(DepthFormat::IclNuim),
            "tum" => Ok(DepthFormat::Tum),
            _ => Err(ReaderError::invalid_parameter(format!(
                "Invalid depth format: {format}"
            ))),
        }
    }
}
