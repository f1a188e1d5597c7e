use std::path::PathBuf;

use clap::Parser;
use log::info;
use rgbd_reader::{
    io::{icl_nuim, write_ply, Geometry},
    CameraModel, DepthFormat, ReaderError,
};

#[derive(Parser)]
struct Args {
    /// Format of the depth file: icl or tum
    format: String,
    /// Path to the depth file
    input: PathBuf,
    /// Output path: a PLY point cloud, or a PNG image with --image
    output: PathBuf,
    /// JSON file with the camera intrinsics, defaults to the benchmark's sensor
    #[arg(long, short)]
    camera: Option<PathBuf>,
    /// Writes the normalized depth image instead of the point cloud (ICL-NUIM only)
    #[arg(long, short)]
    image: bool,
    /// Number of worker threads, defaults to the number of CPUs
    #[arg(long, short)]
    threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let format: DepthFormat = args.format.parse()?;
    let camera = match &args.camera {
        Some(path) => CameraModel::from_json_file(path)?,
        None => format.default_camera(),
    };

    if args.image {
        if format != DepthFormat::IclNuim {
            let msg = "--image is only supported for ICL-NUIM files";
            return Err(ReaderError::invalid_parameter(msg).into());
        }
        let depth_image = icl_nuim::read_depth_image(&args.input, &camera)?;
        depth_image.to_luma16().save(&args.output)?;
        info!("Saved depth image to {}", args.output.display());
    } else {
        let cloud = format.read_cloud(&args.input, &camera)?;
        let geometry = Geometry::from(&cloud);
        write_ply(&args.output, &geometry)?;
        info!(
            "Saved {} of {} points to {} (dense: {})",
            geometry.len_vertices(),
            cloud.len(),
            args.output.display(),
            cloud.is_dense
        );
    }

    Ok(())
}
