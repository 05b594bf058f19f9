use std::path::PathBuf;

use anyhow::{Context, Result};
use beaded_core::cluster::{fit, predict, KMeansParams};
use beaded_core::consts::{DEFAULT_CLUSTER_COUNT, DEFAULT_MAX_SAMPLES};
use beaded_core::io::{brf, image_io};
use beaded_core::raster::Raster;
use beaded_core::render::draw::draw_labels;
use beaded_core::sample::{sample, SampleParams};
use clap::Args;

use super::{is_brf, load_raster, parse_region};

#[derive(Args)]
pub struct ClusterArgs {
    /// Input `.brf` raster (index or multi-band image)
    pub file: PathBuf,

    /// Number of clusters
    #[arg(short, long, default_value_t = DEFAULT_CLUSTER_COUNT)]
    pub k: usize,

    /// Maximum number of training pixels
    #[arg(long, default_value_t = DEFAULT_MAX_SAMPLES)]
    pub max_samples: usize,

    /// Sampling distance in raster units (default: native resolution)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Restrict sampling to a polygon: lon,lat,lon,lat,...
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub region: Vec<f64>,

    /// Only use these bands as features (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub bands: Vec<String>,

    /// Seed for sampling and centroid initialisation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable min-max feature normalisation
    #[arg(long)]
    pub no_normalize: bool,

    /// Output path (`.brf` keeps label ids, anything else renders PNG)
    #[arg(short, long, default_value = "clusters.png")]
    pub output: PathBuf,
}

pub fn run(args: &ClusterArgs) -> Result<()> {
    let mut raster = load_raster(&args.file)?;
    if !args.bands.is_empty() {
        raster = raster.select(&args.bands)?;
    }
    let region = parse_region(&args.region)?;

    let mut sample_params =
        SampleParams::new(args.scale.unwrap_or_else(|| raster.scale()), args.max_samples);
    sample_params.seed = args.seed;
    let samples = sample(&raster, region.as_ref(), &sample_params)?;
    println!("Sampled {} pixel(s) from {}", samples.len(), args.file.display());

    let params = KMeansParams {
        k: args.k,
        seed: args.seed,
        normalize: !args.no_normalize,
        ..Default::default()
    };
    let model = fit(&samples, &params)?;
    let labels = predict(&model, &raster)?;

    println!(
        "k-means: k={} iterations={} inertia={:.4}",
        model.k, model.iterations, model.inertia
    );
    let total = labels.labels.len().max(1);
    for (class, count) in labels.class_counts().iter().enumerate() {
        println!(
            "  cluster {}: {:>8} px ({:>5.1}%)",
            class,
            count,
            100.0 * *count as f64 / total as f64
        );
    }

    let written = if is_brf(&args.output) {
        let ids = Raster::single("cluster", labels.labels.mapv(|l| l as f32), labels.transform);
        brf::write_raster(&args.output, &ids, "kmeans", None)
    } else {
        image_io::save_png(&draw_labels(&labels), &args.output)
    };
    written.with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Clusters saved to {}", args.output.display());
    Ok(())
}
