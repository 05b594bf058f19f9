use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use beaded_core::export::LocalDirSink;
use beaded_core::pipeline::{run_pipeline_reported, PipelineConfig, PipelineStage, ProgressReporter};
use beaded_core::render::{PngPresenter, Presenter, TracingPresenter};
use beaded_core::source::LocalCatalog;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::summary::{print_pipeline_summary, print_run_results};

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline config file (TOML); defaults are used when absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the catalog manifest path
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Override the output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for sampling and clustering
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of clusters
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Do not render PNG layers
    #[arg(long)]
    pub no_render: bool,
}

/// Drives an indicatif spinner from pipeline stage events.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg:24} {elapsed}")?);
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        if let Some(total) = total_items {
            self.bar.set_length(total as u64);
            self.bar.set_position(0);
        }
        self.bar.tick();
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        self.bar.tick();
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config: PipelineConfig = if let Some(ref config_path) = args.config {
        PipelineConfig::load(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        PipelineConfig::default()
    };
    if let Some(ref catalog) = args.catalog {
        config.catalog = catalog.clone();
    }
    if let Some(ref output) = args.output {
        config.output = output.clone();
    }
    if let Some(seed) = args.seed {
        config.sampling.seed = Some(seed);
        config.clustering.seed = Some(seed);
    }
    if let Some(k) = args.k {
        config.clustering.k = k;
    }

    print_pipeline_summary(&config);

    let catalog = LocalCatalog::open(&config.catalog)
        .with_context(|| format!("Failed to open catalog {}", config.catalog.display()))?;
    let reporter = Arc::new(BarReporter::new()?);
    let output = run_pipeline_reported(&config, &catalog, &LocalDirSink, reporter.clone())?;
    reporter.bar.finish_with_message("Done");

    TracingPresenter.present(&output.composition)?;
    if !args.no_render {
        let presenter = PngPresenter::new(config.output.join("layers"));
        presenter
            .present(&output.composition)
            .with_context(|| format!("Failed to render layers to {}", presenter.dir().display()))?;
    }

    print_run_results(&output, (!args.no_render).then(|| config.output.join("layers")));
    Ok(())
}
