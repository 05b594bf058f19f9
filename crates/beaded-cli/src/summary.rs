use std::path::PathBuf;

use beaded_core::pipeline::{PipelineConfig, PipelineOutput};
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Beaded Stream Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(22)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Catalog"),
        s.path.apply_to(config.catalog.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Region"),
        s.value.apply_to(format!("{} vertices", config.region.vertices.len()))
    );
    println!();

    for run in &config.sensors {
        println!("  {}", s.header.apply_to(&run.sensor.name));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Collection"),
            s.value.apply_to(&run.collection)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("MNDWI"),
            s.method.apply_to(format!("{} vs {}", run.sensor.green_band, run.sensor.other_band))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Threshold"),
            s.value.apply_to(run.sensor.threshold)
        );
        if let Some(ref range) = run.date_range {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Dates"),
                s.value.apply_to(format!("{} .. {}", range.start, range.end))
            );
        }
        if let Some(ref key) = run.sort_key {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Sort"),
                s.value.apply_to(key)
            );
        }
        let targets: Vec<String> = run.cluster.iter().map(|t| t.to_string()).collect();
        if targets.is_empty() {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Cluster"),
                s.disabled.apply_to("disabled")
            );
        } else {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Cluster"),
                s.method.apply_to(targets.join(", "))
            );
        }
        println!();
    }

    println!("  {}", s.header.apply_to("Clustering"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("k"),
        s.value.apply_to(config.clustering.k)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Samples"),
        s.value.apply_to(config.sampling.max_samples)
    );
    match config.sampling.seed {
        Some(seed) => println!(
            "    {:<12}{}",
            s.label.apply_to("Seed"),
            s.value.apply_to(seed)
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Seed"),
            s.disabled.apply_to("random")
        ),
    }
    println!();
}

pub fn print_run_results(output: &PipelineOutput, layers_dir: Option<PathBuf>) {
    let s = Styles::new();

    println!();
    for out in &output.sensors {
        println!(
            "  {} {}",
            s.header.apply_to(&out.sensor.name),
            s.label.apply_to(&out.image_id)
        );
        let (rows, cols) = out.index.shape();
        let total = (rows * cols).max(1);
        println!(
            "    {:<12}{}",
            s.label.apply_to("Flagged"),
            s.value.apply_to(format!(
                "{} px ({:.1}%)",
                out.mask.count_set(),
                100.0 * out.mask.count_set() as f64 / total as f64
            ))
        );
        for c in &out.clusters {
            println!(
                "    {:<12}{}",
                s.label.apply_to(format!("k-means {}", c.target)),
                s.value.apply_to(format!(
                    "{} samples, {} iterations, sizes {:?}",
                    c.samples,
                    c.model.iterations,
                    c.labels.class_counts()
                ))
            );
        }
        if let Some(ref receipt) = out.export {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Exported"),
                s.path.apply_to(receipt.path.display())
            );
        }
    }
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Layers"),
        s.value.apply_to(output.composition.labels().join(", "))
    );
    if let Some(dir) = layers_dir {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Rendered to"),
            s.path.apply_to(dir.display())
        );
    }
    println!();
}
