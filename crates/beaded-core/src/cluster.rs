//! K-means clustering of sampled pixels.
//!
//! The model is fitted once on a [`SampleSet`] and then applied, unchanged,
//! to every pixel of a raster.

use ndarray::Array2;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{
    DEFAULT_CLUSTER_COUNT, DEFAULT_KMEANS_CONVERGENCE, DEFAULT_KMEANS_MAX_ITERATIONS,
    PARALLEL_PIXEL_THRESHOLD,
};
use crate::error::{BeadedError, Result};
use crate::raster::{is_valid, LabelRaster, Raster};
use crate::sample::{make_rng, SampleSet};

/// K-means parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    /// Number of clusters.
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Stop when no centroid moves further than this.
    #[serde(default = "default_convergence")]
    pub convergence: f64,
    /// Seed for centroid initialisation; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Min-max normalise each feature before computing distances.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

fn default_k() -> usize {
    DEFAULT_CLUSTER_COUNT
}
fn default_max_iterations() -> usize {
    DEFAULT_KMEANS_MAX_ITERATIONS
}
fn default_convergence() -> f64 {
    DEFAULT_KMEANS_CONVERGENCE
}
fn default_normalize() -> bool {
    true
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTER_COUNT,
            max_iterations: DEFAULT_KMEANS_MAX_ITERATIONS,
            convergence: DEFAULT_KMEANS_CONVERGENCE,
            seed: None,
            normalize: true,
        }
    }
}

impl KMeansParams {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }
}

/// A fitted clustering model.
#[derive(Clone, Debug)]
pub struct KMeansModel {
    pub k: usize,
    /// Bands the model was trained on, in feature order.
    pub band_names: Vec<String>,
    /// Centroids in (possibly normalised) feature space.
    pub centroids: Vec<Vec<f64>>,
    /// Per-feature `(min, max)` used for normalisation, if enabled.
    pub ranges: Option<Vec<(f64, f64)>>,
    /// Lloyd iterations performed.
    pub iterations: usize,
    /// Sum of squared distances of training points to their centroid.
    pub inertia: f64,
}

impl KMeansModel {
    fn scale_features(&self, features: &mut [f64]) {
        if let Some(ref ranges) = self.ranges {
            normalize_in_place(features, ranges);
        }
    }

    /// Nearest centroid for one feature vector (already in model space).
    pub fn nearest(&self, features: &[f64]) -> u32 {
        nearest_centroid(&self.centroids, features).0 as u32
    }

    /// Label for one raw (unnormalised) feature vector.
    pub fn classify(&self, raw: &[f32]) -> u32 {
        let mut features: Vec<f64> = raw.iter().map(|&v| v as f64).collect();
        self.scale_features(&mut features);
        self.nearest(&features)
    }
}

/// Train a k-means model on a sample set.
///
/// Fails with a configuration error when `k == 0`, and with
/// [`BeadedError::InsufficientData`] when there are fewer samples than `k`.
pub fn fit(samples: &SampleSet, params: &KMeansParams) -> Result<KMeansModel> {
    if params.k == 0 {
        return Err(BeadedError::invalid_parameter("k", 0, "need at least one cluster"));
    }
    if samples.len() < params.k {
        return Err(BeadedError::InsufficientData {
            samples: samples.len(),
            k: params.k,
        });
    }
    if samples.feature_count() == 0 {
        return Err(BeadedError::invalid_parameter(
            "samples",
            0,
            "sample set has no bands",
        ));
    }

    let mut points: Vec<Vec<f64>> = samples
        .records
        .iter()
        .map(|r| r.values.iter().map(|&v| v as f64).collect())
        .collect();

    let ranges = params.normalize.then(|| feature_ranges(&points));
    if let Some(ref ranges) = ranges {
        for p in points.iter_mut() {
            normalize_in_place(p, ranges);
        }
    }

    let mut rng = make_rng(params.seed);
    let mut centroids = kmeans_plus_plus(&points, params.k, &mut rng);
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for _ in 0..params.max_iterations.max(1) {
        iterations += 1;

        labels.par_iter_mut().enumerate().for_each(|(i, label)| {
            *label = nearest_centroid(&centroids, &points[i]).0;
        });

        let dims = points[0].len();
        let mut sums = vec![vec![0.0f64; dims]; params.k];
        let mut counts = vec![0usize; params.k];
        for (p, &label) in points.iter().zip(labels.iter()) {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(p) {
                *s += v;
            }
        }

        let mut max_shift = 0.0f64;
        for k in 0..params.k {
            if counts[k] == 0 {
                // Empty cluster keeps its centroid.
                continue;
            }
            let updated: Vec<f64> = sums[k].iter().map(|s| s / counts[k] as f64).collect();
            max_shift = max_shift.max(squared_distance(&updated, &centroids[k]).sqrt());
            centroids[k] = updated;
        }

        if max_shift < params.convergence {
            break;
        }
    }

    let inertia: f64 = points
        .iter()
        .map(|p| nearest_centroid(&centroids, p).1)
        .sum();

    info!(
        k = params.k,
        samples = points.len(),
        iterations,
        inertia,
        "K-means fitted"
    );

    Ok(KMeansModel {
        k: params.k,
        band_names: samples.band_names.clone(),
        centroids,
        ranges,
        iterations,
        inertia,
    })
}

/// Classify every pixel of `raster` with a fitted model.
///
/// The raster must contain all bands the model was trained on. Pixels with
/// any no-data feature are labelled 0 and flagged invalid.
pub fn predict(model: &KMeansModel, raster: &Raster) -> Result<LabelRaster> {
    let bands: Vec<&Array2<f32>> = model
        .band_names
        .iter()
        .map(|name| raster.band(name))
        .collect::<Result<_>>()?;
    let (h, w) = raster.shape();

    let classify_row = |row: usize| -> Vec<(u32, bool)> {
        let mut raw = vec![0.0f32; bands.len()];
        (0..w)
            .map(|col| {
                for (slot, band) in raw.iter_mut().zip(&bands) {
                    *slot = band[[row, col]];
                }
                if raw.iter().all(|&v| is_valid(v)) {
                    (model.classify(&raw), true)
                } else {
                    (0, false)
                }
            })
            .collect()
    };

    let rows: Vec<Vec<(u32, bool)>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(classify_row).collect()
    } else {
        (0..h).map(classify_row).collect()
    };

    let mut labels = Array2::<u32>::zeros((h, w));
    let mut valid = Array2::<bool>::from_elem((h, w), false);
    for (row, values) in rows.into_iter().enumerate() {
        for (col, (label, ok)) in values.into_iter().enumerate() {
            labels[[row, col]] = label;
            valid[[row, col]] = ok;
        }
    }

    let out = LabelRaster {
        labels,
        valid,
        k: model.k,
        transform: *raster.transform(),
    };
    debug!(counts = ?out.class_counts(), "Classified raster");
    Ok(out)
}

fn feature_ranges(points: &[Vec<f64>]) -> Vec<(f64, f64)> {
    let dims = points[0].len();
    let mut ranges = vec![(f64::INFINITY, f64::NEG_INFINITY); dims];
    for p in points {
        for (r, &v) in ranges.iter_mut().zip(p) {
            r.0 = r.0.min(v);
            r.1 = r.1.max(v);
        }
    }
    ranges
}

fn normalize_in_place(features: &mut [f64], ranges: &[(f64, f64)]) {
    for (v, &(lo, hi)) in features.iter_mut().zip(ranges) {
        let span = hi - lo;
        *v = if span > 0.0 { (*v - lo) / span } else { 0.0 };
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// (index, squared distance) of the closest centroid.
fn nearest_centroid(centroids: &[Vec<f64>], point: &[f64]) -> (usize, f64) {
    let mut best = (0usize, f64::INFINITY);
    for (k, c) in centroids.iter().enumerate() {
        let d = squared_distance(c, point);
        if d < best.1 {
            best = (k, d);
        }
    }
    best
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn kmeans_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut impl Rng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    let mut dist: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, &d) in dist.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // All remaining points coincide with a centroid.
            rng.gen_range(0..points.len())
        };

        let c = points[next].clone();
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &c));
        }
        centroids.push(c);
    }
    centroids
}
