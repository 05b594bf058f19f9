use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

use super::palette::Palette;

/// Band selection, either as a list or the comma-joined form `"B4,B3,B2"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BandSpec {
    List(Vec<String>),
    Joined(String),
}

impl BandSpec {
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::List(v) => v.clone(),
            Self::Joined(s) => s
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

/// A scalar applied to every band, or one value per band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerBand {
    Scalar(f32),
    List(Vec<f32>),
}

impl PerBand {
    fn expand(&self, name: &str, bands: usize) -> Result<Vec<f32>> {
        match self {
            Self::Scalar(v) => Ok(vec![*v; bands]),
            Self::List(v) if v.len() == 1 => Ok(vec![v[0]; bands]),
            Self::List(v) if v.len() == bands => Ok(v.clone()),
            Self::List(v) => Err(ConfigurationError::InvalidVisParams(format!(
                "{name} has {} values for {bands} band(s)",
                v.len()
            ))
            .into()),
        }
    }
}

/// Display parameters for one layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<BandSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<PerBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<PerBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<PerBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl VisParams {
    /// Linear stretch over `[min, max]` on the default band(s).
    pub fn stretch(min: f32, max: f32) -> Self {
        Self {
            min: Some(PerBand::Scalar(min)),
            max: Some(PerBand::Scalar(max)),
            ..Default::default()
        }
    }

    /// Three-band composite with a common stretch.
    pub fn rgb(bands: [&str; 3], min: f32, max: f32) -> Self {
        Self {
            bands: Some(BandSpec::List(bands.iter().map(|b| b.to_string()).collect())),
            ..Self::stretch(min, max)
        }
    }

    pub fn with_palette(mut self, colors: &[&str]) -> Self {
        self.palette = Some(colors.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_gamma(mut self, gamma: Vec<f32>) -> Self {
        self.gamma = Some(PerBand::List(gamma));
        self
    }

    pub fn with_max(mut self, max: Vec<f32>) -> Self {
        self.max = Some(PerBand::List(max));
        self
    }

    /// Check these parameters against a raster's band list and fill in
    /// defaults: first three bands (or the first band) when none are named,
    /// `min = 0`, `max = 1`, `gamma = 1`.
    pub fn resolve(&self, available: &[&str]) -> Result<ResolvedVis> {
        let bands = match self.bands {
            Some(ref spec) => spec.names(),
            None if available.len() >= 3 => available[..3].iter().map(|s| s.to_string()).collect(),
            None => available.iter().take(1).map(|s| s.to_string()).collect(),
        };
        if bands.len() != 1 && bands.len() != 3 {
            return Err(invalid(format!(
                "expected 1 or 3 bands, got {}",
                bands.len()
            )));
        }
        if let Some(missing) = bands.iter().find(|b| !available.contains(&b.as_str())) {
            return Err(ConfigurationError::MissingBand {
                name: missing.clone(),
                available: available.iter().map(|s| s.to_string()).collect(),
            }
            .into());
        }

        let n = bands.len();
        let min = self
            .min
            .as_ref()
            .map_or(Ok(vec![0.0; n]), |m| m.expand("min", n))?;
        let max = self
            .max
            .as_ref()
            .map_or(Ok(vec![1.0; n]), |m| m.expand("max", n))?;
        let gamma = self
            .gamma
            .as_ref()
            .map_or(Ok(vec![1.0; n]), |g| g.expand("gamma", n))?;

        for i in 0..n {
            if !(max[i] - min[i]).is_normal() {
                return Err(invalid(format!(
                    "band {} has an empty stretch range [{}, {}]",
                    bands[i], min[i], max[i]
                )));
            }
        }
        if let Some(g) = gamma.iter().find(|g| **g <= 0.0 || !g.is_finite()) {
            return Err(invalid(format!("gamma must be positive, got {g}")));
        }

        let palette = match self.palette {
            Some(ref colors) if n != 1 => {
                return Err(invalid(format!(
                    "palette needs a single band, got {n} ({colors:?})"
                )))
            }
            Some(ref colors) => Some(Palette::parse(colors)?),
            None => None,
        };

        Ok(ResolvedVis {
            bands,
            min,
            max,
            gamma,
            palette,
        })
    }
}

fn invalid(msg: String) -> crate::error::BeadedError {
    ConfigurationError::InvalidVisParams(msg).into()
}

impl fmt::Display for VisParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref b) = self.bands {
            parts.push(format!("bands={}", b.names().join(",")));
        }
        if let Some(ref m) = self.min {
            parts.push(format!("min={m:?}"));
        }
        if let Some(ref m) = self.max {
            parts.push(format!("max={m:?}"));
        }
        if let Some(ref g) = self.gamma {
            parts.push(format!("gamma={g:?}"));
        }
        if let Some(ref p) = self.palette {
            parts.push(format!("palette={}", p.join(",")));
        }
        if parts.is_empty() {
            write!(f, "default")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

/// Fully expanded display parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedVis {
    pub bands: Vec<String>,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
    pub gamma: Vec<f32>,
    pub palette: Option<Palette>,
}

impl ResolvedVis {
    /// Stretch + gamma for band `i`, result in [0, 1].
    pub fn normalize(&self, i: usize, v: f32) -> f32 {
        let t = ((v - self.min[i]) / (self.max[i] - self.min[i])).clamp(0.0, 1.0);
        if self.gamma[i] == 1.0 {
            t
        } else {
            t.powf(1.0 / self.gamma[i])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_band_string() {
        let spec = BandSpec::Joined("B4, B3,B2".into());
        assert_eq!(spec.names(), vec!["B4", "B3", "B2"]);
    }

    #[test]
    fn test_defaults_pick_first_three() {
        let r = VisParams::default().resolve(&["B1", "B2", "B3", "B4"]).unwrap();
        assert_eq!(r.bands, vec!["B1", "B2", "B3"]);
        assert_eq!(r.max, vec![1.0; 3]);
    }

    #[test]
    fn test_per_band_max_length_checked() {
        let v = VisParams::rgb(["B4", "B3", "B2"], 0.0, 1.0).with_max(vec![1.0, 2.0]);
        assert!(v.resolve(&["B2", "B3", "B4"]).is_err());
    }

    #[test]
    fn test_palette_requires_single_band() {
        let v = VisParams::rgb(["B4", "B3", "B2"], 0.0, 1.0).with_palette(&["white", "blue"]);
        assert!(v.resolve(&["B2", "B3", "B4"]).is_err());
    }

    #[test]
    fn test_gamma_applied() {
        let v = VisParams::stretch(0.0, 1.0).with_gamma(vec![2.0]);
        let r = v.resolve(&["MNDWI"]).unwrap();
        assert!((r.normalize(0, 0.25) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_range_rejected() {
        assert!(VisParams::stretch(1.0, 1.0).resolve(&["a"]).is_err());
    }
}
