//! Pipeline configuration.
//!
//! Plain-data settings threaded explicitly into each component entry point.
//! There is no global settings object: callers construct (or deserialize) a
//! [`PipelineConfig`], validate it once, and pass it down.

use h3o::Resolution;
use serde::{Deserialize, Serialize};

use crate::error::{ProspectError, Result};
use crate::score::DecayKernel;

/// Top-level configuration for one pipeline run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hex grid settings.
    pub grid: GridSettings,
    /// Distance-decay kernel settings.
    pub kernel: KernelSettings,
    /// Relative importance of rock type A in the combined score, in `[0, 1]`.
    /// `1.0` scores on proximity to A alone, `0.0` on proximity to B alone.
    pub weight_a: f64,
}

/// Hex tiling granularity.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// H3 resolution level (0-15). Higher means smaller, more numerous cells.
    pub resolution: u8,
}

/// Distance-decay kernel parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    /// Fall-off distance in kilometres: the distance at which membership
    /// drops to `e^-1` (Gaussian) or `0` (linear).
    pub falloff_km: f64,
    /// Shape exponent for the Gaussian kernel. Ignored by the linear kernel.
    pub alpha: f64,
    /// Which decay kernel to apply.
    pub shape: KernelShape,
}

/// Decay kernel selector, resolved to a [`DecayKernel`] once per run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelShape {
    /// `exp(-(d/d0)^alpha)`.
    #[default]
    Gaussian,
    /// `clip(1 - d/d0, 0, 1)`.
    Linear,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            kernel: KernelSettings::default(),
            weight_a: 0.5,
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self { resolution: 7 }
    }
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            falloff_km: 2.0,
            alpha: 2.0,
            shape: KernelShape::Gaussian,
        }
    }
}

impl PipelineConfig {
    /// Checks every parameter the core assumes valid.
    ///
    /// The first violation aborts the run; nothing is silently corrected.
    pub fn validate(&self) -> Result<()> {
        if Resolution::try_from(self.grid.resolution).is_err() {
            return Err(ProspectError::Config(format!(
                "resolution {} is out of range (0-15)",
                self.grid.resolution
            )));
        }
        if !self.kernel.falloff_km.is_finite() || self.kernel.falloff_km <= 0.0 {
            return Err(ProspectError::Config(format!(
                "falloff_km must be positive and finite, got {}",
                self.kernel.falloff_km
            )));
        }
        if !self.kernel.alpha.is_finite() || self.kernel.alpha <= 0.0 {
            return Err(ProspectError::Config(format!(
                "alpha must be positive and finite, got {}",
                self.kernel.alpha
            )));
        }
        if !self.weight_a.is_finite() || !(0.0..=1.0).contains(&self.weight_a) {
            return Err(ProspectError::Config(format!(
                "weight_a must be in [0, 1], got {}",
                self.weight_a
            )));
        }
        Ok(())
    }

    /// The configured H3 resolution.
    ///
    /// Call [`Self::validate`] first; an out-of-range level is reported there
    /// with context instead of here.
    pub fn resolution(&self) -> Result<Resolution> {
        Resolution::try_from(self.grid.resolution).map_err(|_| {
            ProspectError::Config(format!(
                "resolution {} is out of range (0-15)",
                self.grid.resolution
            ))
        })
    }

    /// Builds the decay kernel for this run.
    ///
    /// Dispatch happens here, once; the per-cell hot path is direct numeric
    /// computation on the returned variant.
    pub fn decay_kernel(&self) -> DecayKernel {
        let d0_m = self.kernel.falloff_km * 1_000.0;
        match self.kernel.shape {
            KernelShape::Gaussian => DecayKernel::Gaussian {
                d0_m,
                alpha: self.kernel.alpha,
            },
            KernelShape::Linear => DecayKernel::Linear { d0_m },
        }
    }
}
