//! Rendering parameters
//!
//! The subset of a render request that distinguishes one cached rendering from
//! another. Values are only ever used to build cache keys.

use std::str::FromStr;

use serde::Deserialize;

// == Projection ==
/// Intensity projections the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    IntMax,
    IntMean,
    IntSum,
}

impl Projection {
    /// Request spelling of the projection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Projection::IntMax => "intmax",
            Projection::IntMean => "intmean",
            Projection::IntSum => "intsum",
        }
    }
}

impl FromStr for Projection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intmax" => Ok(Projection::IntMax),
            "intmean" => Ok(Projection::IntMean),
            "intsum" => Ok(Projection::IntSum),
            _ => Err(()),
        }
    }
}

// == Render Params ==
/// Per-request rendering parameters (`c`, `m`, `p`, `q`, `region`, `tile`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderParams {
    /// Channel selector, e.g. `1|292:1631$FF0000,2|409:5015$0000FF`
    #[serde(default, rename = "c")]
    pub channels: Option<String>,
    /// Render mode (`c` colour, `g` greyscale)
    #[serde(default, rename = "m")]
    pub mode: Option<String>,
    #[serde(default, rename = "p")]
    pub projection: Option<String>,
    #[serde(default, rename = "q")]
    pub quality: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub tile: Option<String>,
}

impl RenderParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(mut self, channels: impl Into<String>) -> Self {
        self.channels = Some(channels.into());
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_tile(mut self, tile: impl Into<String>) -> Self {
        self.tile = Some(tile.into());
        self
    }

    /// Requested projection, or `None` when absent or not recognized.
    ///
    /// Unknown names (including `normal`) are treated as no projection
    /// rather than rejected.
    pub fn projection(&self) -> Option<Projection> {
        self.projection
            .as_deref()
            .filter(|p| !p.is_empty())
            .and_then(|p| p.parse().ok())
    }
}
