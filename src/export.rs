// Meshing happens outside this crate; `SummaryExporter` only probes the
// shells on a coarse grid and logs what it finds.

use glam::{dvec3, DVec3};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::keyboard::KeyboardShell;
use crate::shape::{Aabb, Shape};

/// Receives the finished front and back shells.
pub trait Exporter {
    fn export(&self, shell: &KeyboardShell) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSettings {
    /// Grid cells along the longest side of a shape's bounds.
    #[serde(default = "default_resolution")]
    pub resolution: usize,
}

fn default_resolution() -> usize {
    64
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
        }
    }
}

/// What a grid probe found in one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSummary {
    pub bounds: Option<Aabb>,
    pub samples: usize,
    pub occupied: usize,
    /// Occupied cells times the cell volume (mm³).
    pub volume: f64,
}

/// Sample `shape` at the center of every cell of a grid laid over its
/// bounds.
pub fn summarize(shape: &Shape, resolution: usize) -> ShapeSummary {
    let Some(bounds) = shape.bounds() else {
        return ShapeSummary {
            bounds: None,
            samples: 0,
            occupied: 0,
            volume: 0.,
        };
    };
    let size = bounds.size();
    let step = size.max_element() / resolution.max(1) as f64;
    if !(step > 0.) {
        return ShapeSummary {
            bounds: Some(bounds),
            samples: 0,
            occupied: 0,
            volume: 0.,
        };
    }
    let counts = (size / step).ceil().max(DVec3::ONE);
    let (nx, ny, nz) = (counts.x as usize, counts.y as usize, counts.z as usize);
    let mut occupied = 0;
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let center = bounds.min + (dvec3(i as f64, j as f64, k as f64) + 0.5) * step;
                if shape.contains(center) {
                    occupied += 1;
                }
            }
        }
    }
    ShapeSummary {
        bounds: Some(bounds),
        samples: nx * ny * nz,
        occupied,
        volume: occupied as f64 * step.powi(3),
    }
}

/// Logs bounds and an approximate volume of both shells.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryExporter {
    pub settings: ExportSettings,
}

impl SummaryExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }
}

impl Exporter for SummaryExporter {
    fn export(&self, shell: &KeyboardShell) -> Result<()> {
        for (part, shape) in [("front", &shell.front), ("back", &shell.back)] {
            let summary = summarize(shape, self.settings.resolution);
            match summary.bounds {
                Some(bounds) => info!(
                    part,
                    min = %bounds.min,
                    max = %bounds.max,
                    samples = summary.samples,
                    occupied = summary.occupied,
                    volume_mm3 = summary.volume,
                    "shell summary"
                ),
                None => warn!(part, "shell is empty"),
            }
        }
        Ok(())
    }
}
