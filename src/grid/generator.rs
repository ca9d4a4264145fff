use serde::{Deserialize, Serialize};

use super::key::{GridKey, SpatialKey};

/// Axes of a regular `(time, height, latitude, longitude)` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    pub times_s: Vec<i64>,
    pub heights_km: Vec<f64>,
    pub latitudes_deg: Vec<f64>,
    pub longitudes_deg: Vec<f64>,
}

impl Default for GridAxes {
    fn default() -> Self {
        Self {
            times_s: vec![0],
            heights_km: stepped(80.0, 500.0, 20.0),
            latitudes_deg: stepped(-80.0, 80.0, 10.0),
            longitudes_deg: stepped(0.0, 340.0, 20.0),
        }
    }
}

impl GridAxes {
    /// Builds axes from `(start, stop, step)` ranges, both ends inclusive.
    pub fn from_ranges(
        times_s: Vec<i64>,
        heights_km: (f64, f64, f64),
        latitudes_deg: (f64, f64, f64),
        longitudes_deg: (f64, f64, f64),
    ) -> Self {
        Self {
            times_s,
            heights_km: stepped(heights_km.0, heights_km.1, heights_km.2),
            latitudes_deg: stepped(latitudes_deg.0, latitudes_deg.1, latitudes_deg.2),
            longitudes_deg: stepped(longitudes_deg.0, longitudes_deg.1, longitudes_deg.2),
        }
    }

    pub fn num_spatial(&self) -> usize {
        self.heights_km.len() * self.latitudes_deg.len() * self.longitudes_deg.len()
    }

    pub fn num_keys(&self) -> usize {
        self.times_s.len() * self.num_spatial()
    }

    /// Every spatial point in `(height, latitude, longitude)` order.
    pub fn spatial_keys(&self) -> Vec<SpatialKey> {
        let mut keys = Vec::with_capacity(self.num_spatial());
        for &h in &self.heights_km {
            for &lat in &self.latitudes_deg {
                for &lon in &self.longitudes_deg {
                    keys.push(SpatialKey::new(h, lat, lon));
                }
            }
        }
        keys
    }

    /// Every grid key; in canonical order when each axis is ascending.
    pub fn keys(&self) -> Vec<GridKey> {
        let spatial = self.spatial_keys();
        self.times_s
            .iter()
            .flat_map(|&t| spatial.iter().map(move |k| k.at_time(t)))
            .collect()
    }
}

/// `start, start + step, ...` up to and including `stop`.
///
/// Values are computed as `start + i * step` so long axes do not drift.
pub fn stepped(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || stop < start {
        return vec![start];
    }
    let n = ((stop - start) / step + 1e-9).floor() as usize + 1;
    (0..n).map(|i| start + i as f64 * step).collect()
}
