use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One sample point shared by every field: `(time, height, latitude, longitude)`.
///
/// `time_s` counts seconds from the model-day epoch. Ordering is lexicographic
/// in that field order, which is the canonical row order of the crate.
#[derive(Clone, Copy, Debug)]
pub struct GridKey {
    pub time_s: i64,
    pub height_km: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

/// Key of a source that has no time axis (e.g. the geomagnetic grid).
#[derive(Clone, Copy, Debug)]
pub struct SpatialKey {
    pub height_km: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

/// Folds `-0.0` onto `0.0` so equal coordinates hash equally.
fn canonical_bits(x: f64) -> u64 {
    if x == 0.0 { 0.0f64.to_bits() } else { x.to_bits() }
}

fn cmp_coord(a: f64, b: f64) -> Ordering {
    f64::from_bits(canonical_bits(a)).total_cmp(&f64::from_bits(canonical_bits(b)))
}

impl GridKey {
    pub fn new(time_s: i64, height_km: f64, latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            time_s,
            height_km,
            latitude_deg,
            longitude_deg,
        }
    }

    pub fn spatial(&self) -> SpatialKey {
        SpatialKey {
            height_km: self.height_km,
            latitude_deg: self.latitude_deg,
            longitude_deg: self.longitude_deg,
        }
    }
}

impl SpatialKey {
    pub fn new(height_km: f64, latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            height_km,
            latitude_deg,
            longitude_deg,
        }
    }

    pub fn at_time(&self, time_s: i64) -> GridKey {
        GridKey::new(time_s, self.height_km, self.latitude_deg, self.longitude_deg)
    }
}

impl PartialEq for GridKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GridKey {}

impl PartialOrd for GridKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time_s
            .cmp(&other.time_s)
            .then_with(|| cmp_coord(self.height_km, other.height_km))
            .then_with(|| cmp_coord(self.latitude_deg, other.latitude_deg))
            .then_with(|| cmp_coord(self.longitude_deg, other.longitude_deg))
    }
}

impl Hash for GridKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.time_s.hash(state);
        canonical_bits(self.height_km).hash(state);
        canonical_bits(self.latitude_deg).hash(state);
        canonical_bits(self.longitude_deg).hash(state);
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(t={}s, h={} km, lat={}, lon={})",
            self.time_s, self.height_km, self.latitude_deg, self.longitude_deg
        )
    }
}

/// Longitude range used by a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LongitudeConvention {
    /// [-180, 180)
    Signed180,
    /// [0, 360)
    Positive360,
}

impl LongitudeConvention {
    /// Wraps `lon` into this convention's range.
    pub fn normalize(self, lon: f64) -> f64 {
        match self {
            LongitudeConvention::Positive360 => wrap_360(lon),
            LongitudeConvention::Signed180 => wrap_360(lon + 180.0) - 180.0,
        }
    }

    /// True when `lon` lies in this convention's half-open range.
    pub fn contains(self, lon: f64) -> bool {
        match self {
            LongitudeConvention::Positive360 => (0.0..360.0).contains(&lon),
            LongitudeConvention::Signed180 => (-180.0..180.0).contains(&lon),
        }
    }

    /// The first convention whose range holds every longitude, if any.
    pub fn detect(longitudes: &[f64]) -> Option<Self> {
        [LongitudeConvention::Positive360, LongitudeConvention::Signed180]
            .into_iter()
            .find(|c| longitudes.iter().all(|&lon| c.contains(lon)))
    }
}

/// `rem_euclid` rounds tiny negative inputs up to the modulus itself.
fn wrap_360(x: f64) -> f64 {
    let w = x.rem_euclid(360.0);
    if w >= 360.0 { 0.0 } else { w }
}
