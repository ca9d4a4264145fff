use std::collections::HashSet;
use std::sync::Arc;

use nalgebra::DVector;

use super::FieldError;
use super::key::{GridKey, LongitudeConvention, SpatialKey};

/// A named scalar quantity sampled on a set of grid keys.
///
/// `keys[i]` is the grid point of `values[i]`. Keys are unique within a field
/// but carry no particular order; see [`crate::grid::align::canonical_sort`].
#[derive(Clone, Debug)]
pub struct Field {
    name: Arc<str>,
    keys: Vec<GridKey>,
    values: DVector<f64>,
}

impl Field {
    pub fn new(
        name: impl Into<Arc<str>>,
        keys: Vec<GridKey>,
        values: DVector<f64>,
    ) -> Result<Self, FieldError> {
        let name = name.into();
        if keys.len() != values.len() {
            return Err(FieldError::LengthMismatch {
                field: name.to_string(),
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !seen.insert(*key) {
                return Err(FieldError::DuplicateKey {
                    field: name.to_string(),
                    key: *key,
                });
            }
        }

        Ok(Self { name, keys, values })
    }

    pub fn from_slice(
        name: impl Into<Arc<str>>,
        keys: Vec<GridKey>,
        values: &[f64],
    ) -> Result<Self, FieldError> {
        Self::new(name, keys, DVector::from_column_slice(values))
    }

    /// Repeats a field defined on spatial keys only at every time in `times_s`.
    ///
    /// Rows are laid out time-major: all spatial keys for `times_s[0]`, then
    /// all for `times_s[1]`, and so on.
    pub fn broadcast_over_times(
        name: impl Into<Arc<str>>,
        spatial_keys: &[SpatialKey],
        values: &DVector<f64>,
        times_s: &[i64],
    ) -> Result<Self, FieldError> {
        let name = name.into();
        if spatial_keys.len() != values.len() {
            return Err(FieldError::LengthMismatch {
                field: name.to_string(),
                keys: spatial_keys.len(),
                values: values.len(),
            });
        }

        let keys: Vec<GridKey> = times_s
            .iter()
            .flat_map(|&t| spatial_keys.iter().map(move |k| k.at_time(t)))
            .collect();
        let n = spatial_keys.len();
        let repeated = DVector::from_fn(keys.len(), |i, _| values[i % n]);

        Self::new(name, keys, repeated)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[GridKey] {
        &self.keys
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridKey, f64)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `key`, if the field is defined there.
    pub fn get(&self, key: &GridKey) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.values[i])
    }

    pub fn renamed(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Multiplies every value by `factor` (used for unit conversion).
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            name: self.name.clone(),
            keys: self.keys.clone(),
            values: &self.values * factor,
        }
    }

    /// Builds a field on the same keys with new values, e.g. a derived quantity.
    pub fn with_values(
        &self,
        name: impl Into<Arc<str>>,
        values: DVector<f64>,
    ) -> Result<Self, FieldError> {
        let name = name.into();
        if values.len() != self.keys.len() {
            return Err(FieldError::LengthMismatch {
                field: name.to_string(),
                keys: self.keys.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            name,
            keys: self.keys.clone(),
            values,
        })
    }

    /// Re-keys the field with longitudes wrapped into `convention`.
    ///
    /// Fails if two source longitudes collapse onto the same key (e.g. both
    /// -180 and 180 present).
    pub fn with_longitude_convention(
        &self,
        convention: LongitudeConvention,
    ) -> Result<Self, FieldError> {
        let keys = self
            .keys
            .iter()
            .map(|k| {
                GridKey::new(
                    k.time_s,
                    k.height_km,
                    k.latitude_deg,
                    convention.normalize(k.longitude_deg),
                )
            })
            .collect();
        Self::new(self.name.clone(), keys, self.values.clone())
    }

    /// True when `other` has exactly the same keys in the same order.
    pub fn is_aligned_with(&self, other: &Field) -> bool {
        self.keys == other.keys
    }
}
