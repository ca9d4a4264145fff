//! Joining fields from heterogeneous sources onto one key set.
//!
//! Sources arrive with different native grids and orderings. [`align`] keeps
//! only the keys present in *every* input (an inner join) and
//! [`canonical_sort`] restores `(time, height, latitude, longitude)` order,
//! which row-order consumers such as CSV export rely on.

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use super::FieldError;
use super::field::Field;
use super::key::GridKey;

/// Columns sharing one key vector. Row `i` of every column belongs to `keys[i]`.
#[derive(Clone, Debug, Default)]
pub struct Table {
    keys: Vec<GridKey>,
    names: Vec<Arc<str>>,
    columns: Vec<DVector<f64>>,
}

/// Values of one column at a single time and height, laid out for mapping.
#[derive(Clone, Debug)]
pub struct MapSlice {
    pub latitudes_deg: Vec<f64>,
    pub longitudes_deg: Vec<f64>,
    /// Rows follow `latitudes_deg`, columns follow `longitudes_deg`.
    /// Grid cells without a sample hold `NaN`.
    pub values: DMatrix<f64>,
}

/// Inner join of `fields` on their grid keys.
///
/// Rows keep the order in which surviving keys appear in `fields[0]`.
/// Keys missing from any input are dropped silently; this is expected when
/// sources cover different regions or time steps.
pub fn align(fields: &[&Field]) -> Result<Table, FieldError> {
    let tables: Vec<Table> = fields.iter().map(|f| Table::from_field(f)).collect();
    let refs: Vec<&Table> = tables.iter().collect();
    align_tables(&refs)
}

/// Inner join of `fields` under caller-chosen column names.
///
/// The fields' own names are ignored, so one field may be joined under
/// several names (e.g. the same temperature used for `ti` and `tn`).
pub fn align_named(fields: &[(&str, &Field)]) -> Result<Table, FieldError> {
    let tables: Vec<Table> = fields
        .iter()
        .map(|(name, field)| Table::from_field_as(name, field))
        .collect();
    let refs: Vec<&Table> = tables.iter().collect();
    align_tables(&refs)
}

/// Inner join of multi-column tables; same semantics as [`align`].
pub fn align_tables(tables: &[&Table]) -> Result<Table, FieldError> {
    let Some((first, rest)) = tables.split_first() else {
        return Ok(Table::default());
    };

    let mut names: Vec<Arc<str>> = Vec::new();
    for table in tables {
        for name in &table.names {
            if names.contains(name) {
                return Err(FieldError::DuplicateColumn(name.to_string()));
            }
            names.push(name.clone());
        }
    }

    let lookups: Vec<HashMap<GridKey, usize>> = rest
        .iter()
        .map(|t| t.keys.iter().copied().enumerate().map(|(i, k)| (k, i)).collect())
        .collect();

    // rows[r][t] is the position of surviving row r inside table t
    let mut keys = Vec::new();
    let mut rows: Vec<Vec<usize>> = Vec::new();
    for (i, key) in first.keys.iter().enumerate() {
        let mut positions = Vec::with_capacity(tables.len());
        positions.push(i);
        let present = lookups.iter().all(|lookup| match lookup.get(key) {
            Some(&j) => {
                positions.push(j);
                true
            }
            None => false,
        });
        if present {
            keys.push(*key);
            rows.push(positions);
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for (t, table) in tables.iter().enumerate() {
        for col in &table.columns {
            columns.push(DVector::from_iterator(
                rows.len(),
                rows.iter().map(|pos| col[pos[t]]),
            ));
        }
    }

    for table in tables {
        tracing::debug!(
            columns = ?table.names,
            keys = table.len(),
            "join input"
        );
    }
    let largest = tables.iter().map(|t| t.len()).max().unwrap_or(0);
    if keys.len() < largest {
        tracing::debug!(
            surviving = keys.len(),
            largest_input = largest,
            "inner join dropped keys not shared by every input"
        );
    }

    Ok(Table {
        keys,
        names,
        columns,
    })
}

/// Reorders rows by `(time, height, latitude, longitude)` ascending.
pub fn canonical_sort(table: &Table) -> Table {
    let mut order: Vec<usize> = (0..table.keys.len()).collect();
    order.sort_by(|&a, &b| table.keys[a].cmp(&table.keys[b]));

    let keys = order.iter().map(|&i| table.keys[i]).collect();
    let columns = table
        .columns
        .iter()
        .map(|col| DVector::from_iterator(order.len(), order.iter().map(|&i| col[i])))
        .collect();

    Table {
        keys,
        names: table.names.clone(),
        columns,
    }
}

impl Table {
    /// Assembles a table from columns already laid out on `keys`.
    pub(crate) fn from_aligned(keys: Vec<GridKey>, columns: Vec<(&str, DVector<f64>)>) -> Self {
        debug_assert!(columns.iter().all(|(_, c)| c.len() == keys.len()));
        let (names, columns) = columns
            .into_iter()
            .map(|(name, col)| (Arc::from(name), col))
            .unzip();
        Self {
            keys,
            names,
            columns,
        }
    }

    pub fn from_field(field: &Field) -> Self {
        Self {
            keys: field.keys().to_vec(),
            names: vec![Arc::from(field.name())],
            columns: vec![field.values().clone()],
        }
    }

    /// Single-column table holding `field` under `name`.
    pub fn from_field_as(name: &str, field: &Field) -> Self {
        Self {
            keys: field.keys().to_vec(),
            names: vec![Arc::from(name)],
            columns: vec![field.values().clone()],
        }
    }

    pub fn keys(&self) -> &[GridKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_ref())
    }

    pub fn is_canonical(&self) -> bool {
        self.keys.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn column(&self, name: &str) -> Result<&DVector<f64>, FieldError> {
        self.names
            .iter()
            .position(|n| n.as_ref() == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| FieldError::MissingColumn(name.to_string()))
    }

    /// Extracts one column as a keyed field.
    pub fn field(&self, name: &str) -> Result<Field, FieldError> {
        let values = self.column(name)?.clone();
        Field::new(name, self.keys.clone(), values)
    }

    /// Appends a column computed on this table's rows.
    pub fn with_column(
        mut self,
        name: impl Into<Arc<str>>,
        values: DVector<f64>,
    ) -> Result<Self, FieldError> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(FieldError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.keys.len() {
            return Err(FieldError::LengthMismatch {
                field: name.to_string(),
                keys: self.keys.len(),
                values: values.len(),
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(self)
    }

    /// Latitude x longitude map of `column` at one time step and height.
    ///
    /// Cells are placed by key, so any row order works. Returns `Ok(None)`
    /// when no row matches.
    pub fn slice(
        &self,
        column: &str,
        time_s: i64,
        height_km: f64,
    ) -> Result<Option<MapSlice>, FieldError> {
        let values = self.column(column)?;
        let rows: Vec<usize> = (0..self.keys.len())
            .filter(|&i| self.keys[i].time_s == time_s && self.keys[i].height_km == height_km)
            .collect();
        if rows.is_empty() {
            return Ok(None);
        }

        let mut latitudes: Vec<f64> = rows.iter().map(|&i| self.keys[i].latitude_deg).collect();
        let mut longitudes: Vec<f64> = rows.iter().map(|&i| self.keys[i].longitude_deg).collect();
        sort_unique(&mut latitudes);
        sort_unique(&mut longitudes);

        let mut grid = DMatrix::from_element(latitudes.len(), longitudes.len(), f64::NAN);
        for &i in &rows {
            let key = &self.keys[i];
            let r = latitudes.partition_point(|&lat| lat < key.latitude_deg);
            let c = longitudes.partition_point(|&lon| lon < key.longitude_deg);
            grid[(r, c)] = values[i];
        }

        Ok(Some(MapSlice {
            latitudes_deg: latitudes,
            longitudes_deg: longitudes,
            values: grid,
        }))
    }
}

fn sort_unique(values: &mut Vec<f64>) {
    values.sort_by(f64::total_cmp);
    values.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(name: &str, heights: &[f64]) -> Field {
        let keys = heights
            .iter()
            .map(|&h| GridKey::new(0, h, 0.0, 0.0))
            .collect();
        let values: Vec<f64> = heights.iter().map(|h| h * 10.0).collect();
        Field::from_slice(name, keys, &values).unwrap()
    }

    #[test]
    fn align_keeps_intersection_only() {
        let a = keyed("a", &[1.0, 2.0, 3.0]);
        let b = keyed("b", &[2.0, 3.0, 4.0]);
        let c = keyed("c", &[3.0, 4.0, 5.0]);

        let table = align(&[&a, &b, &c]).unwrap();
        assert_eq!(table.keys(), &[GridKey::new(0, 3.0, 0.0, 0.0)]);
        assert_eq!(table.column("a").unwrap()[0], 30.0);
        assert_eq!(table.column("c").unwrap()[0], 30.0);
    }

    #[test]
    fn align_matches_rows_by_key_not_position() {
        let a = keyed("a", &[1.0, 2.0, 3.0]);
        let b = keyed("b", &[3.0, 1.0, 2.0]);
        let table = align(&[&a, &b]).unwrap();
        assert_eq!(table.column("a").unwrap(), table.column("b").unwrap());

        let b_aligned = table.field("b").unwrap();
        assert_eq!(b_aligned.keys(), a.keys());
        assert_eq!(b_aligned.get(&GridKey::new(0, 2.0, 0.0, 0.0)), Some(20.0));
    }

    #[test]
    fn align_rejects_duplicate_names() {
        let a = keyed("ne", &[1.0]);
        let b = keyed("ne", &[1.0]);
        assert!(matches!(
            align(&[&a, &b]),
            Err(FieldError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn named_join_accepts_one_field_twice() {
        let t = keyed("T", &[1.0, 2.0]);
        let x1 = keyed("x", &[2.0, 3.0]);
        let x2 = keyed("x", &[2.0]);

        let table = align_named(&[("ti", &t), ("tn", &t), ("a", &x1), ("b", &x2)]).unwrap();
        assert_eq!(table.keys(), &[GridKey::new(0, 2.0, 0.0, 0.0)]);
        assert_eq!(table.column("ti").unwrap(), table.column("tn").unwrap());
        assert_eq!(table.column("b").unwrap()[0], 20.0);
        assert!(table.column("T").is_err());
    }

    #[test]
    fn align_of_nothing_is_empty() {
        assert!(align(&[]).unwrap().is_empty());
    }

    #[test]
    fn canonical_sort_orders_rows_and_is_idempotent() {
        let keys = vec![
            GridKey::new(3600, 100.0, 0.0, 0.0),
            GridKey::new(0, 110.0, 0.0, 0.0),
            GridKey::new(0, 100.0, 10.0, 0.0),
            GridKey::new(0, 100.0, -10.0, 5.0),
        ];
        let field = Field::from_slice("x", keys, &[4.0, 3.0, 2.0, 1.0]).unwrap();
        let table = Table::from_field(&field);

        let once = canonical_sort(&table);
        let twice = canonical_sort(&once);

        assert!(once.is_canonical());
        assert_eq!(once.keys(), twice.keys());
        assert_eq!(once.column("x").unwrap(), twice.column("x").unwrap());
        assert_eq!(
            once.column("x").unwrap().as_slice(),
            &[1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn slice_builds_lat_lon_matrix_with_gaps() {
        let keys = vec![
            GridKey::new(0, 100.0, 10.0, 20.0),
            GridKey::new(0, 100.0, -10.0, 0.0),
            GridKey::new(0, 100.0, -10.0, 20.0),
            GridKey::new(0, 120.0, -10.0, 0.0),
        ];
        let field = Field::from_slice("cond_h", keys, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let table = canonical_sort(&Table::from_field(&field));

        let slice = table.slice("cond_h", 0, 100.0).unwrap().unwrap();
        assert_eq!(slice.latitudes_deg, vec![-10.0, 10.0]);
        assert_eq!(slice.longitudes_deg, vec![0.0, 20.0]);
        assert_eq!(slice.values[(0, 0)], 2.0);
        assert_eq!(slice.values[(0, 1)], 3.0);
        assert!(slice.values[(1, 0)].is_nan());
        assert_eq!(slice.values[(1, 1)], 1.0);

        assert!(table.slice("cond_h", 0, 150.0).unwrap().is_none());

        let unsorted = Table::from_field(&field).slice("cond_h", 0, 100.0).unwrap().unwrap();
        assert_eq!(unsorted.latitudes_deg, slice.latitudes_deg);
        assert_eq!(unsorted.longitudes_deg, slice.longitudes_deg);
        for (a, b) in unsorted.values.iter().zip(slice.values.iter()) {
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
        assert!(table.slice("cond_p", 0, 100.0).is_err());
    }
}
