//! Hall and Pedersen conductivities (Adachi et al., 2017).
//!
//! Both use the prefactor `Ne |e| / B`. With `Ne > 0` and `B > 0` the
//! Pedersen conductivity is positive; the Hall conductivity carries the sign
//! of `c1 - p1 b1 - p2 a1`.
//!
//! Gyrofrequencies take `|B|`, but the prefactor divides by `B` as given, so
//! a field reported with a negative sign flips both conductivities. Pass the
//! field strength (a magnitude), not a signed component, when positive
//! conductivities are wanted.

use nalgebra::DVector;

use super::collision::CollisionFrequencyField;
use super::constants::PhysicalConstants;
use super::density::RelativeDensity;
use super::gyrofrequency::GyrofrequencyField;
use crate::grid::FieldError;
use crate::grid::align::Table;
use crate::grid::key::GridKey;

/// Aligned input columns, one row per grid key.
///
/// All vectors must have the same length; the conductivity formulas do not
/// join, that is done beforehand by [`crate::grid::align`].
pub struct ConductivityInputs<'a> {
    pub fen: &'a DVector<f64>,
    pub fin1: &'a DVector<f64>,
    pub fin2: &'a DVector<f64>,
    pub wi1: &'a DVector<f64>,
    pub wi2: &'a DVector<f64>,
    pub we: &'a DVector<f64>,
    pub p1: &'a DVector<f64>,
    pub p2: &'a DVector<f64>,
    pub ne: &'a DVector<f64>,
    pub b: &'a DVector<f64>,
}

/// Column name of electron density in an aligned table.
pub const NE_COLUMN: &str = "ne";
/// Column name of magnetic field strength in an aligned table.
pub const B_COLUMN: &str = "b";

impl<'a> ConductivityInputs<'a> {
    /// Borrows every input column from a table produced by the aligner.
    pub fn from_table(table: &'a Table) -> Result<Self, FieldError> {
        let [fen, fin1, fin2] = CollisionFrequencyField::COLUMNS;
        let [we, wi1, wi2] = GyrofrequencyField::COLUMNS;
        let [p1, p2] = RelativeDensity::COLUMNS;
        Ok(Self {
            fen: table.column(fen)?,
            fin1: table.column(fin1)?,
            fin2: table.column(fin2)?,
            wi1: table.column(wi1)?,
            wi2: table.column(wi2)?,
            we: table.column(we)?,
            p1: table.column(p1)?,
            p2: table.column(p2)?,
            ne: table.column(NE_COLUMN)?,
            b: table.column(B_COLUMN)?,
        })
    }

    /// `Ne |e| / B`
    fn prefactor(&self, constants: &PhysicalConstants) -> DVector<f64> {
        (self.ne * constants.charge_magnitude()).component_div(self.b)
    }
}

/// `w^2 / (w^2 + f^2)`
fn hall_ratio(w: &DVector<f64>, f: &DVector<f64>) -> DVector<f64> {
    w.zip_map(f, |w, f| (w * w) / (w * w + f * f))
}

/// `w f / (w^2 + f^2)`
fn pedersen_ratio(w: &DVector<f64>, f: &DVector<f64>) -> DVector<f64> {
    w.zip_map(f, |w, f| (w * f) / (w * w + f * f))
}

/// Hall conductivity [S/m].
pub fn hall_conductivity(
    constants: &PhysicalConstants,
    inputs: &ConductivityInputs<'_>,
) -> DVector<f64> {
    let a1 = hall_ratio(inputs.wi2, inputs.fin2);
    let b1 = hall_ratio(inputs.wi1, inputs.fin1);
    let c1 = hall_ratio(inputs.we, inputs.fen);

    let sum = c1 - inputs.p1.component_mul(&b1) - inputs.p2.component_mul(&a1);
    inputs.prefactor(constants).component_mul(&sum)
}

/// Pedersen conductivity [S/m].
pub fn pedersen_conductivity(
    constants: &PhysicalConstants,
    inputs: &ConductivityInputs<'_>,
) -> DVector<f64> {
    let a1 = pedersen_ratio(inputs.wi2, inputs.fin2);
    let b1 = pedersen_ratio(inputs.wi1, inputs.fin1);
    let c1 = pedersen_ratio(inputs.we, inputs.fen);

    let sum = c1 + inputs.p1.component_mul(&b1) + inputs.p2.component_mul(&a1);
    inputs.prefactor(constants).component_mul(&sum)
}

/// Hall and Pedersen conductivity on a common key set.
#[derive(Clone, Debug)]
pub struct ConductivityField {
    pub keys: Vec<GridKey>,
    pub hall: DVector<f64>,
    pub pedersen: DVector<f64>,
}

impl ConductivityField {
    pub const COLUMNS: [&'static str; 2] = ["cond_h", "cond_p"];

    /// Both conductivities over an aligned table.
    pub fn from_table(constants: &PhysicalConstants, table: &Table) -> Result<Self, FieldError> {
        let inputs = ConductivityInputs::from_table(table)?;
        tracing::info!(keys = table.len(), "computing Hall and Pedersen conductivity");
        Ok(Self {
            keys: table.keys().to_vec(),
            hall: hall_conductivity(constants, &inputs),
            pedersen: pedersen_conductivity(constants, &inputs),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keys where either conductivity is `NaN` or infinite.
    pub fn non_finite_count(&self) -> usize {
        self.hall
            .iter()
            .zip(self.pedersen.iter())
            .filter(|(h, p)| !h.is_finite() || !p.is_finite())
            .count()
    }

    /// Copy restricted to keys where both conductivities are finite.
    pub fn finite(&self) -> Self {
        let rows: Vec<usize> = (0..self.keys.len())
            .filter(|&i| self.hall[i].is_finite() && self.pedersen[i].is_finite())
            .collect();
        Self {
            keys: rows.iter().map(|&i| self.keys[i]).collect(),
            hall: DVector::from_iterator(rows.len(), rows.iter().map(|&i| self.hall[i])),
            pedersen: DVector::from_iterator(rows.len(), rows.iter().map(|&i| self.pedersen[i])),
        }
    }

    pub fn to_table(&self) -> Table {
        Table::from_aligned(
            self.keys.clone(),
            vec![
                ("cond_h", self.hall.clone()),
                ("cond_p", self.pedersen.clone()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-9
    }

    struct Columns {
        ones: DVector<f64>,
        half: DVector<f64>,
        ne: DVector<f64>,
        b: DVector<f64>,
    }

    impl Columns {
        fn new(n: usize, b: &[f64]) -> Self {
            Self {
                ones: DVector::from_element(n, 1.0),
                half: DVector::from_element(n, 0.5),
                ne: DVector::from_element(n, 1e11),
                b: DVector::from_column_slice(b),
            }
        }

        fn inputs(&self) -> ConductivityInputs<'_> {
            ConductivityInputs {
                fen: &self.ones,
                fin1: &self.ones,
                fin2: &self.ones,
                wi1: &self.ones,
                wi2: &self.ones,
                we: &self.ones,
                p1: &self.half,
                p2: &self.half,
                ne: &self.ne,
                b: &self.b,
            }
        }
    }

    #[test]
    fn unit_frequencies_match_hand_calculation() {
        let c = PhysicalConstants::default();
        let cols = Columns::new(1, &[5e-5]);
        let inputs = cols.inputs();

        // every ratio is 1/2
        let prefactor = 1e11 * 1.602177e-19 / 5e-5;
        let hall_expected = prefactor * (0.5 - 0.5 * 0.5 - 0.5 * 0.5);
        let pedersen_expected = prefactor * (0.5 + 0.5 * 0.5 + 0.5 * 0.5);

        let h = hall_conductivity(&c, &inputs)[0];
        let p = pedersen_conductivity(&c, &inputs)[0];
        // the Hall sum cancels exactly here, so compare absolutely
        assert!((h - hall_expected).abs() <= 1e-9 * pedersen_expected);
        assert!(rel_close(p, pedersen_expected));
    }

    #[test]
    fn hall_and_pedersen_share_prefactor_sign() {
        let c = PhysicalConstants::default();
        let ne = DVector::from_element(1, 1e11);
        let b = DVector::from_element(1, 5e-5);
        let we = DVector::from_element(1, 8.8e6);
        let wi1 = DVector::from_element(1, 158.0);
        let wi2 = DVector::from_element(1, 301.0);
        let fen = DVector::from_element(1, 1e4);
        let fin = DVector::from_element(1, 1e3);
        let p1 = DVector::from_element(1, 0.8 / 1e11);
        let p2 = DVector::from_element(1, 0.2 / 1e11);
        let inputs = ConductivityInputs {
            fen: &fen,
            fin1: &fin,
            fin2: &fin,
            wi1: &wi1,
            wi2: &wi2,
            we: &we,
            p1: &p1,
            p2: &p2,
            ne: &ne,
            b: &b,
        };

        let h = hall_conductivity(&c, &inputs)[0];
        let p = pedersen_conductivity(&c, &inputs)[0];
        assert!(p > 0.0);
        // electrons are magnetised, ions are not: Hall term dominated by c1 > 0
        assert!(h > 0.0);

        let flipped = PhysicalConstants {
            elementary_charge: -c.elementary_charge,
            ..c
        };
        assert_eq!(hall_conductivity(&flipped, &inputs)[0], h);
        assert_eq!(pedersen_conductivity(&flipped, &inputs)[0], p);
    }

    #[test]
    fn zero_field_only_poisons_its_own_key() {
        let c = PhysicalConstants::default();
        let cols = Columns::new(3, &[5e-5, 0.0, 4e-5]);
        let inputs = cols.inputs();

        let h = hall_conductivity(&c, &inputs);
        let p = pedersen_conductivity(&c, &inputs);
        assert!(!p[1].is_finite());
        assert!(!h[1].is_finite());
        assert!(p[0].is_finite() && p[2].is_finite());
        assert!(h[0].is_finite() && h[2].is_finite());
    }

    #[test]
    fn finite_drops_only_bad_keys() {
        let keys: Vec<GridKey> = (0..3).map(|i| GridKey::new(0, i as f64, 0.0, 0.0)).collect();
        let field = ConductivityField {
            keys: keys.clone(),
            hall: DVector::from_vec(vec![1.0, f64::NAN, 3.0]),
            pedersen: DVector::from_vec(vec![1.0, 2.0, f64::INFINITY]),
        };
        assert_eq!(field.non_finite_count(), 2);
        let kept = field.finite();
        assert_eq!(kept.keys, vec![keys[0]]);
        assert_eq!(kept.hall[0], 1.0);
    }
}
