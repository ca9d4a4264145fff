//! Relative number densities of the two lumped ion species (Brekke, 1983).
//!
//! Composition inputs are dimensionless fractions of the total ion content
//! (see [`crate::models::inputs::IonComposition`]). The two divisions by `Ne`
//! are kept as separate steps so non-finite intermediates behave the same as
//! in the published procedure.

use nalgebra::DVector;

use crate::grid::FieldError;
use crate::grid::align::{Table, align_named};
use crate::grid::field::Field;
use crate::grid::key::GridKey;

#[derive(Clone, Debug)]
pub struct RelativeDensity {
    pub keys: Vec<GridKey>,
    pub p1: DVector<f64>,
    pub p2: DVector<f64>,
}

impl RelativeDensity {
    pub const COLUMNS: [&'static str; 2] = ["p1", "p2"];

    pub fn to_table(&self) -> Table {
        Table::from_aligned(
            self.keys.clone(),
            vec![("p1", self.p1.clone()), ("p2", self.p2.clone())],
        )
    }
}

/// `(rho1, rho2) = ((NO+ + O2+) / Ne, O+ / Ne)`.
pub fn ion_number_densities(
    frac_o: &DVector<f64>,
    frac_no: &DVector<f64>,
    frac_o2: &DVector<f64>,
    ne: &DVector<f64>,
) -> (DVector<f64>, DVector<f64>) {
    let rho1 = (frac_no + frac_o2).component_div(ne);
    let rho2 = frac_o.component_div(ne);
    (rho1, rho2)
}

/// `p_i = rho_i / Ne`.
pub fn relative_density(rho: &DVector<f64>, ne: &DVector<f64>) -> DVector<f64> {
    rho.component_div(ne)
}

/// `(p1, p2)` on the keys shared by the four inputs.
pub fn relative_density_all(
    frac_o: &Field,
    frac_no: &Field,
    frac_o2: &Field,
    ne: &Field,
) -> Result<RelativeDensity, FieldError> {
    let joined = align_named(&[
        ("frac_o", frac_o),
        ("frac_no", frac_no),
        ("frac_o2", frac_o2),
        ("ne", ne),
    ])?;
    tracing::info!(keys = joined.len(), "computing relative ion densities");

    let ne_col = joined.column("ne")?;
    let (rho1, rho2) = ion_number_densities(
        joined.column("frac_o")?,
        joined.column("frac_no")?,
        joined.column("frac_o2")?,
        ne_col,
    );

    Ok(RelativeDensity {
        p1: relative_density(&rho1, ne_col),
        p2: relative_density(&rho2, ne_col),
        keys: joined.keys().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_two_divisions_by_ne() {
        let keys: Vec<GridKey> = (0..3).map(|i| GridKey::new(0, 100.0 + i as f64, 0.0, 0.0)).collect();
        let ne_value = 2.5e11;
        let o = [0.1, 0.5, 0.9];
        let no = [0.6, 0.3, 0.05];
        let o2 = [0.3, 0.2, 0.05];

        let out = relative_density_all(
            &Field::from_slice("o+", keys.clone(), &o).unwrap(),
            &Field::from_slice("no+", keys.clone(), &no).unwrap(),
            &Field::from_slice("o2+", keys.clone(), &o2).unwrap(),
            &Field::new("ne", keys.clone(), DVector::from_element(3, ne_value)).unwrap(),
        )
        .unwrap();

        for i in 0..3 {
            assert_eq!(out.p1[i], ((no[i] + o2[i]) / ne_value) / ne_value);
            assert_eq!(out.p2[i], (o[i] / ne_value) / ne_value);
        }
        assert_eq!(out.keys, keys);
    }

    #[test]
    fn inputs_sharing_a_name_still_join() {
        let keys: Vec<GridKey> = (0..2).map(|i| GridKey::new(0, 100.0 + i as f64, 0.0, 0.0)).collect();
        let frac = Field::from_slice("x", keys.clone(), &[0.2, 0.4]).unwrap();
        let ne = Field::from_slice("x", keys.clone(), &[1e10, 2e10]).unwrap();

        let out = relative_density_all(&frac, &frac, &frac, &ne).unwrap();
        assert_eq!(out.keys, keys);
        assert_eq!(out.p1[1], ((0.4 + 0.4) / 2e10) / 2e10);
        assert_eq!(out.p2[0], (0.2 / 1e10) / 1e10);
    }

    #[test]
    fn zero_electron_density_is_propagated() {
        let f = DVector::from_vec(vec![0.5, 0.0]);
        let ne = DVector::from_vec(vec![0.0, 0.0]);
        let (rho1, rho2) = ion_number_densities(&f, &f, &f, &ne);
        assert!(rho1[0].is_infinite());
        assert!(rho2[1].is_nan());
        assert!(relative_density(&rho1, &ne)[0].is_infinite());
    }
}
