//! Charged-particle / neutral collision frequencies (Adachi et al., 2017).
//!
//! Densities are in m^-3, temperatures in K, results in Hz.

use nalgebra::DVector;

use crate::grid::FieldError;
use crate::grid::align::{Table, align_named};
use crate::grid::field::Field;
use crate::grid::key::GridKey;

#[derive(Clone, Debug)]
pub struct CollisionFrequencyField {
    pub keys: Vec<GridKey>,
    pub fen: DVector<f64>,
    pub fin1: DVector<f64>,
    pub fin2: DVector<f64>,
}

impl CollisionFrequencyField {
    pub const COLUMNS: [&'static str; 3] = ["fen", "fin1", "fin2"];

    pub fn to_table(&self) -> Table {
        Table::from_aligned(
            self.keys.clone(),
            vec![
                ("fen", self.fen.clone()),
                ("fin1", self.fin1.clone()),
                ("fin2", self.fin2.clone()),
            ],
        )
    }
}

/// Electron-neutral collision frequency.
///
/// `fen = 2.33e-17 nN2 (1 - 1.21e-4 Te) Te
///      + 1.82e-16 nO2 (1 + 3.6e-2 √Te) √Te
///      + 8.9e-17  nO  (1 + 5.7e-4 Te) √Te`
pub fn electron_neutral_frequency(
    n_n2: &DVector<f64>,
    n_o2: &DVector<f64>,
    n_o: &DVector<f64>,
    te: &DVector<f64>,
) -> DVector<f64> {
    let sqrt_te = te.map(f64::sqrt);

    let n2_term = n_n2.component_mul(&te.map(|t| 2.33e-17 * (1.0 - 1.21e-4 * t) * t));
    let o2_term = n_o2.component_mul(&sqrt_te.map(|s| 1.82e-16 * (1.0 + 3.6e-2 * s) * s));
    let o_term = n_o.component_mul(&te.zip_map(&sqrt_te, |t, s| 8.9e-17 * (1.0 + 5.7e-4 * t) * s));

    n2_term + o2_term + o_term
}

/// Collision frequency of the lumped NO+/O2+ ion with neutrals.
pub fn ion1_neutral_frequency(
    n_n2: &DVector<f64>,
    n_o2: &DVector<f64>,
    n_o: &DVector<f64>,
) -> DVector<f64> {
    (n_n2 * 4.29 + n_o2 * 4.23 + n_o * 2.41) * 1e-16
}

/// Collision frequency of O+ with neutrals, using `Tr = (Ti + Tn) / 2`.
///
/// `Tr <= 0` is outside the log10 domain and yields `NaN`, which is propagated.
pub fn ion2_neutral_frequency(
    n_n2: &DVector<f64>,
    n_o2: &DVector<f64>,
    n_o: &DVector<f64>,
    ti: &DVector<f64>,
    tn: &DVector<f64>,
) -> DVector<f64> {
    let tr = (ti + tn) / 2.0;
    let resonant = tr.map(|tr| {
        let lg = tr.log10();
        tr.sqrt() * (1.08 - 0.139 * lg + 4.51e-3 * lg * lg)
    });

    n_n2 * 6.82e-16 + n_o2 * 6.66e-16 + n_o.component_mul(&resonant) * 3.32e-17
}

/// All three collision frequencies on the keys shared by the six inputs.
pub fn collision_frequencies_all(
    n_n2: &Field,
    n_o2: &Field,
    n_o: &Field,
    te: &Field,
    tn: &Field,
    ti: &Field,
) -> Result<CollisionFrequencyField, FieldError> {
    let joined = align_named(&[
        ("n_n2", n_n2),
        ("n_o2", n_o2),
        ("n_o", n_o),
        ("te", te),
        ("tn", tn),
        ("ti", ti),
    ])?;
    tracing::info!(keys = joined.len(), "computing collision frequencies");

    let (n2, o2, o) = (
        joined.column("n_n2")?,
        joined.column("n_o2")?,
        joined.column("n_o")?,
    );
    let (te, tn, ti) = (
        joined.column("te")?,
        joined.column("tn")?,
        joined.column("ti")?,
    );

    Ok(CollisionFrequencyField {
        fen: electron_neutral_frequency(n2, o2, o, te),
        fin1: ion1_neutral_frequency(n2, o2, o),
        fin2: ion2_neutral_frequency(n2, o2, o, ti, tn),
        keys: joined.keys().to_vec(),
    })
}
