use nalgebra::DVector;

use super::constants::PhysicalConstants;
use crate::grid::align::Table;
use crate::grid::field::Field;
use crate::grid::key::GridKey;

/// Angular gyrofrequencies of the three charged species [rad/s, no 2π].
#[derive(Clone, Debug)]
pub struct GyrofrequencyField {
    pub keys: Vec<GridKey>,
    pub we: DVector<f64>,
    pub wi1: DVector<f64>,
    pub wi2: DVector<f64>,
}

impl GyrofrequencyField {
    pub const COLUMNS: [&'static str; 3] = ["we", "wi1", "wi2"];

    pub fn to_table(&self) -> Table {
        Table::from_aligned(
            self.keys.clone(),
            vec![
                ("we", self.we.clone()),
                ("wi1", self.wi1.clone()),
                ("wi2", self.wi2.clone()),
            ],
        )
    }
}

/// `|q| |B| / m` for every sample of `b` [T].
///
/// Both magnitudes are taken as `sqrt(x^2)`, so the sign of `b` is irrelevant.
/// `mass == 0` yields `inf`/`NaN`, which is propagated.
pub fn gyrofrequency(constants: &PhysicalConstants, mass: f64, b: &DVector<f64>) -> DVector<f64> {
    let q = constants.charge_magnitude();
    b.map(|b| q * (b * b).sqrt() / mass)
}

/// Electron, ion 1 and ion 2 gyrofrequencies on exactly the keys of `b`.
pub fn gyrofrequency_all(constants: &PhysicalConstants, b: &Field) -> GyrofrequencyField {
    tracing::info!(keys = b.len(), "computing gyrofrequencies");
    GyrofrequencyField {
        keys: b.keys().to_vec(),
        we: gyrofrequency(constants, constants.electron_mass, b.values()),
        wi1: gyrofrequency(constants, constants.ion1_mass, b.values()),
        wi2: gyrofrequency(constants, constants.ion2_mass, b.values()),
    }
}
