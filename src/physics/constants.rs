use serde::{Deserialize, Serialize};

/// Electron rest mass [kg]
pub const ELECTRON_MASS: f64 = 9.109389e-31;

/// Lumped ion 1: 75% NO+ and 25% O2+ (30.5 amu) [kg]
pub const ION1_MASS: f64 = 5.065e-26;

/// Ion 2: O+ (16 amu) [kg]
pub const ION2_MASS: f64 = 2.657e-26;

/// Electron charge [C]. Signed; only its magnitude enters the formulas.
pub const ELEMENTARY_CHARGE: f64 = -1.602177e-19;

/// Number densities delivered per cm^3 are multiplied by this to get m^-3.
pub const CM3_TO_M3: f64 = 1e6;

/// Masses and charge shared by the gyrofrequency and conductivity formulas.
///
/// The two ion masses encode the two-species lumping (ion 1 = NO+/O2+ mix,
/// ion 2 = O+); change them together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    pub electron_mass: f64,
    pub ion1_mass: f64,
    pub ion2_mass: f64,
    pub elementary_charge: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            electron_mass: ELECTRON_MASS,
            ion1_mass: ION1_MASS,
            ion2_mass: ION2_MASS,
            elementary_charge: ELEMENTARY_CHARGE,
        }
    }
}

impl PhysicalConstants {
    /// `|e|`, computed as `sqrt(e^2)`.
    pub fn charge_magnitude(&self) -> f64 {
        (self.elementary_charge * self.elementary_charge).sqrt()
    }
}
