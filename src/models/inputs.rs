//! Typed bundles of the pre-loaded model fields.
//!
//! Constructors rename every field to the column name the pipeline joins on
//! and apply unit conversions, so downstream code only ever sees m^-3, K, T
//! and dimensionless composition fractions.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::grid::FieldError;
use crate::grid::field::Field;
use crate::grid::key::SpatialKey;
use crate::physics::conductivity::{B_COLUMN, NE_COLUMN};
use crate::physics::constants::CM3_TO_M3;

/// Neutral number densities of N2, O2 and O, always stored in m^-3.
#[derive(Clone, Debug)]
pub struct NeutralComposition {
    n2: Field,
    o2: Field,
    o: Field,
}

impl NeutralComposition {
    pub fn from_per_m3(n2: Field, o2: Field, o: Field) -> Self {
        Self {
            n2: n2.renamed("n_n2"),
            o2: o2.renamed("n_o2"),
            o: o.renamed("n_o"),
        }
    }

    /// Converts densities delivered in cm^-3 (e.g. MSIS output).
    pub fn from_per_cm3(n2: Field, o2: Field, o: Field) -> Self {
        Self::from_per_m3(
            n2.scaled(CM3_TO_M3),
            o2.scaled(CM3_TO_M3),
            o.scaled(CM3_TO_M3),
        )
    }

    pub fn n2(&self) -> &Field {
        &self.n2
    }

    pub fn o2(&self) -> &Field {
        &self.o2
    }

    pub fn o(&self) -> &Field {
        &self.o
    }
}

/// How an ionosphere model reports ion composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionUnit {
    /// Dimensionless share of the total, 0..1
    #[default]
    Fraction,
    /// Percent of the total, 0..100
    Percent,
}

/// O+, NO+ and O2+ shares of the ion content as fractions in [0, 1].
#[derive(Clone, Debug)]
pub struct IonComposition {
    o: Field,
    no: Field,
    o2: Field,
}

impl IonComposition {
    pub fn from_fractions(o: Field, no: Field, o2: Field) -> Self {
        let composition = Self {
            o: o.renamed("frac_o"),
            no: no.renamed("frac_no"),
            o2: o2.renamed("frac_o2"),
        };
        composition.warn_out_of_range();
        composition
    }

    pub fn from_percent(o: Field, no: Field, o2: Field) -> Self {
        Self::from_fractions(o.scaled(0.01), no.scaled(0.01), o2.scaled(0.01))
    }

    pub fn from_unit(unit: CompositionUnit, o: Field, no: Field, o2: Field) -> Self {
        match unit {
            CompositionUnit::Fraction => Self::from_fractions(o, no, o2),
            CompositionUnit::Percent => Self::from_percent(o, no, o2),
        }
    }

    pub fn o(&self) -> &Field {
        &self.o
    }

    pub fn no(&self) -> &Field {
        &self.no
    }

    pub fn o2(&self) -> &Field {
        &self.o2
    }

    fn warn_out_of_range(&self) {
        for field in [&self.o, &self.no, &self.o2] {
            let outside = field
                .values()
                .iter()
                .filter(|&&x| !(0.0..=1.0).contains(&x))
                .count();
            if outside > 0 {
                tracing::warn!(
                    field = field.name(),
                    count = outside,
                    "composition fraction outside [0, 1]"
                );
            }
        }
    }
}

/// Electron density [m^-3], temperatures [K] and ion composition.
#[derive(Clone, Debug)]
pub struct IonosphericState {
    ne: Field,
    te: Field,
    ti: Field,
    tn: Field,
    composition: IonComposition,
}

impl IonosphericState {
    pub fn new(ne: Field, te: Field, ti: Field, tn: Field, composition: IonComposition) -> Self {
        Self {
            ne: ne.renamed(NE_COLUMN),
            te: te.renamed("te"),
            ti: ti.renamed("ti"),
            tn: tn.renamed("tn"),
            composition,
        }
    }

    pub fn ne(&self) -> &Field {
        &self.ne
    }

    pub fn te(&self) -> &Field {
        &self.te
    }

    pub fn ti(&self) -> &Field {
        &self.ti
    }

    pub fn tn(&self) -> &Field {
        &self.tn
    }

    pub fn composition(&self) -> &IonComposition {
        &self.composition
    }
}

/// Geomagnetic field strength [T].
#[derive(Clone, Debug)]
pub struct MagneticField {
    b: Field,
}

impl MagneticField {
    pub fn new(b: Field) -> Self {
        Self {
            b: b.renamed(B_COLUMN),
        }
    }

    /// Field from a time-less geomagnetic grid, repeated at each of `times_s`.
    pub fn from_spatial(
        spatial_keys: &[SpatialKey],
        values: &DVector<f64>,
        times_s: &[i64],
    ) -> Result<Self, FieldError> {
        Field::broadcast_over_times(B_COLUMN, spatial_keys, values, times_s).map(Self::new)
    }

    pub fn b(&self) -> &Field {
        &self.b
    }
}
