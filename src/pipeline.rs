//! One batch pass from loaded model fields to conductivity.
//!
//! Every stage returns a new value that is kept in [`PipelineStages`]; later
//! stages only read earlier results, they never update them.

use crate::grid::FieldError;
use crate::grid::align::{Table, align_tables, canonical_sort};
use crate::models::inputs::{IonosphericState, MagneticField, NeutralComposition};
use crate::physics::collision::{CollisionFrequencyField, collision_frequencies_all};
use crate::physics::conductivity::ConductivityField;
use crate::physics::constants::PhysicalConstants;
use crate::physics::density::{RelativeDensity, relative_density_all};
use crate::physics::gyrofrequency::{GyrofrequencyField, gyrofrequency_all};

/// Pre-loaded, unit-converted model fields.
#[derive(Clone, Debug)]
pub struct PipelineInputs {
    pub neutrals: NeutralComposition,
    pub ionosphere: IonosphericState,
    pub magnetic: MagneticField,
}

/// Intermediate results, in the order they are produced.
#[derive(Clone, Debug)]
pub struct PipelineStages {
    pub gyrofrequency: GyrofrequencyField,
    pub collision: CollisionFrequencyField,
    pub relative_density: RelativeDensity,
    /// Join of all intermediate columns plus `ne` and `b`, canonically sorted.
    pub aligned: Table,
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub stages: PipelineStages,
    /// Raw conductivities; non-finite values are kept.
    pub conductivity: ConductivityField,
}

impl PipelineOutput {
    /// The aligned working table with the two conductivity columns appended.
    pub fn table(&self) -> Result<Table, FieldError> {
        let [hall, pedersen] = ConductivityField::COLUMNS;
        self.stages
            .aligned
            .clone()
            .with_column(hall, self.conductivity.hall.clone())?
            .with_column(pedersen, self.conductivity.pedersen.clone())
    }
}

pub fn run(
    inputs: &PipelineInputs,
    constants: &PhysicalConstants,
) -> Result<PipelineOutput, FieldError> {
    let PipelineInputs {
        neutrals,
        ionosphere,
        magnetic,
    } = inputs;

    let gyrofrequency = gyrofrequency_all(constants, magnetic.b());

    let collision = collision_frequencies_all(
        neutrals.n2(),
        neutrals.o2(),
        neutrals.o(),
        ionosphere.te(),
        ionosphere.tn(),
        ionosphere.ti(),
    )?;
    warn_if_dropped("collision frequencies", neutrals.n2().len(), collision.keys.len());

    let composition = ionosphere.composition();
    let relative_density = relative_density_all(
        composition.o(),
        composition.no(),
        composition.o2(),
        ionosphere.ne(),
    )?;
    warn_if_dropped("relative densities", ionosphere.ne().len(), relative_density.keys.len());

    let joined = align_tables(&[
        &gyrofrequency.to_table(),
        &collision.to_table(),
        &relative_density.to_table(),
        &Table::from_field(ionosphere.ne()),
        &Table::from_field(magnetic.b()),
    ])?;
    warn_if_dropped("alignment", gyrofrequency.keys.len(), joined.len());
    let aligned = canonical_sort(&joined);

    let conductivity = ConductivityField::from_table(constants, &aligned)?;
    let bad = conductivity.non_finite_count();
    if bad > 0 {
        tracing::warn!(
            count = bad,
            total = conductivity.len(),
            "conductivity is non-finite at some keys (Ne or B zero?)"
        );
    }
    tracing::info!(keys = conductivity.len(), "pipeline finished");

    Ok(PipelineOutput {
        stages: PipelineStages {
            gyrofrequency,
            collision,
            relative_density,
            aligned,
        },
        conductivity,
    })
}

fn warn_if_dropped(stage: &str, before: usize, after: usize) {
    if after < before {
        tracing::warn!(
            stage,
            dropped = before - after,
            kept = after,
            "keys missing from some source were dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::field::Field;
    use crate::grid::key::GridKey;
    use crate::models::inputs::IonComposition;
    use nalgebra::DVector;

    fn constant(name: &str, keys: &[GridKey], value: f64) -> Field {
        Field::new(name, keys.to_vec(), DVector::from_element(keys.len(), value)).unwrap()
    }

    #[test]
    fn output_is_canonical_and_restricted_to_common_keys() {
        let k = |t: i64, h: f64| GridKey::new(t, h, 0.0, 0.0);
        let msis = [k(0, 120.0), k(0, 100.0), k(0, 110.0)];
        let iri = [k(0, 110.0), k(0, 100.0), k(0, 140.0), k(0, 120.0)];
        let igrf = [k(0, 100.0), k(0, 110.0), k(0, 120.0), k(3600, 100.0)];

        let inputs = PipelineInputs {
            neutrals: NeutralComposition::from_per_m3(
                constant("n2", &msis, 1e18),
                constant("o2", &msis, 2e17),
                constant("o", &msis, 5e17),
            ),
            ionosphere: IonosphericState::new(
                constant("ne", &iri, 1e11),
                constant("te", &iri, 400.0),
                constant("ti", &iri, 300.0),
                constant("tn", &iri, 300.0),
                IonComposition::from_fractions(
                    constant("o", &iri, 0.1),
                    constant("no", &iri, 0.6),
                    constant("o2", &iri, 0.3),
                ),
            ),
            magnetic: MagneticField::new(constant("b", &igrf, 5e-5)),
        };

        let out = run(&inputs, &PhysicalConstants::default()).unwrap();
        assert_eq!(
            out.conductivity.keys,
            vec![k(0, 100.0), k(0, 110.0), k(0, 120.0)]
        );
        assert!(out.stages.aligned.is_canonical());
        assert!(out.conductivity.pedersen.iter().all(|&p| p > 0.0));

        let table = out.table().unwrap();
        assert!(table.column("cond_h").is_ok());
        assert_eq!(table.column("cond_p").unwrap(), &out.conductivity.pedersen);
    }
}
