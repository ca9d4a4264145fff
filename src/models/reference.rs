use nalgebra::DVector;

use super::inputs::{
    CompositionUnit, IonComposition, IonosphericState, MagneticField, NeutralComposition,
};
use crate::grid::FieldError;
use crate::grid::field::Field;
use crate::grid::generator::GridAxes;
use crate::grid::key::{GridKey, LongitudeConvention, SpatialKey};
use crate::pipeline::PipelineInputs;

/// Analytic stand-in for the neutral, ionospheric and geomagnetic model
/// outputs, sampled on `axes`.
///
/// The three sources are produced the way real adapters deliver them:
/// neutral densities in cm^-3, ionospheric fields in a different row order,
/// and the geomagnetic field on a time-less grid broadcast over `times_s`.
pub fn reference_problem_def(
    axes: &GridAxes,
    composition_unit: CompositionUnit,
) -> Result<PipelineInputs, FieldError> {
    // Neutral atmosphere, anchored at 100 km
    let h_ref = 100.0; // [km]
    let n2_ref = 9.2e12; // [cm^-3]
    let o2_ref = 2.2e12; // [cm^-3]
    let o_ref = 4.5e11; // [cm^-3]
    let (h_n2, h_o2, h_o) = (9.0, 8.5, 25.0); // [km] scale heights

    let t_base = 200.0; // [K] neutral temperature at the reference height
    let t_exo = 1000.0; // [K] exospheric temperature
    let t_shape = 40.0; // [km]

    // Chapman layer
    let nm_f2 = 1e12; // [m^-3] peak electron density
    let hm_f2 = 300.0; // [km]
    let h_chapman = 50.0; // [km]

    // Transition height from molecular ions to O+
    let h_transition = 180.0; // [km]

    // Centred dipole
    let b_equator = 3.12e-5; // [T] surface field at the magnetic equator
    let earth_radius = 6371.2; // [km]

    let keys = axes.keys();
    let neutral = |n_ref: f64, scale: f64| {
        sample(&keys, |k| n_ref * (-(k.height_km - h_ref) / scale).exp())
    };
    let tn_of = |h: f64| {
        if h <= h_ref {
            t_base
        } else {
            t_exo - (t_exo - t_base) * (-(h - h_ref) / t_shape).exp()
        }
    };
    let te_of = |h: f64| tn_of(h) * (1.0 + 1.5 * (1.0 - (-(h - h_ref).max(0.0) / 80.0).exp()));

    let neutrals = NeutralComposition::from_per_cm3(
        Field::new("N2", keys.clone(), neutral(n2_ref, h_n2))?,
        Field::new("O2", keys.clone(), neutral(o2_ref, h_o2))?,
        Field::new("O", keys.clone(), neutral(o_ref, h_o))?,
    );

    // Ionosphere model rows arrive in its own order
    let iri_keys: Vec<GridKey> = keys.iter().rev().copied().collect();

    let scale = match composition_unit {
        CompositionUnit::Fraction => 1.0,
        CompositionUnit::Percent => 100.0,
    };
    let o_plus = |h: f64| 1.0 / (1.0 + (-(h - h_transition) / 20.0).exp());

    let ne = sample(&iri_keys, |k| {
        let z = (k.height_km - hm_f2) / h_chapman;
        let peak = nm_f2 * (0.5 + 0.5 * k.latitude_deg.to_radians().cos());
        peak * (0.5 * (1.0 - z - (-z).exp())).exp()
    });
    let te = sample(&iri_keys, |k| te_of(k.height_km));
    let tn = sample(&iri_keys, |k| tn_of(k.height_km));
    let ti = sample(&iri_keys, |k| 0.5 * (tn_of(k.height_km) + te_of(k.height_km)));
    let frac_o = sample(&iri_keys, |k| scale * o_plus(k.height_km));
    let frac_no = sample(&iri_keys, |k| scale * 0.75 * (1.0 - o_plus(k.height_km)));
    let frac_o2 = sample(&iri_keys, |k| scale * 0.25 * (1.0 - o_plus(k.height_km)));

    let composition = IonComposition::from_unit(
        composition_unit,
        Field::new("O+", iri_keys.clone(), frac_o)?,
        Field::new("NO+", iri_keys.clone(), frac_no)?,
        Field::new("O2+", iri_keys.clone(), frac_o2)?,
    );
    let ionosphere = IonosphericState::new(
        Field::new("Ne", iri_keys.clone(), ne)?,
        Field::new("Te", iri_keys.clone(), te)?,
        Field::new("Ti", iri_keys.clone(), ti)?,
        Field::new("Tn", iri_keys, tn)?,
        composition,
    );

    // Geomagnetic grid: no time axis. The model is evaluated at longitudes
    // wrapped into [-180, 180) but keyed by the axes' own longitudes, so any
    // grid convention joins.
    let native = LongitudeConvention::Signed180;
    let spatial = axes.spatial_keys();
    let b = DVector::from_iterator(
        spatial.len(),
        spatial.iter().map(|k| {
            let at = SpatialKey::new(k.height_km, k.latitude_deg, native.normalize(k.longitude_deg));
            dipole_strength(b_equator, earth_radius, &at)
        }),
    );
    let magnetic = MagneticField::from_spatial(&spatial, &b, &axes.times_s)?;

    Ok(PipelineInputs {
        neutrals,
        ionosphere,
        magnetic,
    })
}

/// `B0 (Re / (Re + h))^3 sqrt(1 + 3 sin^2(lat))` for a centred dipole.
fn dipole_strength(b_equator: f64, earth_radius: f64, at: &SpatialKey) -> f64 {
    let ratio = earth_radius / (earth_radius + at.height_km);
    let sin_lat = at.latitude_deg.to_radians().sin();
    b_equator * ratio.powi(3) * (1.0 + 3.0 * sin_lat * sin_lat).sqrt()
}

fn sample(keys: &[GridKey], f: impl Fn(&GridKey) -> f64) -> DVector<f64> {
    DVector::from_iterator(keys.len(), keys.iter().map(f))
}
