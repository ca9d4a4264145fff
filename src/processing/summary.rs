use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use nalgebra::DVector;

use crate::pipeline::{PipelineInputs, PipelineOutput};

/// Min / max over the finite entries of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

fn finite_range(values: &DVector<f64>) -> Option<Range> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some(Range { min: v, max: v }),
            Some(r) => Some(Range {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
}

pub struct RunSummary {
    // Input coverage
    pub neutral_keys: usize,
    pub ionosphere_keys: usize,
    pub magnetic_keys: usize,

    // Stage coverage
    pub gyrofrequency_keys: usize,
    pub collision_keys: usize,
    pub relative_density_keys: usize,
    pub aligned_keys: usize,

    // Results
    pub non_finite: usize,
    pub hall: Option<Range>,
    pub pedersen: Option<Range>,

    // Export
    pub exported_keys: Option<usize>,
}

impl RunSummary {
    pub fn from_run(inputs: &PipelineInputs, output: &PipelineOutput) -> Self {
        let stages = &output.stages;
        Self {
            neutral_keys: inputs.neutrals.n2().len(),
            ionosphere_keys: inputs.ionosphere.ne().len(),
            magnetic_keys: inputs.magnetic.b().len(),
            gyrofrequency_keys: stages.gyrofrequency.keys.len(),
            collision_keys: stages.collision.keys.len(),
            relative_density_keys: stages.relative_density.keys.len(),
            aligned_keys: stages.aligned.len(),
            non_finite: output.conductivity.non_finite_count(),
            hall: finite_range(&output.conductivity.hall),
            pedersen: finite_range(&output.conductivity.pedersen),
            exported_keys: None,
        }
    }

    pub fn add_export_info(&mut self, exported_keys: usize) {
        self.exported_keys = Some(exported_keys);
    }

    /// Keys of the largest input that did not survive the joins.
    pub fn dropped_keys(&self) -> usize {
        let largest = self
            .neutral_keys
            .max(self.ionosphere_keys)
            .max(self.magnetic_keys);
        largest.saturating_sub(self.aligned_keys)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "IONOSPHERIC CONDUCTIVITY RUN SUMMARY")?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "INPUT COVERAGE (keys)")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Neutral atmosphere:  {}", self.neutral_keys)?;
        writeln!(file, "Ionosphere:          {}", self.ionosphere_keys)?;
        writeln!(file, "Geomagnetic field:   {}", self.magnetic_keys)?;
        writeln!(file)?;

        writeln!(file, "STAGE COVERAGE (keys)")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Gyrofrequencies:     {}", self.gyrofrequency_keys)?;
        writeln!(file, "Collision freq.:     {}", self.collision_keys)?;
        writeln!(file, "Relative densities:  {}", self.relative_density_keys)?;
        writeln!(file, "Aligned table:       {}", self.aligned_keys)?;
        writeln!(file, "Dropped by joins:    {}", self.dropped_keys())?;
        writeln!(file)?;

        writeln!(file, "CONDUCTIVITY")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Non-finite keys:     {}", self.non_finite)?;
        write_range(&mut file, "Hall", self.hall)?;
        write_range(&mut file, "Pedersen", self.pedersen)?;
        if let Some(n) = self.exported_keys {
            writeln!(file, "Exported keys:       {}", n)?;
        }
        writeln!(file)?;

        writeln!(file, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            aligned = self.aligned_keys,
            dropped = self.dropped_keys(),
            non_finite = self.non_finite,
            "run summary"
        );
        if let Some(r) = self.hall {
            tracing::info!("Hall:     {:.3e} .. {:.3e} S/m", r.min, r.max);
        }
        if let Some(r) = self.pedersen {
            tracing::info!("Pedersen: {:.3e} .. {:.3e} S/m", r.min, r.max);
        }
    }
}

fn write_range(file: &mut File, label: &str, range: Option<Range>) -> io::Result<()> {
    match range {
        Some(r) => writeln!(
            file,
            "{:<9} min {:.6e} S/m, max {:.6e} S/m",
            format!("{label}:"),
            r.min,
            r.max
        ),
        None => writeln!(file, "{:<9} no finite values", format!("{label}:")),
    }
}
