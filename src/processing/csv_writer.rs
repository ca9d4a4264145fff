use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use nalgebra::DVector;

use crate::grid::align::Table;
use crate::grid::key::GridKey;

const KEY_HEADERS: [&str; 4] = ["time_s", "height_km", "latitude_deg", "longitude_deg"];

/// Write keyed columns to CSV: the four key columns first, then `headers`.
pub fn write_keyed<P: AsRef<Path>>(
    path: P,
    keys: &[GridKey],
    headers: &[&str],
    data: &[&DVector<f64>],
) -> io::Result<()> {
    if headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }
    if let Some(col) = data.iter().find(|col| col.len() != keys.len()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Column length ({}) doesn't match key count ({})",
                col.len(),
                keys.len()
            ),
        ));
    }

    let mut file = BufWriter::new(File::create(path)?);

    let header_row: Vec<&str> = KEY_HEADERS.iter().chain(headers.iter()).copied().collect();
    writeln!(file, "{}", header_row.join(","))?;

    for (i, key) in keys.iter().enumerate() {
        let mut row = vec![
            key.time_s.to_string(),
            key.height_km.to_string(),
            key.latitude_deg.to_string(),
            key.longitude_deg.to_string(),
        ];
        row.extend(data.iter().map(|col| format!("{:.15e}", col[i])));
        writeln!(file, "{}", row.join(","))?;
    }

    file.flush()
}

/// Write every column of `table` in row order.
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> io::Result<()> {
    let names: Vec<&str> = table.column_names().collect();
    let columns = names
        .iter()
        .map(|name| {
            table
                .column(name)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
        })
        .collect::<io::Result<Vec<_>>>()?;
    write_keyed(path, table.keys(), &names, &columns)
}
