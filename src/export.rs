//! Spreadsheet export of a fetched series as CSV
//! (`Date,Open,High,Low,Close,Volume`).

use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::models::OhlcvRow;

pub const DEFAULT_EXPORT_PATH: &str = "stock_data.csv";

pub fn write_csv<W: Write>(writer: W, rows: &[OhlcvRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<OhlcvRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let rows = reader
        .deserialize::<OhlcvRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Write `rows` to `path`, replacing any existing file
pub fn export_to_file(path: impl AsRef<Path>, rows: &[OhlcvRow]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_csv(file, rows)?;
    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn import_from_file(path: impl AsRef<Path>) -> Result<Vec<OhlcvRow>> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}
