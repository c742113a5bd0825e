use serde::Serialize;
use std::path::Path;

/// Serializes the records to a csv file with a header row.
pub fn dump_data_to_csv<T: Serialize>(data: &[T], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in data {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
