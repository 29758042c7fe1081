use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use csv::WriterBuilder;
use log::info;

use crate::columns::ColumnBuffers;
use crate::error::Error;
use crate::record::FIELD_SEPARATOR;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `{prefix}_{YYYY-MM-DD_HH-MM-SS}.csv`
pub fn export_file_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.csv", prefix, now.format(TIMESTAMP_FORMAT))
}

/// Writes one `;`-separated line per row, without header.
pub fn write_rows<W, I, R>(writer: W, rows: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = R>,
    R: AsRef<[f64]>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_SEPARATOR)
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    for row in rows {
        writer.write_record(row.as_ref().iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `rows` to `dir/{prefix}_{timestamp}.csv`, creating `dir` if needed.
pub fn export_rows<I, R>(dir: &Path, prefix: &str, rows: I) -> Result<PathBuf, Error>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[f64]>,
{
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(prefix, Local::now()));
    let file = File::create(&path)?;
    write_rows(file, rows)?;
    info!("Exported data to {}", path.display());
    Ok(path)
}

/// Snapshot of the column buffers, transposed to one row per sample.
pub fn export_columns(dir: &Path, prefix: &str, buffers: &ColumnBuffers) -> Result<PathBuf, Error> {
    export_rows(dir, prefix, buffers.rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_has_timestamp_suffix() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            export_file_name("export", now),
            "export_2024-03-07_09-05-02.csv"
        );
    }

    #[test]
    fn rows_are_semicolon_separated() {
        let mut buffers = ColumnBuffers::new(2);
        buffers.apply(&vec![vec![0.0, 5.0], vec![1.0, 6.0]]);
        let mut out = Vec::new();
        write_rows(&mut out, buffers.rows()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0;5\n1;6\n");
    }

    #[test]
    fn fractions_keep_their_digits() {
        let mut out = Vec::new();
        write_rows(&mut out, [vec![0.5, 1.1, -2.25]]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5;1.1;-2.25\n");
    }

    #[test]
    fn uneven_rows_are_allowed() {
        let mut out = Vec::new();
        write_rows(&mut out, [vec![1.0], vec![1.0, 2.0]]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n1;2\n");
    }

    #[test]
    fn export_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("exports");
        let mut buffers = ColumnBuffers::new(2);
        buffers.apply(&vec![vec![0.0, 5.0], vec![1.0, 6.0]]);

        let path = export_columns(&dir, "export", &buffers).unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("export_") && name.ends_with(".csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "0;5\n1;6\n");
    }

    #[test]
    fn empty_export_writes_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let buffers = ColumnBuffers::new(3);
        let path = export_columns(tmp.path(), "export", &buffers).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "");
    }
}
