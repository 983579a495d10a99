use crate::error::{Error, Result};
use crate::join::StreamDataset;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use spdlog::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Serializes `value` as JSON indented with four spaces.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    write_pretty(&mut buf, value)?;
    String::from_utf8(buf).map_err(|e| Error::Decode(e.to_string()))
}

fn write_pretty<W: Write, T: Serialize>(writer: W, value: &T) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Writes the joined dataset, run numbers as top-level keys.
pub fn write_export(path: &Path, dataset: &StreamDataset) -> Result<()> {
    write_json(path, dataset)?;
    info!(
        "[Export] Wrote {} runs to {}",
        dataset.len(),
        path.display()
    );
    Ok(())
}

pub fn read_export(path: &Path) -> Result<StreamDataset> {
    read_json(path)
}
