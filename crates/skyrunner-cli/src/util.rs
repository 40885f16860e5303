use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use skyrunner_training::{DirectoryStore, GenomeStore, MemoryStore, TrainingConfig};

/// Writes `value` as pretty JSON to `output`, or to stdout without one.
pub fn save_json<T>(value: &T, output: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_json(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_json<W, T>(mut writer: W, value: &T) -> io::Result<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Loads a training configuration, or the defaults when no file is given.
///
/// # Errors
///
/// Returns error if the file cannot be read or holds invalid values
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TrainingConfig> {
    let Some(path) = path else {
        return Ok(TrainingConfig::default());
    };
    let config: TrainingConfig = read_json_file("training config", path)?;
    config
        .validate()
        .with_context(|| format!("Invalid training config: {}", path.display()))?;
    Ok(config)
}

/// Opens the genome store backing an archive directory.
///
/// With `persist` unset the archive lives only in memory and nothing is read
/// from or written to `dir`.
pub fn open_store(dir: &Path, persist: bool) -> Box<dyn GenomeStore> {
    if persist {
        Box::new(DirectoryStore::new(dir))
    } else {
        Box::new(MemoryStore::new())
    }
}
