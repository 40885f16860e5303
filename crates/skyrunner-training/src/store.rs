//! Durable storage for elite records.
//!
//! [`DirectoryStore`] writes one JSON file per generation named
//! `gen-{generation:06}.json`. The zero padding makes lexical file-name order equal
//! to generation order, which is the order records are loaded back in.

use std::{
    fmt, fs,
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use crate::archive::ScoreRecord;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PersistenceError {
    #[display("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("malformed record {}: {source}", path.display())]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl PersistenceError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Format { path, .. } => path,
        }
    }
}

/// Where archived records are persisted.
pub trait GenomeStore: Send + fmt::Debug {
    /// Durably stores `record`, keyed by its generation.
    fn save(&mut self, record: &ScoreRecord) -> Result<(), PersistenceError>;

    /// Returns every readable stored record in generation order.
    fn load_all(&self) -> Result<Vec<ScoreRecord>, PersistenceError>;

    /// Highest generation key in use, including records that cannot be read back.
    fn last_generation(&self) -> Result<Option<u64>, PersistenceError>;
}

const FILE_PREFIX: &str = "gen-";
const FILE_SUFFIX: &str = ".json";

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    /// Uses `dir` as the archive directory. It is created on first save.
    pub fn new<P>(dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn record_path(&self, generation: u64) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{generation:06}{FILE_SUFFIX}"))
    }

    /// Reads a single record file.
    pub fn read_record<P>(path: P) -> Result<ScoreRecord, PersistenceError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let io_error = |source| PersistenceError::Io {
            path: path.to_owned(),
            source,
        };
        let file = fs::File::open(path).map_err(io_error)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            PersistenceError::Format {
                path: path.to_owned(),
                source,
            }
        })
    }

    fn generation_of(name: &str) -> Option<u64> {
        let digits = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Record files in the directory with their generation keys, in generation order.
    fn record_files(&self) -> Result<Vec<(u64, PathBuf)>, PersistenceError> {
        let io_error = |source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        };
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(source) => return Err(io_error(source)),
        };

        let mut files = vec![];
        for entry in entries {
            let entry = entry.map_err(io_error)?;
            if let Some(generation) = entry.file_name().to_str().and_then(Self::generation_of) {
                files.push((generation, entry.path()));
            }
        }
        files.sort();
        Ok(files)
    }
}

impl GenomeStore for DirectoryStore {
    fn save(&mut self, record: &ScoreRecord) -> Result<(), PersistenceError> {
        let path = self.record_path(record.generation);
        let tmp_path = path.with_extension("json.tmp");
        let io_error = |path: &Path| {
            let path = path.to_owned();
            move |source| PersistenceError::Io { path, source }
        };

        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let file = fs::File::create(&tmp_path).map_err(io_error(&tmp_path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record).map_err(|source| PersistenceError::Format {
            path: tmp_path.clone(),
            source,
        })?;
        writer.flush().map_err(io_error(&tmp_path))?;
        drop(writer);
        // Readers only ever see complete files.
        fs::rename(&tmp_path, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ScoreRecord>, PersistenceError> {
        let mut records = vec![];
        for (_, path) in self.record_files()? {
            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("skipping unreadable record: {e}"),
            }
        }
        Ok(records)
    }

    fn last_generation(&self) -> Result<Option<u64>, PersistenceError> {
        Ok(self.record_files()?.last().map(|(generation, _)| *generation))
    }
}

/// Keeps records in memory only; used when persistence is disabled.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<ScoreRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_records(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }
}

impl GenomeStore for MemoryStore {
    fn save(&mut self, record: &ScoreRecord) -> Result<(), PersistenceError> {
        self.records.retain(|r| r.generation != record.generation);
        self.records.push(record.clone());
        self.records.sort_by_key(|r| r.generation);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ScoreRecord>, PersistenceError> {
        Ok(self.records.clone())
    }

    fn last_generation(&self) -> Result<Option<u64>, PersistenceError> {
        Ok(self.records.iter().map(|r| r.generation).max())
    }
}

#[cfg(test)]
mod tests {
    use skyrunner_brain::Genome;

    use super::*;

    fn record(generation: u64, score: i64) -> ScoreRecord {
        ScoreRecord {
            generation,
            score,
            genome: Genome::from_layers(vec![vec![vec![0.25, -1.5, 3.0]]]),
        }
    }

    #[test]
    fn test_round_trip_in_generation_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(dir.path().join("archive"));
        for generation in [12, 3, 100, 7] {
            store.save(&record(generation, i64::try_from(generation).unwrap() * 10)).unwrap();
        }
        assert!(store.record_path(3).ends_with("gen-000003.json"));

        let loaded = store.load_all().unwrap();
        let generations: Vec<_> = loaded.iter().map(|r| r.generation).collect();
        assert_eq!(generations, [3, 7, 12, 100]);
        assert_eq!(loaded[0], record(3, 30));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("nowhere"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(dir.path());
        store.save(&record(1, 5)).unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("gen-000002.json.tmp"), "{").unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_record_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen-000004.json");
        fs::write(&path, r#"{"generation": 4}"#).unwrap();
        let err = DirectoryStore::read_record(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::Format { .. }));
        assert_eq!(err.path(), path);
    }

    #[test]
    fn test_unreadable_record_is_skipped_but_keeps_its_generation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(dir.path());
        for generation in 1..=3 {
            store.save(&record(generation, 10)).unwrap();
        }
        fs::write(store.record_path(4), "{").unwrap();

        let loaded = store.load_all().unwrap();
        let generations: Vec<_> = loaded.iter().map(|r| r.generation).collect();
        assert_eq!(generations, [1, 2, 3]);
        assert_eq!(store.last_generation().unwrap(), Some(4));
    }

    #[test]
    fn test_last_generation_of_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("nowhere"));
        assert_eq!(store.last_generation().unwrap(), None);
        fs::create_dir(store.dir()).unwrap();
        fs::write(store.dir().join("gen-.json"), "{}").unwrap();
        fs::write(store.dir().join("gen-000009.json.tmp"), "{}").unwrap();
        assert_eq!(store.last_generation().unwrap(), None);
        assert_eq!(MemoryStore::new().last_generation().unwrap(), None);
    }

    #[test]
    fn test_save_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut store = DirectoryStore::new(&blocker);
        assert!(matches!(
            store.save(&record(1, 1)),
            Err(PersistenceError::Io { .. })
        ));
    }

    #[test]
    fn test_memory_store_replaces_same_generation() {
        let mut store = MemoryStore::new();
        store.save(&record(2, 1)).unwrap();
        store.save(&record(1, 1)).unwrap();
        store.save(&record(2, 9)).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].score, 9);
    }
}
