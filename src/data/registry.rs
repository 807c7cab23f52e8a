//! Startup-loaded table registry for the server and CLI.
//! Load once, pass via Arc to handlers to avoid re-reading files per request.
//!
//! Tables come from the compiled-in defaults unless LYTTON_DATA_DIR points at
//! a directory with override files. A missing override file falls back to its
//! builtin table; an override that is present but invalid is a hard error.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::data::allocation::{AllocationTable, AllocationTableError, AllocationsFile};
use crate::data::scoring_key::{ScoringKey, ScoringKeyError, ScoringKeyFile};

pub const SCORING_KEY_FILE: &str = "scoring_key.json";
pub const ALLOCATIONS_FILE: &str = "allocations.json";

/// Environment variable naming the override data directory.
pub const DATA_DIR_ENV: &str = "LYTTON_DATA_DIR";

/// Where a table was loaded from. Reported by `/api/data/version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Builtin,
    File(PathBuf),
}

impl TableSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Builtin => "builtin".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Source and load-time metadata for the registry's tables.
#[derive(Debug, Clone)]
pub struct TableProvenance {
    pub scoring_key_source: TableSource,
    pub allocations_source: TableSource,
    pub loaded_at: String,
}

impl TableProvenance {
    fn builtin() -> TableProvenance {
        TableProvenance {
            scoring_key_source: TableSource::Builtin,
            allocations_source: TableSource::Builtin,
            loaded_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Read-only scoring tables loaded once at startup.
#[derive(Debug, Clone)]
pub struct DataRegistry {
    scoring_key: ScoringKey,
    allocations: AllocationTable,
    provenance: TableProvenance,
}

impl DataRegistry {
    /// The compiled-in tables.
    pub fn builtin() -> DataRegistry {
        DataRegistry {
            scoring_key: ScoringKey::builtin(),
            allocations: AllocationTable::builtin(),
            provenance: TableProvenance::builtin(),
        }
    }

    /// Load tables from override files in `dir`. Either file may be absent,
    /// in which case its builtin table stands in.
    pub fn from_data_dir(dir: &Path) -> Result<DataRegistry, RegistryError> {
        let scoring_path = dir.join(SCORING_KEY_FILE);
        let allocations_path = dir.join(ALLOCATIONS_FILE);

        let (scoring_key, scoring_key_source) = match read_scoring_key_file(&scoring_path)? {
            Some(file) => (
                ScoringKey::from_rows(&file.questions)?,
                TableSource::File(scoring_path),
            ),
            None => (ScoringKey::builtin(), TableSource::Builtin),
        };
        let (allocations, allocations_source) = match read_allocations_file(&allocations_path)? {
            Some(file) => (
                AllocationTable::from_rows(&file.allocations)?,
                TableSource::File(allocations_path),
            ),
            None => (AllocationTable::builtin(), TableSource::Builtin),
        };

        Ok(DataRegistry {
            scoring_key,
            allocations,
            provenance: TableProvenance {
                scoring_key_source,
                allocations_source,
                loaded_at: Utc::now().to_rfc3339(),
            },
        })
    }

    /// Builtin tables, or the LYTTON_DATA_DIR overrides when the variable is
    /// set.
    pub fn from_env() -> Result<DataRegistry, RegistryError> {
        match env::var_os(DATA_DIR_ENV) {
            Some(dir) => Self::from_data_dir(Path::new(&dir)),
            None => Ok(Self::builtin()),
        }
    }

    pub fn scoring_key(&self) -> &ScoringKey {
        &self.scoring_key
    }

    pub fn allocations(&self) -> &AllocationTable {
        &self.allocations
    }

    pub fn provenance(&self) -> &TableProvenance {
        &self.provenance
    }
}

/// Read an override scoring key. `Ok(None)` when the file does not exist.
pub fn read_scoring_key_file(path: &Path) -> Result<Option<ScoringKeyFile>, RegistryError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Read an override allocation table. `Ok(None)` when the file does not exist.
pub fn read_allocations_file(path: &Path) -> Result<Option<AllocationsFile>, RegistryError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn read_optional(path: &Path) -> Result<Option<String>, RegistryError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(RegistryError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[derive(Debug)]
pub enum RegistryError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    ScoringKey(ScoringKeyError),
    Allocations(AllocationTableError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "unable to read '{}': {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "unable to parse json '{}': {source}", path.display())
            }
            Self::ScoringKey(err) => write!(f, "scoring key rejected: {err}"),
            Self::Allocations(err) => write!(f, "allocation table rejected: {err}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::ScoringKey(err) => Some(err),
            Self::Allocations(err) => Some(err),
        }
    }
}

impl From<ScoringKeyError> for RegistryError {
    fn from(err: ScoringKeyError) -> Self {
        Self::ScoringKey(err)
    }
}

impl From<AllocationTableError> for RegistryError {
    fn from(err: AllocationTableError) -> Self {
        Self::Allocations(err)
    }
}
