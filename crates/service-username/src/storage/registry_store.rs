//! Registered service persistence.
//!
//! Stores one `RegisteredService` per JSON file:
//!
//! ```text
//! {base_dir}/
//! └── services/
//!     └── {id}.json
//! ```
//!
//! File format:
//! ```json
//! { "version": 1, "saved_at": 1700000000000000, "service": { ... RegisteredService ... } }
//! ```
//!
//! The anonymous strategy's `salt` is stored as a plain string and must
//! round-trip unchanged; changing it re-keys every persistent id of the
//! service.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ResolutionError, Result};
use crate::registry::{RegisteredService, ServiceRegistry};

// ── File format constants ─────────────────────────────────────────────────────

const SERVICE_FILE_VERSION: u32 = 1;

const SERVICES_DIR: &str = "services";

// ── On-disk structures ────────────────────────────────────────────────────────

/// Wrapper written to disk for each registered service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredService {
    /// Format version number.
    pub version: u32,
    /// When the record was written (microseconds since Unix epoch).
    #[serde(default)]
    pub saved_at: u64,
    /// The stored configuration.
    pub service: RegisteredService,
}

// ── RegistryStore ─────────────────────────────────────────────────────────────

/// Filesystem-backed store for `RegisteredService` records.
pub struct RegistryStore {
    base_dir: PathBuf,
}

impl RegistryStore {
    /// Create a new `RegistryStore` rooted at `base_dir`.
    ///
    /// Creates the `services/` sub-directory if it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Io` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(SERVICES_DIR))?;
        Ok(Self { base_dir })
    }

    /// Persist a registered service, replacing any previous record with the same id.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::SerializationError` if serialization fails, or
    /// `ResolutionError::Io` for filesystem errors.
    pub fn save(&self, service: &RegisteredService) -> Result<()> {
        let file = StoredService {
            version: SERVICE_FILE_VERSION,
            saved_at: crate::time::now_micros(),
            service: service.clone(),
        };

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| ResolutionError::SerializationError(e.to_string()))?;

        write_atomic(&self.service_path(service.id), json.as_bytes())?;
        log::debug!("Saved registered service {} [{}]", service.id, service.name);
        Ok(())
    }

    /// Load a registered service by id.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::ServiceNotFound` if no record exists,
    /// `ResolutionError::InvalidFileFormat` for malformed files, or
    /// `ResolutionError::Io` for filesystem errors.
    pub fn load(&self, id: u64) -> Result<RegisteredService> {
        Ok(self.load_record(id)?.service)
    }

    /// Load the full on-disk record, including its metadata.
    pub fn load_record(&self, id: u64) -> Result<StoredService> {
        let path = self.service_path(id);
        if !path.exists() {
            return Err(ResolutionError::ServiceNotFound(format!(
                "registered service {id}"
            )));
        }
        let record = read_record(&path)?;
        if record.service.id != id {
            return Err(ResolutionError::InvalidFileFormat(format!(
                "registered service file {} holds id {}",
                path.display(),
                record.service.id
            )));
        }
        Ok(record)
    }

    /// Delete a registered service. Returns `true` if a record existed.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Io` for filesystem errors.
    pub fn delete(&self, id: u64) -> Result<bool> {
        let path = self.service_path(id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        Ok(true)
    }

    /// List the ids of all stored services, ascending.
    ///
    /// Files whose stem is not an id in canonical decimal form are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Io` if the directory cannot be read.
    pub fn list(&self) -> Result<Vec<u64>> {
        let dir = self.base_dir.join(SERVICES_DIR);
        let mut ids = Vec::new();

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(id) = name_str
                .strip_suffix(".json")
                .and_then(|stem| {
                    stem.parse::<u64>()
                        .ok()
                        .filter(|id| id.to_string() == stem)
                })
            {
                ids.push(id);
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    /// Load every stored service.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable or malformed record.
    pub fn load_all(&self) -> Result<Vec<RegisteredService>> {
        self.list()?.into_iter().map(|id| self.load(id)).collect()
    }

    /// Load every stored service into a fresh in-memory registry.
    pub fn load_registry(&self) -> Result<ServiceRegistry> {
        Ok(ServiceRegistry::from_services(self.load_all()?))
    }

    /// Build the filesystem path for a service: `{base_dir}/services/{id}.json`.
    fn service_path(&self, id: u64) -> PathBuf {
        self.base_dir.join(SERVICES_DIR).join(format!("{id}.json"))
    }
}

/// Read and deserialize a record from an absolute path.
fn read_record(path: &Path) -> Result<StoredService> {
    let bytes = std::fs::read(path)?;
    let file: StoredService = serde_json::from_slice(&bytes).map_err(|e| {
        ResolutionError::InvalidFileFormat(format!(
            "failed to parse registered service file {}: {e}",
            path.display()
        ))
    })?;
    if file.version != SERVICE_FILE_VERSION {
        return Err(ResolutionError::InvalidFileFormat(format!(
            "unsupported registered service file version {} in {}",
            file.version,
            path.display()
        )));
    }
    Ok(file)
}

/// Write `data` to `path` atomically using a sibling temporary file.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
