//! Index of the host application's built-in library graphs.
//!
//! The host ships a `resources.json` database describing every asset its
//! library exposes. The index keeps the listable graph assets, keyed by
//! identifier. It serves two purposes: custom-sub-graph descent skips
//! graphs found here (built-in assets are not searched through), and
//! library node-type filters are built from its entries.
//!
//! A missing or malformed database is never fatal — the index just stays
//! empty and library filters become unavailable.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::errors::{SearchError, SearchResult};

const DB_RELATIVE_PATH: &str = "Adobe/Adobe Substance 3D Designer/databases/resources.json";

/// One library graph asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub label: String,
    /// Archive the asset lives in.
    pub archive_path: String,
}

/// Identifier-keyed index of library graph assets.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    entries: HashMap<String, LibraryEntry>,
}

impl LibraryIndex {
    /// Loads the index from the host's default database location. Missing
    /// or unreadable databases yield an empty index.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_db_path() else {
            info!("no platform data directory, library index unavailable");
            return Self::default();
        };
        if !path.is_file() {
            info!(
                "library database not found at {}, library node filters unavailable",
                path.display()
            );
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(index) => {
                info!(
                    "library database loaded from {} ({} graphs)",
                    path.display(),
                    index.len()
                );
                index
            }
            Err(err) => {
                warn!("loading library database failed: {err}");
                Self::default()
            }
        }
    }

    fn default_db_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join(DB_RELATIVE_PATH))
    }

    /// Loads the index from an explicit database file.
    pub fn load_from(path: &Path) -> SearchResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let db: Value = serde_json::from_str(&raw)
            .map_err(|e| SearchError::library_error(e.to_string()))?;
        Ok(Self::from_db(&db))
    }

    /// Builds the index from a parsed database document. Records missing
    /// any required field are skipped silently, as are assets hidden from
    /// the library.
    pub fn from_db(db: &Value) -> Self {
        let mut index = Self::default();
        let Some(resources) = db.get("resources").and_then(Value::as_array) else {
            warn!("library database has no resources array");
            return index;
        };
        for resource in resources {
            if !resource
                .get("is_listable")
                .and_then(Value::as_bool)
                .unwrap_or(false)
            {
                continue;
            }
            if resource.get("extension").and_then(Value::as_str) != Some("graph") {
                continue;
            }
            let Some(identifier) = resource.get("basename").and_then(Value::as_str) else {
                continue;
            };
            let Some(archive) = resource.get("archive_url").and_then(Value::as_str) else {
                continue;
            };
            let Some(metadata) = resource.get("metadata") else {
                continue;
            };
            let hidden = metadata
                .get("hideInLibrary")
                .and_then(Value::as_str)
                .map(|v| v != "0")
                .unwrap_or(false);
            if hidden {
                continue;
            }
            let Some(label) = metadata.get("label").and_then(Value::as_str) else {
                continue;
            };
            index.entries.insert(
                identifier.to_string(),
                LibraryEntry {
                    label: label.to_string(),
                    archive_path: archive.to_string(),
                },
            );
        }
        index
    }

    pub fn insert(&mut self, identifier: &str, entry: LibraryEntry) {
        self.entries.insert(identifier.to_string(), entry);
    }

    pub fn entry(&self, identifier: &str) -> Option<&LibraryEntry> {
        self.entries.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of every indexed graph, unordered.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
