//! Project persistence. The core only reaches the store at startup, on an
//! explicit save, and when the project list or selection changes.

use crate::model::{Group, Project};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write settings file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{path}': {message}")]
    Parse { path: String, message: String },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ordered store of project records
pub trait SettingsStore {
    fn load(&self) -> Result<Vec<Project>, SettingsError>;

    fn save(&mut self, projects: &[Project]) -> Result<(), SettingsError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    projects: Vec<Project>,
}

/// Projects stored as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    /// A missing file is an empty project list.
    fn load(&self) -> Result<Vec<Project>, SettingsError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let path_display = self.path.display().to_string();
        let raw = fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
            path: path_display.clone(),
            source,
        })?;
        let file: SettingsFile =
            serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
                path: path_display,
                message: e.to_string(),
            })?;
        debug!(path = %self.path.display(), projects = file.projects.len(), "loaded settings");
        Ok(file.projects)
    }

    fn save(&mut self, projects: &[Project]) -> Result<(), SettingsError> {
        let file = SettingsFile {
            projects: projects.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json).map_err(|source| SettingsError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), projects = projects.len(), "saved settings");
        Ok(())
    }
}

/// In-memory store for embedding hosts and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    projects: Vec<Project>,
    saves: usize,
}

impl MemoryStore {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects, saves: 0 }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// How many times `save` was called
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Vec<Project>, SettingsError> {
        Ok(self.projects.clone())
    }

    fn save(&mut self, projects: &[Project]) -> Result<(), SettingsError> {
        self.projects = projects.to_vec();
        self.saves += 1;
        Ok(())
    }
}

/// Exported filter groups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub groups: Vec<Group>,
}

pub fn export_groups(path: &Path, groups: &[Group]) -> Result<(), SettingsError> {
    let export = FilterExport {
        exported_at: Some(Utc::now()),
        groups: groups.to_vec(),
    };
    let json = serde_json::to_string_pretty(&export)?;
    fs::write(path, json).map_err(|source| SettingsError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Read groups from an export file.
///
/// Hand-edited files are accepted: comments and trailing commas are
/// tolerated.
pub fn import_groups(path: &Path) -> Result<Vec<Group>, SettingsError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path_display.clone(),
        source,
    })?;
    let export: FilterExport = json5::from_str(&raw).map_err(|e| SettingsError::Parse {
        path: path_display,
        message: e.to_string(),
    })?;
    Ok(export.groups)
}
