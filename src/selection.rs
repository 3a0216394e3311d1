use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSelection {
    #[serde(default)]
    pub model: Option<String>,
}

/// Last chosen model id, stored as `{"model": "<id>"}`. Writes are not locked.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted model selection");
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read model selection '{}'", self.path.display())
                });
            }
        };

        let selection: PersistedSelection = serde_json::from_str(&raw).with_context(|| {
            format!("Failed to parse model selection '{}'", self.path.display())
        })?;

        let model = selection.model.filter(|model| !model.is_empty());
        debug!(
            path = %self.path.display(),
            model = model.as_deref().unwrap_or(""),
            "loaded persisted model selection"
        );
        Ok(model)
    }

    pub fn save(&self, model: &str) -> Result<()> {
        let selection = PersistedSelection {
            model: Some(model.to_string()),
        };
        let body =
            serde_json::to_string(&selection).context("Failed to serialize model selection")?;
        fs::write(&self.path, body).with_context(|| {
            format!("Failed to write model selection '{}'", self.path.display())
        })?;
        debug!(path = %self.path.display(), model = %model, "saved model selection");
        Ok(())
    }
}
