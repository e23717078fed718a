use crate::error::{PlanError, PlanResult};
use crate::model::{now, Collection, Day, Planner};
use anyhow::{anyhow, Context};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DATA_FILE: &str = "dayplan_data.json";

#[derive(Serialize)]
struct DocumentOut<'a> {
    days: &'a [Day],
    collections: &'a [Collection],
    last_updated: NaiveDateTime,
}

#[derive(Deserialize)]
struct DocumentIn {
    #[serde(default)]
    days: Vec<Day>,
    #[serde(default)]
    collections: Vec<Collection>,
}

/// Decodes a planner document and checks its invariants.
pub fn parse_document(bytes: &[u8]) -> anyhow::Result<Planner> {
    let doc: DocumentIn =
        serde_json::from_slice(bytes).context("data file is not a valid planner document")?;
    let mut planner = Planner {
        days: doc.days,
        collections: doc.collections,
    };
    planner
        .normalize()
        .map_err(|m| anyhow!("data file violates planner invariants: {m}"))?;
    Ok(planner)
}

/// The JSON data file. `load` and `save` are the only I/O on the planner graph.
///
/// There is no locking: a second process writing the same file can silently
/// overwrite this one's changes.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_workspace(workspace: &Path, file_name: &str) -> Self {
        Self::new(workspace.join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole graph. A missing file is an empty planner.
    pub fn load(&self) -> PlanResult<Planner> {
        self.try_load()
            .map_err(|e| PlanError::storage(&self.path, e))
    }

    /// Replaces the file with the serialized graph via write-to-temp and rename.
    pub fn save(&self, planner: &Planner) -> PlanResult<()> {
        self.try_save(planner)
            .map_err(|e| PlanError::storage(&self.path, e))
    }

    /// Moves an unreadable data file aside so the workspace can start empty.
    pub fn quarantine(&self) -> PlanResult<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let dst = self.sibling(&format!(".corrupt-{ts}"));
        std::fs::rename(&self.path, &dst)
            .with_context(|| format!("failed to move corrupt data file to {}", dst.display()))
            .map_err(|e| PlanError::storage(&self.path, e))?;
        Ok(Some(dst))
    }

    fn try_load(&self) -> anyhow::Result<Planner> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Planner::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        parse_document(text.as_bytes())
    }

    fn try_save(&self, planner: &Planner) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let doc = DocumentOut {
            days: &planner.days,
            collections: &planner.collections,
            last_updated: now(),
        };
        let body = serde_json::to_string_pretty(&doc).context("failed to serialize planner")?;

        let tmp = self.sibling(".tmp");
        {
            let mut f = File::create(&tmp)
                .with_context(|| format!("failed to create temp file {}", tmp.display()))?;
            f.write_all(body.as_bytes())
                .context("failed to write temp file")?;
            f.sync_all().context("failed to flush temp file")?;
        }
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to move {} over {}",
                tmp.display(),
                self.path.display()
            )
        })?;
        tracing::debug!(path = %self.path.display(), days = planner.days.len(), "planner saved");
        Ok(())
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from(DATA_FILE));
        name.push(suffix);
        self.path.with_file_name(name)
    }
}
