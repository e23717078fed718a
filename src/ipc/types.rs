use crate::config::Config;
use crate::error::PlanResult;
use crate::model::Planner;
use crate::store::Store;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    /// Live graph for the selected workspace; replaced only after a successful save.
    pub planner: Planner,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            workspace: None,
            store: None,
            planner: Planner::default(),
        }
    }

    /// Points the daemon at a workspace directory and loads its data file.
    ///
    /// With `reset_on_corrupt`, an unreadable file is moved aside and the
    /// workspace starts empty; the moved path is returned.
    pub fn open_workspace(
        &mut self,
        path: PathBuf,
        reset_on_corrupt: bool,
    ) -> PlanResult<Option<PathBuf>> {
        let store = Store::in_workspace(&path, &self.config.data_file);
        let (planner, quarantined) = match store.load() {
            Ok(p) => (p, None),
            Err(e) if reset_on_corrupt => {
                tracing::warn!(error = %e, "data file unreadable, starting empty");
                let moved = store.quarantine()?;
                (Planner::default(), moved)
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            path = %store.path().display(),
            days = planner.days.len(),
            collections = planner.collections.len(),
            "workspace opened"
        );
        self.workspace = Some(path);
        self.store = Some(store);
        self.planner = planner;
        Ok(quarantined)
    }
}
