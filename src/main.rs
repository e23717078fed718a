mod backup;
mod calendar;
mod config;
mod error;
mod export;
mod ipc;
mod model;
mod stats;
mod store;
mod validation;

use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_logging(cfg: &config::Config) {
    let filter = cfg
        .log_filter
        .as_deref()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cfg = config::Config::from_env();
    init_logging(&cfg);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dayplan daemon starting");

    let mut state = ipc::AppState::new(cfg.clone());
    if let Some(path) = cfg.workspace {
        if let Err(e) = state.open_workspace(path.clone(), false) {
            tracing::error!(path = %path.display(), error = %e, "startup workspace failed to open");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                tracing::warn!(error = %e, "unparseable request line");
                // No id to echo back.
                ipc::err("", "bad_json", e.to_string(), None)
            }
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    tracing::info!("dayplan daemon exiting");
}
