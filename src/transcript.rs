use crate::connection::ConnectionConfig;
use crate::dashboard::Dashboard;
use crate::i18n::I18n;
use crate::node::Node;
use crate::record::{ExecutedCommand, HistoryEntry};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct Transcript<'a> {
    pub exported_at: DateTime<Utc>,
    pub node: Option<&'a Node>,
    pub connection: Option<&'a ConnectionConfig>,
    pub history: &'a [HistoryEntry],
    pub terminal: &'a [ExecutedCommand],
    pub panel_results: Vec<&'a ExecutedCommand>,
}

impl<'a> Transcript<'a> {
    pub fn capture(dashboard: &'a Dashboard) -> Self {
        Self {
            exported_at: Utc::now(),
            node: dashboard.node(),
            connection: dashboard.connection_config(),
            history: dashboard.terminal().history(),
            terminal: dashboard.terminal().records(),
            panel_results: dashboard.results().iter().collect(),
        }
    }

    /// Number of terminal and panel records written.
    pub fn record_count(&self) -> usize {
        self.terminal.len() + self.panel_results.len()
    }
}

pub fn export(dashboard: &Dashboard, path: &Path, i18n: &I18n) -> Result<usize> {
    let transcript = Transcript::capture(dashboard);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(i18n.t("error_export"))?;
    }
    serde_json::to_writer_pretty(fs::File::create(path).context(i18n.t("error_export"))?, &transcript)
        .context(i18n.t("error_export"))?;
    log::info!("exported {} record(s) to {}", transcript.record_count(), path.display());
    Ok(transcript.record_count())
}
