use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Running,
    Success,
    Error,
}

impl CommandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandStatus::Running => "running",
            CommandStatus::Success => "success",
            CommandStatus::Error => "error",
        }
    }
}

/// One execution of a typed or selected command.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExecutedCommand {
    pub id: String,                // Hash prefix + timestamp + sequence
    pub command: String,           // Command text as the user entered it
    pub output: String,            // Empty until the result arrives
    pub status: CommandStatus,     // running -> success | error, once
    pub timestamp: DateTime<Utc>,  // When the command was triggered
    #[serde(default)]
    pub execution_ms: Option<u64>, // Simulated round-trip
}

impl ExecutedCommand {
    pub fn start(command: &str, sequence: u64) -> Self {
        let timestamp = Utc::now();
        Self {
            id: record_id(command, &timestamp, sequence),
            command: command.to_string(),
            output: String::new(),
            status: CommandStatus::Running,
            timestamp,
            execution_ms: None,
        }
    }

    /// Fill in the result. Returns `false` (and changes nothing) when the
    /// record already left the running state.
    pub fn complete(&mut self, output: String, status: CommandStatus, elapsed: Duration) -> bool {
        if self.status != CommandStatus::Running || status == CommandStatus::Running {
            log::warn!("record {} already completed; ignoring second result", self.id);
            return false;
        }
        self.output = output;
        self.status = status;
        self.execution_ms = Some(elapsed.as_millis() as u64);
        true
    }

    pub fn is_running(&self) -> bool {
        self.status == CommandStatus::Running
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn now(command: &str) -> Self {
        Self {
            command: command.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Most-recent-first list of panel results with a fixed capacity.
#[derive(Debug, Clone)]
pub struct RecordWindow {
    records: VecDeque<ExecutedCommand>,
    capacity: usize,
}

impl RecordWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Newest goes to the front; the oldest falls off past capacity.
    pub fn push_front(&mut self, record: ExecutedCommand) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    pub fn get(&self, index: usize) -> Option<&ExecutedCommand> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutedCommand> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

fn record_id(command: &str, timestamp: &DateTime<Utc>, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(command.trim().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}_{}", &digest[..12], timestamp.timestamp_millis(), sequence)
}
