use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Active,
    Error,
    Stopped,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Active => "active",
            NodeStatus::Error => "error",
            NodeStatus::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    pub cpu: u32,
    pub memory: u32,
    pub storage: u32,
}

/// A deployed validator as reported by the node inventory. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub status: NodeStatus,
    #[serde(alias = "ipAddress")]
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub chain: String,
    pub region: String,
    pub specs: Specs,
}

impl Node {
    /// Stand-in node used when no inventory file is given.
    pub fn demo() -> Self {
        Self {
            id: "node-001".to_string(),
            name: "Validator Node 1".to_string(),
            status: NodeStatus::Active,
            address: "10.0.0.5".to_string(),
            created_at: Utc::now() - Duration::days(15) - Duration::hours(7) - Duration::minutes(32),
            chain: "ethereum".to_string(),
            region: "us-east-1".to_string(),
            specs: Specs {
                cpu: 4,
                memory: 16,
                storage: 500,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("cannot read node inventory {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("node inventory {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("node inventory is empty")]
    Empty,
    #[error("no node with id '{0}' in the inventory")]
    UnknownNode(String),
}

/// Load a JSON array of nodes.
pub fn load_inventory(path: &Path) -> Result<Vec<Node>, InventoryError> {
    let content = fs::read_to_string(path).map_err(|source| InventoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let nodes: Vec<Node> = serde_json::from_str(&content).map_err(|source| InventoryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded {} node(s) from {}", nodes.len(), path.display());
    Ok(nodes)
}

/// Pick a node by id, or the first one when no id is given.
pub fn select(nodes: Vec<Node>, id: Option<&str>) -> Result<Node, InventoryError> {
    match id {
        Some(id) => nodes
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| InventoryError::UnknownNode(id.to_string())),
        None => nodes.into_iter().next().ok_or(InventoryError::Empty),
    }
}
