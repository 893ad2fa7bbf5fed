use crate::random;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Fleet-wide totals shown on the overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetMetrics {
    pub total_nodes: u32,
    pub active_nodes: u32,
    pub total_stake: f64,
    pub total_rewards: f64,
    pub average_apy: f64,
    pub uptime: f64,
    pub network_participation: f64,
    pub blocks_proposed: u64,
    pub blocks_missed: u64,
    pub success_rate: f64,
}

impl Default for FleetMetrics {
    fn default() -> Self {
        Self {
            total_nodes: 12,
            active_nodes: 10,
            total_stake: 384.0,
            total_rewards: 2.45,
            average_apy: 5.2,
            uptime: 99.8,
            network_participation: 100.0,
            blocks_proposed: 8640,
            blocks_missed: 12,
            success_rate: 99.86,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Syncing,
}

/// Per-node gauges, refreshed by a bounded random walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveMetrics {
    pub cpu: u32,
    pub memory: u32,
    pub storage: u32,
    pub network_in: u32,
    pub network_out: u32,
    pub uptime: String,
    pub peers: u32,
    pub sync_status: SyncStatus,
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self {
            cpu: 45,
            memory: 62,
            storage: 35,
            network_in: 75,
            network_out: 45,
            uptime: "15d 7h 32m".to_string(),
            peers: 25,
            sync_status: SyncStatus::Synced,
        }
    }
}

fn nudge(value: u32, up: bool, low: u32, high: u32) -> u32 {
    let next = if up { value + 1 } else { value.saturating_sub(1) };
    next.clamp(low, high)
}

impl LiveMetrics {
    /// Advance one tick. `since` recomputes uptime when a node is connected.
    pub fn step(&mut self, rng: &mut dyn RngCore, since: Option<DateTime<Utc>>) {
        self.cpu = nudge(self.cpu, random::unit(rng) > 0.5, 20, 80);
        self.memory = nudge(self.memory, random::unit(rng) > 0.5, 30, 70);
        self.storage = nudge(self.storage, random::unit(rng) > 0.7, 25, 45);
        self.network_in = (random::unit(rng) * 100.0) as u32 + 50;
        self.network_out = (random::unit(rng) * 100.0) as u32 + 30;
        if let Some(since) = since {
            self.uptime = format_uptime(since, Utc::now());
        }
        self.peers = (random::unit(rng) * 50.0) as u32 + 20;
        self.sync_status = if random::unit(rng) > 0.1 {
            SyncStatus::Synced
        } else {
            SyncStatus::Syncing
        };
    }
}

/// `{days}d {hours}h {minutes}m` between `since` and `now`.
pub fn format_uptime(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - since).num_minutes().max(0);
    format!("{}d {}h {}m", minutes / (24 * 60), (minutes / 60) % 24, minutes % 60)
}

/// Periodic deadline for metric refreshes. Stopped means it never fires.
#[derive(Debug)]
pub struct MetricsTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl MetricsTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        log::debug!("metrics ticker started ({:?})", self.interval);
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        if self.next_due.take().is_some() {
            log::debug!("metrics ticker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// True when a tick is due; the next deadline is scheduled from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
