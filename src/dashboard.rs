use crate::catalog::{self, CatalogCommand};
use crate::config::Config;
use crate::connection::{
    self, Attempt, AttemptKind, ConnectionConfig, ConnectionError, ConnectionSimulator, Outcome,
};
use crate::metrics::{FleetMetrics, LiveMetrics, MetricsTicker};
use crate::node::Node;
use crate::random::Entropy;
use crate::record::{ExecutedCommand, RecordWindow};
use crate::simulator::{OutputSimulator, Resolution, SessionView};
use crate::terminal::{LineDiscipline, Ticket};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("not connected to a validator node")]
    NotConnected,
    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,
    #[error("unknown command id '{0}'")]
    UnknownCommand(String),
    #[error("'{0}' needs confirmation before it runs")]
    ConfirmationRequired(String),
    #[error("'{0}' is still running")]
    Busy(String),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected { node: Node, config: ConnectionConfig },
    Failed(Outcome),
}

/// A catalog command on its way back from the (simulated) node.
#[derive(Debug, Clone)]
pub struct PanelRun {
    pub command: &'static CatalogCommand,
    pub record: ExecutedCommand,
    pub resolution: Resolution,
}

/// Terminal input waiting for its output.
#[derive(Debug, Clone)]
pub struct TerminalRun {
    pub ticket: Ticket,
    pub resolution: Resolution,
}

/// Single owner of session state. Panel and terminal commands are gated on
/// the connection status here.
pub struct Dashboard {
    rng: Entropy,
    simulator: OutputSimulator,
    connector: ConnectionSimulator,
    state: ConnectionState,
    terminal: LineDiscipline,
    results: RecordWindow,
    running_panel: Option<&'static str>,
    fleet: FleetMetrics,
    live: LiveMetrics,
    ticker: MetricsTicker,
    sequence: u64,
}

impl Dashboard {
    pub fn new(config: &Config, rng: Entropy) -> Self {
        Self {
            rng,
            simulator: OutputSimulator::new(config.simulation.clone()),
            connector: ConnectionSimulator::new(config.connection.clone(), config.simulation.no_delay),
            state: ConnectionState::Disconnected,
            terminal: LineDiscipline::new(),
            results: RecordWindow::new(config.display.max_results),
            running_panel: None,
            fleet: FleetMetrics::default(),
            live: LiveMetrics::default(),
            ticker: MetricsTicker::new(Duration::from_secs(config.display.metrics_interval_secs.max(1))),
            sequence: 0,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    pub fn node(&self) -> Option<&Node> {
        match &self.state {
            ConnectionState::Connected { node, .. } => Some(node),
            _ => None,
        }
    }

    pub fn connection_config(&self) -> Option<&ConnectionConfig> {
        match &self.state {
            ConnectionState::Connected { config, .. } => Some(config),
            _ => None,
        }
    }

    pub fn default_config_for(&self, node: &Node) -> ConnectionConfig {
        ConnectionConfig::for_node(node, self.connector.defaults())
    }

    pub fn generate_ssh_key(&mut self) -> String {
        connection::generate_ssh_key(&mut self.rng)
    }

    /// Draw the handshake outcome. A full connect moves the state to
    /// connecting until `finish_connect` delivers it.
    pub fn begin_connect(
        &mut self,
        node: &Node,
        config: &ConnectionConfig,
        kind: AttemptKind,
    ) -> Result<Attempt, DashboardError> {
        if self.state == ConnectionState::Connecting {
            return Err(DashboardError::AlreadyConnecting);
        }
        let attempt = self.connector.attempt(node, config, kind, &mut self.rng)?;
        if kind == AttemptKind::Connect {
            self.state = ConnectionState::Connecting;
        }
        Ok(attempt)
    }

    pub fn finish_connect(&mut self, node: Node, config: ConnectionConfig, attempt: Attempt, now: Instant) {
        if attempt.kind != AttemptKind::Connect {
            return;
        }
        if attempt.outcome.is_success() {
            log::info!("connected to {} ({})", node.name, config.endpoint());
            self.live.step(&mut self.rng, Some(node.created_at));
            self.state = ConnectionState::Connected { node, config };
            self.ticker.start(now);
        } else {
            log::warn!("connection to {} failed: {:?}", node.name, attempt.outcome);
            self.ticker.stop();
            self.state = ConnectionState::Failed(attempt.outcome);
        }
    }

    /// Leave the node: terminal and panel results go with it.
    pub fn disconnect(&mut self) {
        if let Some(node) = self.node() {
            log::info!("disconnected from {}", node.name);
        }
        self.ticker.stop();
        self.state = ConnectionState::Disconnected;
        self.terminal = LineDiscipline::new();
        self.results.clear();
        self.running_panel = None;
    }

    pub fn terminal(&self) -> &LineDiscipline {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut LineDiscipline {
        &mut self.terminal
    }

    pub fn results(&self) -> &RecordWindow {
        &self.results
    }

    pub fn running_panel(&self) -> Option<&'static str> {
        self.running_panel
    }

    pub fn fleet(&self) -> &FleetMetrics {
        &self.fleet
    }

    pub fn live(&self) -> &LiveMetrics {
        &self.live
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn next_tick(&self) -> Option<Instant> {
        self.ticker.next_due()
    }

    /// Refresh live metrics if the ticker is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.ticker.poll(now) {
            return false;
        }
        let since = self.node().map(|n| n.created_at);
        self.live.step(&mut self.rng, since);
        true
    }

    /// One refresh regardless of the ticker, for the standalone overview.
    pub fn refresh_live(&mut self) {
        let since = self.node().map(|n| n.created_at);
        self.live.step(&mut self.rng, since);
    }

    /// Start a catalog command from the control panel.
    pub fn run_catalog_command(&mut self, id: &str, confirmed: bool) -> Result<PanelRun, DashboardError> {
        if !self.is_connected() {
            return Err(DashboardError::NotConnected);
        }
        let command = catalog::lookup(id).ok_or_else(|| DashboardError::UnknownCommand(id.to_string()))?;
        if let Some(busy) = self.running_panel {
            return Err(DashboardError::Busy(busy.to_string()));
        }
        if command.requires_confirmation && !confirmed {
            return Err(DashboardError::ConfirmationRequired(command.id.to_string()));
        }

        self.sequence += 1;
        let record = ExecutedCommand::start(command.command, self.sequence);
        let resolution = self.simulator.simulate_panel(command, &mut self.rng);
        self.running_panel = Some(command.id);
        Ok(PanelRun {
            command,
            record,
            resolution,
        })
    }

    /// Deliver a panel result: newest first, oldest beyond the cap dropped.
    pub fn finish_panel(&mut self, run: PanelRun, elapsed: Duration) -> Option<&ExecutedCommand> {
        if self.running_panel == Some(run.command.id) {
            self.running_panel = None;
        }
        if !self.is_connected() {
            log::debug!("dropping result of '{}' after disconnect", run.command.id);
            return None;
        }
        let PanelRun { mut record, resolution, .. } = run;
        record.complete(resolution.output, resolution.status, elapsed);
        self.results.push_front(record);
        log::debug!("{} panel result(s) kept", self.results.len());
        self.results.get(0)
    }

    /// Enter in the terminal. `Ok(None)` when there was nothing to run.
    pub fn terminal_submit(&mut self) -> Result<Option<TerminalRun>, DashboardError> {
        if !self.is_connected() {
            return Err(DashboardError::NotConnected);
        }
        let Some(ticket) = self.terminal.submit() else {
            return Ok(None);
        };
        // The entry for this submission is already pushed; rules see only earlier ones.
        let history = self.terminal.history();
        let view = SessionView {
            cwd: self.simulator.cwd(),
            history: &history[..history.len().saturating_sub(1)],
        };
        let resolution = self.simulator.simulate(&ticket.command, &view, &mut self.rng);
        Ok(Some(TerminalRun { ticket, resolution }))
    }

    pub fn terminal_complete(&mut self, run: TerminalRun, elapsed: Duration) {
        self.terminal.complete(&run.ticket, run.resolution, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStatus;
    use crate::record::CommandStatus;
    use rand::rngs::mock::StepRng;

    fn dashboard_with(rng: StepRng) -> Dashboard {
        Dashboard::new(&Config::default(), Box::new(rng))
    }

    fn connected(rng: StepRng) -> Dashboard {
        let mut dash = dashboard_with(rng);
        let node = Node::demo();
        let config = dash.default_config_for(&node);
        let attempt = Attempt {
            kind: AttemptKind::Connect,
            delay: Duration::ZERO,
            outcome: Outcome::Success,
        };
        dash.finish_connect(node, config, attempt, Instant::now());
        dash
    }

    #[test]
    fn failing_draw_leaves_disconnected() {
        let mut dash = dashboard_with(StepRng::new(0, 0));
        let node = Node::demo();
        let config = dash.default_config_for(&node);
        let attempt = dash.begin_connect(&node, &config, AttemptKind::Connect).unwrap();
        assert_eq!(dash.state(), &ConnectionState::Connecting);
        assert_eq!(
            dash.begin_connect(&node, &config, AttemptKind::Connect),
            Err(DashboardError::AlreadyConnecting)
        );

        dash.finish_connect(node, config, attempt, Instant::now());
        assert!(!dash.is_connected());
        assert_eq!(dash.state(), &ConnectionState::Failed(Outcome::Unreachable));
        assert!(!dash.ticker_running());
    }

    #[test]
    fn successful_connect_starts_ticker() {
        let mut dash = dashboard_with(StepRng::new(u64::MAX, 0));
        let node = Node::demo();
        let config = dash.default_config_for(&node);
        let attempt = dash.begin_connect(&node, &config, AttemptKind::Connect).unwrap();
        let t0 = Instant::now();
        dash.finish_connect(node.clone(), config, attempt, t0);

        assert!(dash.is_connected());
        assert_eq!(dash.node(), Some(&node));
        assert!(dash.ticker_running());
        assert!(!dash.tick(t0 + Duration::from_secs(1)));
        assert!(dash.tick(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn test_attempt_does_not_change_state() {
        let mut dash = dashboard_with(StepRng::new(u64::MAX, 0));
        let node = Node::demo();
        let config = dash.default_config_for(&node);
        let attempt = dash.begin_connect(&node, &config, AttemptKind::Test).unwrap();
        assert!(attempt.outcome.is_success());
        dash.finish_connect(node, config, attempt, Instant::now());
        assert_eq!(dash.state(), &ConnectionState::Disconnected);
    }

    #[test]
    fn stopped_node_cannot_connect() {
        let mut dash = dashboard_with(StepRng::new(u64::MAX, 0));
        let mut node = Node::demo();
        node.status = NodeStatus::Stopped;
        let config = dash.default_config_for(&node);
        let attempt = dash.begin_connect(&node, &config, AttemptKind::Connect).unwrap();
        dash.finish_connect(node, config, attempt, Instant::now());
        assert_eq!(dash.state(), &ConnectionState::Failed(Outcome::NodeNotActive(NodeStatus::Stopped)));
    }

    #[test]
    fn commands_are_gated_on_connection() {
        let mut dash = dashboard_with(StepRng::new(u64::MAX, 0));
        assert_eq!(
            dash.run_catalog_command("system-status", false).unwrap_err(),
            DashboardError::NotConnected
        );
        dash.terminal_mut().set_input("pwd");
        assert_eq!(dash.terminal_submit().unwrap_err(), DashboardError::NotConnected);
        assert!(dash.terminal().history().is_empty());
    }

    #[test]
    fn panel_run_flow() {
        let mut dash = connected(StepRng::new(u64::MAX, 0));
        let run = dash.run_catalog_command("validator-status", false).unwrap();
        assert!(run.record.is_running());
        assert_eq!(dash.running_panel(), Some("validator-status"));
        assert!(matches!(
            dash.run_catalog_command("check-disk", false),
            Err(DashboardError::Busy(_))
        ));

        let record = dash.finish_panel(run, Duration::from_millis(1200)).unwrap();
        assert_eq!(record.status, CommandStatus::Success);
        assert_eq!(record.command, "validator-cli status");
        assert_eq!(dash.running_panel(), None);
    }

    #[test]
    fn confirmation_and_unknown_ids() {
        let mut dash = connected(StepRng::new(u64::MAX, 0));
        assert_eq!(
            dash.run_catalog_command("restart-validator", false).unwrap_err(),
            DashboardError::ConfirmationRequired("restart-validator".into())
        );
        assert!(dash.run_catalog_command("restart-validator", true).is_ok());
        let mut dash = connected(StepRng::new(u64::MAX, 0));
        assert_eq!(
            dash.run_catalog_command("nope", true).unwrap_err(),
            DashboardError::UnknownCommand("nope".into())
        );
    }

    #[test]
    fn panel_results_cap_at_ten() {
        let mut dash = connected(StepRng::new(u64::MAX, 0));
        for _ in 0..11 {
            let run = dash.run_catalog_command("check-disk", false).unwrap();
            dash.finish_panel(run, Duration::ZERO);
        }
        assert_eq!(dash.results().len(), 10);
        let first_ids: Vec<_> = dash.results().iter().map(|r| r.id.clone()).collect();
        assert!(first_ids[0].ends_with("_11"));
        assert!(first_ids[9].ends_with("_2"));
    }

    #[test]
    fn forced_low_draw_fails_panel_command() {
        let mut dash = connected(StepRng::new(0, 0));
        let run = dash.run_catalog_command("check-disk", false).unwrap();
        let record = dash.finish_panel(run, Duration::ZERO).unwrap();
        assert_eq!(record.status, CommandStatus::Error);
    }

    #[test]
    fn terminal_through_dashboard() {
        let mut dash = connected(StepRng::new(0, 0));
        dash.terminal_mut().set_input("pwd");
        let run = dash.terminal_submit().unwrap().unwrap();
        assert_eq!(run.resolution.output, "/var/lib/validator");
        dash.terminal_complete(run, Duration::from_millis(500));
        assert_eq!(dash.terminal().records()[0].output, "/var/lib/validator");

        dash.terminal_mut().set_input("history");
        let run = dash.terminal_submit().unwrap().unwrap();
        assert_eq!(run.resolution.output.lines().count(), 1);
        assert!(run.resolution.output.ends_with("pwd"));

        assert!(dash.terminal_submit().unwrap().is_none());
    }

    #[test]
    fn history_lists_only_earlier_commands() {
        let mut dash = connected(StepRng::new(0, 0));
        dash.terminal_mut().set_input("history");
        let run = dash.terminal_submit().unwrap().unwrap();
        assert_eq!(run.resolution.output, "");
        assert_eq!(run.resolution.status, CommandStatus::Success);
        dash.terminal_complete(run, Duration::ZERO);

        dash.terminal_mut().set_input("history");
        let run = dash.terminal_submit().unwrap().unwrap();
        assert_eq!(run.resolution.output.lines().count(), 1);
        assert!(run.resolution.output.ends_with("history"));
        assert_eq!(dash.terminal().history().len(), 2);
    }

    #[test]
    fn disconnect_resets_session() {
        let mut dash = connected(StepRng::new(u64::MAX, 0));
        let run = dash.run_catalog_command("check-disk", false).unwrap();
        dash.terminal_mut().set_input("ls");
        let term = dash.terminal_submit().unwrap().unwrap();
        dash.terminal_complete(term, Duration::ZERO);

        dash.disconnect();
        assert!(!dash.is_connected());
        assert!(!dash.ticker_running());
        assert!(dash.terminal().history().is_empty());
        assert!(dash.finish_panel(run, Duration::ZERO).is_none());
        assert!(dash.results().is_empty());
        assert!(!dash.tick(Instant::now() + Duration::from_secs(600)));
    }
}
