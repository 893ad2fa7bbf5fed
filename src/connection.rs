use crate::config::ConnectionDefaults;
use crate::node::{Node, NodeStatus};
use crate::random;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const SSH_KEY_PREFIX: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Ssh,
    Api,
    Rpc,
}

impl Method {
    pub fn default_port(self) -> u16 {
        match self {
            Method::Ssh => 22,
            Method::Api => 8080,
            Method::Rpc => 8545,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Method::Ssh => "SSH",
            Method::Api => "REST API",
            Method::Rpc => "JSON-RPC",
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ssh" => Ok(Method::Ssh),
            "api" | "rest" => Ok(Method::Api),
            "rpc" | "json-rpc" => Ok(Method::Rpc),
            other => Err(format!("unknown connection method '{other}' (ssh, api, rpc)")),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    None,
    Password(String),
    PrivateKey(String),
    ApiKey(String),
}

impl Credentials {
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::None => "none",
            Credentials::Password(_) => "password",
            Credentials::PrivateKey(_) => "private key",
            Credentials::ApiKey(_) => "api key",
        }
    }
}

/// Connection form contents. Held in memory only; credentials are never
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionConfig {
    pub method: Method,
    pub host: String,
    // None when the typed port was not a number
    pub port: Option<u16>,
    pub username: String,
    #[serde(skip)]
    pub credentials: Credentials,
    pub use_tls: bool,
    // Collected, never enforced
    pub timeout_secs: Option<u32>,
}

impl ConnectionConfig {
    pub fn for_node(node: &Node, defaults: &ConnectionDefaults) -> Self {
        Self {
            method: Method::Ssh,
            host: node.address.clone(),
            port: Some(Method::Ssh.default_port()),
            username: defaults.username.clone(),
            credentials: Credentials::None,
            use_tls: defaults.use_tls,
            timeout_secs: Some(defaults.timeout_secs),
        }
    }

    /// Switching method also moves the port to that method's default.
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
        self.port = Some(method.default_port());
    }

    pub fn endpoint(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => format!("{}:NaN", self.host),
        }
    }
}

/// Numeric form fields are not validated: junk becomes `None`.
pub fn lenient_number<T: FromStr>(field: &str, text: &str) -> Option<T> {
    let parsed = text.trim().parse().ok();
    if parsed.is_none() {
        log::debug!("{field} '{text}' is not a number; keeping it unset");
    }
    parsed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    /// "Test connection" button.
    Test,
    /// Full connect that hands the node to the dashboard.
    Connect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unreachable,
    NodeNotActive(NodeStatus),
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// A handshake whose outcome is delivered after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub kind: AttemptKind,
    pub delay: Duration,
    pub outcome: Outcome,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("a host or IP address is required")]
    MissingHost,
}

/// No transport is ever opened: an attempt is a delay plus a weighted draw.
pub struct ConnectionSimulator {
    defaults: ConnectionDefaults,
    no_delay: bool,
}

impl ConnectionSimulator {
    pub fn new(defaults: ConnectionDefaults, no_delay: bool) -> Self {
        Self { defaults, no_delay }
    }

    pub fn defaults(&self) -> &ConnectionDefaults {
        &self.defaults
    }

    pub fn attempt(
        &self,
        node: &Node,
        config: &ConnectionConfig,
        kind: AttemptKind,
        rng: &mut dyn RngCore,
    ) -> Result<Attempt, ConnectionError> {
        if config.host.trim().is_empty() {
            return Err(ConnectionError::MissingHost);
        }

        let (delay_ms, success_rate) = match kind {
            AttemptKind::Test => (self.defaults.test_delay_ms, self.defaults.test_success_rate),
            AttemptKind::Connect => (self.defaults.connect_delay_ms, self.defaults.connect_success_rate),
        };
        let delay = if self.no_delay {
            Duration::ZERO
        } else {
            Duration::from_millis(delay_ms)
        };

        let draw = random::unit(rng);
        let outcome = if kind == AttemptKind::Connect && node.status != NodeStatus::Active {
            Outcome::NodeNotActive(node.status)
        } else if draw > 1.0 - success_rate {
            Outcome::Success
        } else {
            Outcome::Unreachable
        };
        log::info!(
            "{:?} attempt to {} via {} ({}): {:?}",
            kind,
            config.endpoint(),
            config.method,
            config.credentials.kind(),
            outcome
        );
        Ok(Attempt { kind, delay, outcome })
    }
}

/// A throwaway key for the private-key field.
pub fn generate_ssh_key(rng: &mut dyn RngCore) -> String {
    let body: String = rng
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();
    format!("{SSH_KEY_PREFIX}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn sim() -> ConnectionSimulator {
        ConnectionSimulator::new(ConnectionDefaults::default(), false)
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig::for_node(&Node::demo(), &ConnectionDefaults::default())
    }

    #[test]
    fn forced_low_draw_fails() {
        let attempt = sim()
            .attempt(&Node::demo(), &config(), AttemptKind::Connect, &mut StepRng::new(0, 0))
            .unwrap();
        assert_eq!(attempt.outcome, Outcome::Unreachable);
        assert_eq!(attempt.delay, Duration::from_millis(2000));
    }

    #[test]
    fn forced_high_draw_succeeds() {
        let mut rng = StepRng::new(u64::MAX, 0);
        let test = sim().attempt(&Node::demo(), &config(), AttemptKind::Test, &mut rng).unwrap();
        assert!(test.outcome.is_success());
        assert_eq!(test.delay, Duration::from_millis(1500));
    }

    #[test]
    fn inactive_node_never_connects() {
        let mut node = Node::demo();
        node.status = NodeStatus::Stopped;
        let attempt = sim()
            .attempt(&node, &config(), AttemptKind::Connect, &mut StepRng::new(u64::MAX, 0))
            .unwrap();
        assert_eq!(attempt.outcome, Outcome::NodeNotActive(NodeStatus::Stopped));
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut cfg = config();
        cfg.host = "  ".into();
        let err = sim()
            .attempt(&Node::demo(), &cfg, AttemptKind::Test, &mut StepRng::new(0, 0))
            .unwrap_err();
        assert_eq!(err, ConnectionError::MissingHost);
    }

    #[test]
    fn no_delay_skips_wait() {
        let fast = ConnectionSimulator::new(ConnectionDefaults::default(), true);
        let attempt = fast
            .attempt(&Node::demo(), &config(), AttemptKind::Connect, &mut StepRng::new(0, 0))
            .unwrap();
        assert_eq!(attempt.delay, Duration::ZERO);
    }

    #[test]
    fn method_switch_moves_port() {
        let mut cfg = config();
        assert_eq!(cfg.port, Some(22));
        cfg.set_method(Method::Rpc);
        assert_eq!(cfg.port, Some(8545));
        cfg.set_method("api".parse().unwrap());
        assert_eq!(cfg.port, Some(8080));
        assert!("telnet".parse::<Method>().is_err());
    }

    #[test]
    fn junk_numbers_become_unset() {
        assert_eq!(lenient_number::<u16>("port", "2222"), Some(2222));
        assert_eq!(lenient_number::<u16>("port", "twenty"), None);
        assert_eq!(lenient_number::<u32>("timeout", ""), None);
        let mut cfg = config();
        cfg.port = None;
        assert!(cfg.endpoint().ends_with(":NaN"));
    }

    #[test]
    fn credentials_stay_out_of_json() {
        let mut cfg = config();
        cfg.credentials = Credentials::Password("hunter2".into());
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("\"method\":\"ssh\""));
    }

    #[test]
    fn generated_keys_look_like_rsa() {
        let mut rng = random::entropy(Some(3));
        let key = generate_ssh_key(&mut rng);
        assert!(key.starts_with(SSH_KEY_PREFIX));
        assert_eq!(key.len(), SSH_KEY_PREFIX.len() + 48);
        assert!(key[SSH_KEY_PREFIX.len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
