use crate::catalog::{self, CatalogCommand};
use crate::config::SimulationConfig;
use crate::random;
use crate::record::{CommandStatus, HistoryEntry};
use chrono::Local;
use rand::RngCore;
use std::time::Duration;

const LISTING: &str = "config.yaml
data/
logs/
keys/
validator
backup/
README.md";

const PS_AUX: &str = "USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
root      1234  2.1  3.2 1234567 256000 ?        Ssl  Jan15   15:30 /usr/bin/validator --config=/etc/validator/config.yaml
root      1235  0.1  0.5  123456  45000 ?        Ss   Jan15    0:15 /usr/sbin/sshd -D
root      1236  0.0  0.3  123456  25000 ?        Ss   Jan15    0:05 /usr/sbin/cron";

const DF: &str = "Filesystem      Size  Used Avail Use% Mounted on
/dev/sda1       100G   45G   50G  47% /
/dev/sdb1       500G  120G  355G  25% /var/lib/validator
tmpfs           8.0G     0  8.0G   0% /dev/shm";

const FREE: &str = "              total        used        free      shared  buff/cache   available
Mem:           8.0G        2.5G        4.2G        256M        1.3G        5.1G
Swap:          2.0G          0B        2.0G";

const TOP: &str = "top - 10:30:15 up 15 days, 7:32, 1 user, load average: 0.52, 0.48, 0.45
Tasks: 125 total, 1 running, 124 sleeping, 0 stopped, 0 zombie
%Cpu(s):  2.1 us,  0.8 sy,  0.0 ni, 97.0 id,  0.1 wa,  0.0 hi,  0.0 si,  0.0 st
MiB Mem :   8192.0 total,   4200.0 free,   2560.0 used,   1432.0 buff/cache
MiB Swap:   2048.0 total,   2048.0 free,      0.0 used.   5400.0 avail Mem

  PID USER      PR  NI    VIRT    RES    SHR S  %CPU  %MEM     TIME+ COMMAND
 1234 root      20   0 1234567 256000  45000 S   2.1   3.2  15:30.45 validator
 1235 root      20   0  123456  45000  12000 S   0.1   0.5   0:15.23 sshd";

const NETSTAT: &str = "Proto Recv-Q Send-Q Local Address           Foreign Address         State       PID/Program name
tcp        0      0 0.0.0.0:22              0.0.0.0:*               LISTEN      1235/sshd
tcp        0      0 0.0.0.0:30303           0.0.0.0:*               LISTEN      1234/validator
tcp        0      0 0.0.0.0:8545            0.0.0.0:*               LISTEN      1234/validator
tcp        0      0 10.0.0.5:30303          10.0.0.10:45678         ESTABLISHED 1234/validator";

const SERVICE_LOG: &str = "Jan 15 10:30:15 node-001 validator[1234]: INFO: Validator started successfully
Jan 15 10:30:16 node-001 validator[1234]: INFO: Connected to network peers: 25
Jan 15 10:30:17 node-001 validator[1234]: INFO: Syncing blockchain data...";

const HELP: &str = "Available Commands:
==================
pwd                    - Show current directory
ls, dir               - List files and directories
ps aux                - Show running processes
df -h                 - Show disk usage
free -h               - Show memory usage
top, htop             - Show system resources
netstat -tulpn        - Show network connections
systemctl status      - Show service status
validator-cli status  - Show validator status
clear                 - Clear terminal
help                  - Show this help
history               - Show command history

Navigation:
- Use arrow keys to navigate command history
- Ctrl+L to clear screen
- Tab for command completion";

/// What the shell knows about itself when a command resolves.
pub struct SessionView<'a> {
    pub cwd: &'a str,
    pub history: &'a [HistoryEntry],
}

pub type Responder = fn(&str, &SessionView<'_>) -> String;

#[derive(Clone, Copy)]
pub enum Response {
    Static(&'static str),
    Dynamic(Responder),
    /// Wipe the rendered output instead of printing anything.
    Clear,
}

/// One row of the rule table: any needle contained in the lower-cased input
/// selects the response.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub needles: &'static [&'static str],
    pub response: Response,
}

impl Rule {
    pub const fn fixed(name: &'static str, needles: &'static [&'static str], text: &'static str) -> Self {
        Self { name, needles, response: Response::Static(text) }
    }

    pub fn matches(&self, lowered: &str) -> bool {
        self.needles.iter().any(|n| lowered.contains(n))
    }
}

/// Terminal rules in priority order. First match wins.
pub fn terminal_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "pwd",
            needles: &["pwd"],
            response: Response::Dynamic(|_, view| view.cwd.to_string()),
        },
        Rule::fixed("listing", &["ls", "dir"], LISTING),
        Rule::fixed("processes", &["ps aux"], PS_AUX),
        Rule::fixed("disk", &["df -h"], DF),
        Rule::fixed("memory", &["free -h"], FREE),
        Rule::fixed("top", &["top", "htop"], TOP),
        Rule::fixed("sockets", &["netstat", "ss"], NETSTAT),
        Rule {
            name: "service",
            needles: &["systemctl status"],
            response: Response::Dynamic(|_, _| format!("{}\n\n{}", catalog::SYSTEMCTL_STATUS, SERVICE_LOG)),
        },
        Rule::fixed("validator", &["validator-cli status"], catalog::VALIDATOR_STATUS),
        Rule { name: "clear", needles: &["clear"], response: Response::Clear },
        Rule::fixed("help", &["help"], HELP),
        Rule {
            name: "history",
            needles: &["history"],
            response: Response::Dynamic(|_, view| format_history(view.history)),
        },
    ]
}

fn format_history(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let local = entry.timestamp.with_timezone(&Local);
            format!("{}  {}  {}", i + 1, local.format("%H:%M:%S"), entry.command)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of one simulated command.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub output: String,
    pub status: CommandStatus,
    pub clears_screen: bool,
    pub latency: Duration,
}

/// Canned command output. Nothing here sleeps; latency is returned with the
/// result and the caller decides when to deliver it.
pub struct OutputSimulator {
    rules: Vec<Rule>,
    config: SimulationConfig,
}

impl OutputSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rules(config, terminal_rules())
    }

    pub fn with_rules(config: SimulationConfig, rules: Vec<Rule>) -> Self {
        Self { rules, config }
    }

    pub fn cwd(&self) -> &str {
        &self.config.working_dir
    }

    /// Name of the rule that would answer `raw`, if any.
    #[cfg(test)]
    pub fn matching_rule(&self, raw: &str) -> Option<&'static str> {
        let lowered = raw.to_lowercase();
        self.rules.iter().find(|r| r.matches(&lowered)).map(|r| r.name)
    }

    /// Resolve text typed into the terminal.
    pub fn simulate(&self, raw: &str, view: &SessionView<'_>, rng: &mut dyn RngCore) -> Resolution {
        let (low, high) = self.config.terminal_latency_ms;
        let latency = self.delay(random::latency(rng, low, high));
        let lowered = raw.to_lowercase();

        let rule = self.rules.iter().find(|r| r.matches(&lowered));
        let (output, clears_screen) = match rule.map(|r| r.response) {
            Some(Response::Static(text)) => (text.to_string(), false),
            Some(Response::Dynamic(respond)) => (respond(raw, view), false),
            Some(Response::Clear) => (String::new(), true),
            None => (self.fallback(raw, rng), false),
        };
        if let Some(rule) = rule {
            log::debug!("'{raw}' answered by rule '{}'", rule.name);
        }

        Resolution {
            status: classify(&output),
            output,
            clears_screen,
            latency,
        }
    }

    /// Resolve a catalog command run from the control panel. On top of the
    /// content check, a fixed share of runs is marked failed.
    pub fn simulate_panel(&self, command: &CatalogCommand, rng: &mut dyn RngCore) -> Resolution {
        let (low, high) = self.config.panel_latency_ms;
        let latency = self.delay(random::latency(rng, low, high));
        let output = panel_output(command);

        let injected_failure = random::unit(rng) <= self.config.panel_failure_rate;
        if injected_failure {
            log::debug!("panel run of '{}' marked failed by draw", command.id);
        }
        let status = if injected_failure {
            CommandStatus::Error
        } else {
            classify(&output)
        };

        Resolution {
            output,
            status,
            clears_screen: false,
            latency,
        }
    }

    fn fallback(&self, raw: &str, rng: &mut dyn RngCore) -> String {
        if random::unit(rng) > self.config.not_found_threshold {
            let head = raw.split(' ').next().unwrap_or(raw);
            format!("Command not found: {head}\nTry 'help' for available commands.")
        } else {
            format!(
                "Command executed: {raw}\nOutput: This is a simulated response for demonstration purposes.\nTimestamp: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            )
        }
    }

    fn delay(&self, drawn: Duration) -> Duration {
        if self.config.no_delay {
            Duration::ZERO
        } else {
            drawn
        }
    }
}

/// Output mentioning `error` counts as a failed command.
pub fn classify(output: &str) -> CommandStatus {
    if output.contains("error") {
        CommandStatus::Error
    } else {
        CommandStatus::Success
    }
}

fn panel_output(command: &CatalogCommand) -> String {
    match command.id {
        "system-status" => {
            let since = Local::now().format("%a %Y-%m-%d %H:%M:%S");
            format!(
                "● validator.service - Validator Node Service
   Loaded: loaded (/etc/systemd/system/validator.service; enabled)
   Active: active (running) since {since}
   Main PID: 1234 (validator)
   Tasks: 15 (limit: 4915)
   Memory: 256.0M
   CGroup: /system.slice/validator.service
           └─1234 /usr/bin/validator --config=/etc/validator/config.yaml

{SERVICE_LOG}"
            )
        }
        "validator-status" => catalog::VALIDATOR_STATUS.to_string(),
        "check-disk" => DF.to_string(),
        "network-status" => NETSTAT.to_string(),
        _ => command
            .output
            .map(str::to_string)
            .unwrap_or_else(|| format!("Command executed successfully: {}", command.command)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn low() -> StepRng {
        StepRng::new(0, 0)
    }

    fn high() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn sim() -> OutputSimulator {
        OutputSimulator::new(SimulationConfig::default())
    }

    fn view(history: &[HistoryEntry]) -> SessionView<'_> {
        SessionView { cwd: "/var/lib/validator", history }
    }

    #[test]
    fn pwd_returns_working_directory() {
        let r = sim().simulate("pwd", &view(&[]), &mut low());
        assert_eq!(r.output, "/var/lib/validator");
        assert_eq!(r.status, CommandStatus::Success);
        assert!(!r.clears_screen);
    }

    #[test]
    fn systemctl_status_block() {
        let r = sim().simulate("systemctl status", &view(&[]), &mut low());
        assert!(r.output.lines().next().unwrap().starts_with("● validator.service"));
        assert!(r.output.lines().count() > 5);
    }

    #[test]
    fn matching_ignores_case() {
        let r = sim().simulate("PWD", &view(&[]), &mut low());
        assert_eq!(r.output, "/var/lib/validator");
        assert_eq!(sim().matching_rule("Validator-CLI Status"), Some("validator"));
    }

    #[test]
    fn first_rule_wins() {
        // contains both "ls" and "df -h"
        assert_eq!(sim().matching_rule("ls; df -h"), Some("listing"));
        assert_eq!(sim().matching_rule("htop"), Some("top"));
        assert_eq!(sim().matching_rule("ss -tulpn"), Some("sockets"));
        assert_eq!(sim().matching_rule("validator-cli metrics"), None);
    }

    #[test]
    fn clear_empties_and_flags() {
        let r = sim().simulate("clear", &view(&[]), &mut low());
        assert!(r.clears_screen);
        assert!(r.output.is_empty());
    }

    #[test]
    fn history_lists_entries_in_order() {
        let history = vec![HistoryEntry::now("pwd"), HistoryEntry::now("ls -la")];
        let r = sim().simulate("history", &view(&history), &mut low());
        let lines: Vec<&str> = r.output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1  ") && lines[0].ends_with("  pwd"));
        assert!(lines[1].starts_with("2  ") && lines[1].ends_with("  ls -la"));
    }

    #[test]
    fn unknown_input_falls_back_by_draw() {
        let ack = sim().simulate("Deploy Now", &view(&[]), &mut low());
        assert!(ack.output.starts_with("Command executed: Deploy Now\n"));
        assert_eq!(ack.status, CommandStatus::Success);

        let missing = sim().simulate("Deploy Now", &view(&[]), &mut high());
        assert_eq!(missing.output, "Command not found: Deploy\nTry 'help' for available commands.");
    }

    #[test]
    fn error_token_marks_failure() {
        assert_eq!(classify("fatal error: disk"), CommandStatus::Error);
        assert_eq!(classify("All good"), CommandStatus::Success);
        assert_eq!(classify("ERROR upper-case is content"), CommandStatus::Success);
    }

    #[test]
    fn terminal_latency_in_range_and_skippable() {
        let r = sim().simulate("pwd", &view(&[]), &mut low());
        assert_eq!(r.latency, Duration::from_millis(500));
        let r = sim().simulate("pwd", &view(&[]), &mut high());
        assert!(r.latency < Duration::from_millis(1500));

        let config = SimulationConfig { no_delay: true, ..SimulationConfig::default() };
        let r = OutputSimulator::new(config).simulate("pwd", &view(&[]), &mut high());
        assert_eq!(r.latency, Duration::ZERO);
    }

    #[test]
    fn panel_failure_is_injected_by_draw() {
        let cmd = catalog::lookup("validator-status").unwrap();
        let failed = sim().simulate_panel(cmd, &mut low());
        assert_eq!(failed.status, CommandStatus::Error);
        assert_eq!(failed.output, catalog::VALIDATOR_STATUS);
        assert_eq!(failed.latency, Duration::from_millis(1000));

        let ok = sim().simulate_panel(cmd, &mut high());
        assert_eq!(ok.status, CommandStatus::Success);
    }

    #[test]
    fn panel_output_falls_back_to_catalog_then_generic() {
        let firewall = catalog::lookup("firewall-status").unwrap();
        assert!(sim().simulate_panel(firewall, &mut high()).output.starts_with("Status: active"));

        let restart = catalog::lookup("restart-validator").unwrap();
        assert_eq!(
            sim().simulate_panel(restart, &mut high()).output,
            "Command executed successfully: sudo systemctl restart validator"
        );

        let status = catalog::lookup("system-status").unwrap();
        assert!(sim().simulate_panel(status, &mut high()).output.contains("Active: active (running) since"));
    }

    #[test]
    fn custom_rules_are_data() {
        let rules = vec![Rule::fixed("ping", &["ping"], "pong")];
        let sim = OutputSimulator::with_rules(SimulationConfig::default(), rules);
        assert_eq!(sim.simulate("PING peer", &view(&[]), &mut low()).output, "pong");
        assert_eq!(sim.matching_rule("pwd"), None);
    }
}
