use crate::catalog::CatalogCommand;
use crate::dashboard::ConnectionState;
use crate::connection::Outcome;
use crate::i18n::I18n;
use crate::metrics::{FleetMetrics, LiveMetrics, SyncStatus};
use crate::record::{CommandStatus, ExecutedCommand};
use chrono::Local;
use colored::*;
use unicode_width::UnicodeWidthStr;

/// Pad to a display width; wide glyphs count double.
pub fn pad(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - w))
    }
}

pub fn catalog_table(commands: &[&CatalogCommand], i18n: &I18n) -> String {
    if commands.is_empty() {
        return format!("{}\n", i18n.t("no_commands_match").yellow());
    }
    let id_width = commands.iter().map(|c| c.id.width()).max().unwrap_or(0);
    let name_width = commands.iter().map(|c| c.name.width()).max().unwrap_or(0);

    let mut out = String::new();
    let mut current = None;
    for cmd in commands {
        if current != Some(cmd.category) {
            current = Some(cmd.category);
            out.push_str(&format!("{}\n", cmd.category.as_str().to_uppercase().bold().cyan()));
        }
        let marker = if cmd.requires_confirmation { "!".red().bold() } else { " ".normal() };
        out.push_str(&format!(
            "  {} {}  {}  {}\n",
            marker,
            pad(cmd.id, id_width).green(),
            pad(cmd.name, name_width),
            cmd.command.dimmed()
        ));
    }
    out.push_str(&format!("\n{}\n", i18n.t_format("commands_total", &[&commands.len().to_string()])));
    out
}

pub fn command_details(cmd: &CatalogCommand, i18n: &I18n) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", cmd.name.bold(), cmd.id.green()));
    out.push_str(&format!("{}\n\n", cmd.description));
    out.push_str(&format!("{} {}\n", i18n.t("label_category").yellow(), cmd.category));
    out.push_str(&format!("{} {}\n", i18n.t("label_command").yellow(), cmd.command.cyan()));
    out.push_str(&format!("{} {}\n", i18n.t("label_usage").yellow(), cmd.usage));
    if cmd.requires_confirmation {
        out.push_str(&format!("{}\n", i18n.t("requires_confirmation").red().bold()));
    }

    out.push_str(&format!("\n{}\n", i18n.t("label_examples").yellow()));
    for example in cmd.examples {
        out.push_str(&format!("  $ {example}\n"));
    }

    if !cmd.parameters.is_empty() {
        out.push_str(&format!("\n{}\n", i18n.t("label_parameters").yellow()));
        for p in cmd.parameters {
            let mut line = format!("  {} <{}>  {}", p.name.green(), p.kind.as_str(), p.description);
            if p.required {
                line.push_str(&format!(" [{}]", i18n.t("required")));
            }
            if let Some(default) = p.default {
                line.push_str(&format!(" [{}: {}]", i18n.t("default"), default));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    if let Some(sample) = cmd.output {
        out.push_str(&format!("\n{}\n", i18n.t("label_sample_output").yellow()));
        for line in sample.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }

    if !cmd.risks.is_empty() {
        out.push_str(&format!("\n{}\n", i18n.t("label_risks").red().bold()));
        for risk in cmd.risks {
            out.push_str(&format!("  - {risk}\n"));
        }
    }

    if !cmd.tips.is_empty() {
        out.push_str(&format!("\n{}\n", i18n.t("label_tips").green()));
        for tip in cmd.tips {
            out.push_str(&format!("  - {tip}\n"));
        }
    }
    out
}

pub fn status_text(status: CommandStatus, i18n: &I18n) -> ColoredString {
    match status {
        CommandStatus::Running => i18n.t("status_running").yellow(),
        CommandStatus::Success => i18n.t("status_success").green(),
        CommandStatus::Error => i18n.t("status_error").red(),
    }
}

/// `$ command`, its output indented, then time / duration / status.
pub fn record_block(record: &ExecutedCommand, i18n: &I18n) -> String {
    let mut out = format!("{} {}\n", "$".blue(), record.command);
    if record.is_running() {
        out.push_str(&format!("    {}\n", status_text(record.status, i18n)));
        return out;
    }
    for line in record.output.lines() {
        out.push_str(&format!("    {line}\n"));
    }
    let local = record.timestamp.with_timezone(&Local);
    let mut meta = format!("{}", local.format("%H:%M:%S"));
    if let Some(ms) = record.execution_ms {
        meta.push_str(&format!("  {}", i18n.t_format("execution_time", &[&ms.to_string()])));
    }
    out.push_str(&format!("    {}  {}\n", meta.dimmed(), status_text(record.status, i18n)));
    out
}

fn bar(percent: u32) -> String {
    let filled = (percent.min(100) / 5) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

pub fn fleet_summary(fleet: &FleetMetrics, i18n: &I18n) -> String {
    let mut out = format!("{}\n", i18n.t("fleet_title").bold().cyan());
    let rows = [
        (i18n.t("fleet_nodes"), format!("{}/{}", fleet.active_nodes, fleet.total_nodes)),
        (i18n.t("fleet_stake"), format!("{}", fleet.total_stake)),
        (i18n.t("fleet_rewards"), format!("{}", fleet.total_rewards)),
        (i18n.t("fleet_apy"), format!("{}%", fleet.average_apy)),
        (i18n.t("fleet_uptime"), format!("{}%", fleet.uptime)),
        (i18n.t("fleet_participation"), format!("{}%", fleet.network_participation)),
        (i18n.t("fleet_blocks"), format!("{} / {}", fleet.blocks_proposed, fleet.blocks_missed)),
        (i18n.t("fleet_success"), format!("{}%", fleet.success_rate)),
    ];
    let width = rows.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    for (label, value) in rows {
        out.push_str(&format!("  {}  {}\n", pad(&label, width), value.green()));
    }
    out
}

pub fn live_summary(live: &LiveMetrics, i18n: &I18n) -> String {
    let sync = match live.sync_status {
        SyncStatus::Synced => i18n.t("sync_synced").green(),
        SyncStatus::Syncing => i18n.t("sync_syncing").yellow(),
    };
    format!(
        "{}\n  CPU     {} {:>3}%\n  MEM     {} {:>3}%\n  DISK    {} {:>3}%\n  {}\n",
        i18n.t("live_title").bold().cyan(),
        bar(live.cpu),
        live.cpu,
        bar(live.memory),
        live.memory,
        bar(live.storage),
        live.storage,
        i18n.t_format(
            "live_network",
            &[
                &live.network_in.to_string(),
                &live.network_out.to_string(),
                &live.peers.to_string(),
                &live.uptime,
            ]
        ) + "  " + &sync.to_string(),
    )
}

pub fn connection_banner(state: &ConnectionState, i18n: &I18n) -> String {
    match state {
        ConnectionState::Disconnected => format!("{} {}", "○".red(), i18n.t("state_disconnected")),
        ConnectionState::Connecting => format!("{} {}", "◌".yellow(), i18n.t("state_connecting")),
        ConnectionState::Connected { node, config } => format!(
            "{} {}",
            "●".green(),
            i18n.t_format("state_connected", &[&node.name, &config.endpoint(), config.method.label()])
        ),
        ConnectionState::Failed(outcome) => format!("{} {}", "✖".red(), failure_text(*outcome, i18n).red()),
    }
}

pub fn failure_text(outcome: Outcome, i18n: &I18n) -> String {
    match outcome {
        Outcome::Success => i18n.t("connection_ok"),
        Outcome::Unreachable => i18n.t("connection_failed"),
        Outcome::NodeNotActive(status) => i18n.t_format("node_not_active", &[status.as_str()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::Config;
    use crate::connection::AttemptKind;
    use crate::dashboard::Dashboard;
    use crate::node::{Node, NodeStatus};
    use crate::record::ExecutedCommand;
    use rand::rngs::mock::StepRng;
    use std::time::{Duration, Instant};

    fn en() -> I18n {
        colored::control::set_override(false);
        I18n::new("en")
    }

    #[test]
    fn pad_uses_display_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("状态", 6), "状态  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }

    #[test]
    fn table_groups_by_category() {
        let i18n = en();
        let text = catalog_table(&catalog::list(None, ""), &i18n);
        assert!(text.contains("SYSTEM"));
        assert!(text.contains("MAINTENANCE"));
        assert!(text.contains("firewall-status"));
        assert!(text.contains(&format!("{} commands", catalog::all().len())));
        assert!(catalog_table(&[], &i18n).contains("No commands match"));
    }

    #[test]
    fn details_include_every_section() {
        let i18n = en();
        let text = command_details(catalog::lookup("validator-logs").unwrap(), &i18n);
        assert!(text.contains("tail -n [lines] [log_file]"));
        assert!(text.contains("$ tail -f /var/log/validator.log"));
        assert!(text.contains("[default: 100]"));
        assert!(text.contains("Use -f flag for real-time monitoring"));

        let risky = command_details(catalog::lookup("backup-validator").unwrap(), &i18n);
        assert!(risky.contains("Ensure sufficient disk space"));
        assert!(risky.contains("Requires confirmation"));
    }

    #[test]
    fn record_block_shows_output_and_status() {
        let i18n = en();
        let mut record = ExecutedCommand::start("df -h", 1);
        assert!(record_block(&record, &i18n).contains("running"));
        record.complete("line one\nline two".into(), CommandStatus::Error, Duration::from_millis(812));
        let text = record_block(&record, &i18n);
        assert!(text.contains("$ df -h"));
        assert!(text.contains("    line two"));
        assert!(text.contains("812ms"));
        assert!(text.contains("error"));
    }

    #[test]
    fn metrics_render() {
        let i18n = en();
        assert!(fleet_summary(&FleetMetrics::default(), &i18n).contains("10/12"));
        let live = live_summary(&LiveMetrics::default(), &i18n);
        assert!(live.contains(" 45%"));
        assert!(live.contains("peers 25"));
        assert_eq!(bar(100), format!("[{}]", "#".repeat(20)));
    }

    fn connect(node: Node, rng: StepRng) -> Dashboard {
        let mut dash = Dashboard::new(&Config::default(), Box::new(rng));
        let config = dash.default_config_for(&node);
        let attempt = dash.begin_connect(&node, &config, AttemptKind::Connect).unwrap();
        dash.finish_connect(node, config, attempt, Instant::now());
        dash
    }

    #[test]
    fn failed_connect_shows_error_banner() {
        let i18n = en();
        let dash = connect(Node::demo(), StepRng::new(0, 0));
        assert!(!dash.is_connected());
        let banner = connection_banner(dash.state(), &i18n);
        assert!(banner.contains(&i18n.t("connection_failed")), "{banner}");
        assert!(banner.contains('✖'));
    }

    #[test]
    fn inactive_node_banner_names_status() {
        let i18n = en();
        let mut node = Node::demo();
        node.status = NodeStatus::Stopped;
        let dash = connect(node, StepRng::new(u64::MAX, 0));
        assert!(!dash.is_connected());
        let banner = connection_banner(dash.state(), &i18n);
        assert!(banner.contains("node is stopped, not active"), "{banner}");
        assert_eq!(
            failure_text(Outcome::NodeNotActive(NodeStatus::Stopped), &i18n),
            "Connection failed: node is stopped, not active"
        );
    }

    #[test]
    fn banner_follows_connection_state() {
        let i18n = en();
        let idle = Dashboard::new(&Config::default(), Box::new(StepRng::new(0, 0)));
        assert!(connection_banner(idle.state(), &i18n).contains("Disconnected"));

        let node = Node::demo();
        let name = node.name.clone();
        let dash = connect(node, StepRng::new(u64::MAX, 0));
        assert!(dash.is_connected());
        let banner = connection_banner(dash.state(), &i18n);
        assert!(banner.contains(&format!("Connected to {name}")), "{banner}");
    }
}
