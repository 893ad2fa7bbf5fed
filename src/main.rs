mod catalog;
mod clipboard;
mod config;
mod connection;
mod console;
mod dashboard;
mod fuzzy_matcher;
mod i18n;
mod metrics;
mod node;
mod random;
mod record;
mod simulator;
mod terminal;
mod transcript;
mod view;

use anyhow::{bail, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use catalog::Category;
use config::Config;
use connection::{lenient_number, AttemptKind, ConnectionConfig, Credentials, Method};
use console::Console;
use dashboard::{Dashboard, DashboardError};
use i18n::I18n;
use node::Node;

#[derive(Parser)]
#[command(name = "vdash", version)]
#[command(about = "Validator operations console with simulated node responses")]
struct Cli {
    /// Seed every random draw for a reproducible session
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Deliver simulated results without waiting
    #[arg(long, global = true)]
    no_delay: bool,
    /// More log output (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog commands
    Commands {
        /// system, validator, monitoring, security, advanced, maintenance or all
        #[arg(long, short)]
        category: Option<String>,
        /// Case-insensitive text to look for in name, description and command
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show usage, parameters, risks and tips for one catalog command
    Show { id: String },
    /// Fleet totals and live node gauges
    Overview {
        /// Refresh the live gauges this many times
        #[arg(long, default_value_t = 0)]
        ticks: u32,
    },
    /// Connect to a node and open the console
    Connect {
        #[command(flatten)]
        target: Target,
        /// Only test the connection
        #[arg(long)]
        test: bool,
    },
    /// Connect, run one catalog command and print its result
    Run {
        id: String,
        /// Skip the confirmation prompt for risky commands
        #[arg(long, short)]
        yes: bool,
        #[command(flatten)]
        target: Target,
    },
    /// Feed lines through the node terminal without the console
    Exec {
        #[arg(required = true)]
        lines: Vec<String>,
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args, Debug, Default)]
struct Target {
    /// JSON node inventory (a demo node is used without one)
    #[arg(long)]
    inventory: Option<PathBuf>,
    /// Node id inside the inventory [default: first node]
    #[arg(long)]
    node: Option<String>,
    /// ssh, api or rpc
    #[arg(long)]
    method: Option<Method>,
    /// Host or IP address [default: the node's address]
    #[arg(long)]
    host: Option<String>,
    /// Port [default: the method's port]
    #[arg(long)]
    port: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long, conflicts_with_all = ["private_key", "generate_key"])]
    password: Option<String>,
    #[arg(long, conflicts_with = "generate_key")]
    private_key: Option<String>,
    /// Use a freshly generated SSH key
    #[arg(long)]
    generate_key: bool,
    /// Key for the api and rpc methods
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    no_tls: bool,
    /// Seconds; stored with the connection, never enforced
    #[arg(long)]
    timeout: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::new()?;
    if cli.no_delay {
        config.simulation.no_delay = true;
    }
    let i18n = I18n::new(&config.get_effective_language());
    let seed = cli.seed.or_else(Config::env_seed);
    if let Some(seed) = seed {
        log::info!("seeded session: {seed}");
    }
    let mut dashboard = Dashboard::new(&config, random::entropy(seed));

    match cli.command {
        Commands::Commands { category, search } => {
            let category = Category::parse(category.as_deref().unwrap_or("")).map_err(anyhow::Error::msg)?;
            let commands = catalog::list(category, search.as_deref().unwrap_or(""));
            print!("{}", view::catalog_table(&commands, &i18n));
        }
        Commands::Show { id } => {
            let command = known_command(&id, &i18n)?;
            print!("{}", view::command_details(command, &i18n));
        }
        Commands::Overview { ticks } => {
            print!("{}", view::fleet_summary(dashboard.fleet(), &i18n));
            println!();
            print!("{}", view::live_summary(dashboard.live(), &i18n));

            let interval = Duration::from_secs(config.display.metrics_interval_secs.max(1));
            for _ in 0..ticks {
                if !config.simulation.no_delay {
                    thread::sleep(interval);
                }
                dashboard.refresh_live();
                println!();
                print!("{}", view::live_summary(dashboard.live(), &i18n));
            }
        }
        Commands::Connect { target, test } => {
            let kind = if test { AttemptKind::Test } else { AttemptKind::Connect };
            establish(&mut dashboard, &target, kind, &i18n)?;
            if !test {
                Console::new(dashboard, &i18n, config.display.visible_records).run()?;
                println!("{}", i18n.t("session_closed").dimmed());
            }
        }
        Commands::Run { id, yes, target } => {
            known_command(&id, &i18n)?;
            establish(&mut dashboard, &target, AttemptKind::Connect, &i18n)?;

            let run = match dashboard.run_catalog_command(&id, yes) {
                Err(DashboardError::ConfirmationRequired(_)) => {
                    if !confirm(&id, &i18n)? {
                        println!("{}", i18n.t("run_aborted").yellow());
                        return Ok(());
                    }
                    dashboard.run_catalog_command(&id, true)?
                }
                other => other?,
            };
            println!("{}", i18n.t_format("panel_started", &[run.command.command]).cyan());

            let started = Instant::now();
            wait(run.resolution.latency);
            if let Some(record) = dashboard.finish_panel(run, started.elapsed()) {
                print!("{}", view::record_block(record, &i18n));
            }
        }
        Commands::Exec { lines, target } => {
            establish(&mut dashboard, &target, AttemptKind::Connect, &i18n)?;

            for line in lines {
                dashboard.terminal_mut().set_input(&line);
                let Some(run) = dashboard.terminal_submit()? else {
                    continue;
                };
                let record_id = run.ticket.record_id.clone();
                let started = Instant::now();
                wait(run.resolution.latency);
                dashboard.terminal_complete(run, started.elapsed());

                // `clear` leaves no record to print
                if let Some(record) = dashboard.terminal().records().iter().find(|r| r.id == record_id) {
                    print!("{}", view::record_block(record, &i18n));
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn wait(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Unknown ids fail with the closest catalog ids as hints.
fn known_command(id: &str, i18n: &I18n) -> Result<&'static catalog::CatalogCommand> {
    if let Some(command) = catalog::lookup(id) {
        return Ok(command);
    }
    let suggestions = catalog::suggest(id, 3);
    if !suggestions.is_empty() {
        eprintln!("{}", i18n.t("did_you_mean").yellow());
        for suggestion in suggestions {
            eprintln!("  {}", suggestion.green());
        }
    }
    bail!(i18n.t_format("unknown_command", &[id]))
}

fn confirm(id: &str, i18n: &I18n) -> Result<bool> {
    print!("{}", i18n.t_format("confirm_run_prompt", &[id]).yellow());
    io::stdout().flush().ok();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return Ok(false);
    }
    Ok(input.trim().eq_ignore_ascii_case("yes"))
}

/// Run one handshake and report it. A failed attempt is an error here.
fn establish(dashboard: &mut Dashboard, target: &Target, kind: AttemptKind, i18n: &I18n) -> Result<()> {
    let node = resolve_node(target)?;
    let config = connection_config(dashboard, &node, target);
    println!(
        "{}",
        i18n.t_format("connecting", &[&node.name, &config.endpoint(), config.method.label()])
            .cyan()
    );

    let attempt = dashboard.begin_connect(&node, &config, kind)?;
    wait(attempt.delay);
    let outcome = attempt.outcome;
    dashboard.finish_connect(node, config, attempt, Instant::now());

    if !outcome.is_success() {
        bail!(view::failure_text(outcome, i18n));
    }
    match kind {
        AttemptKind::Test => println!("{}", i18n.t("connection_test_ok").green()),
        AttemptKind::Connect => println!("{}", view::connection_banner(dashboard.state(), i18n)),
    }
    Ok(())
}

fn resolve_node(target: &Target) -> Result<Node> {
    match &target.inventory {
        Some(path) => Ok(node::select(node::load_inventory(path)?, target.node.as_deref())?),
        None => {
            if let Some(id) = &target.node {
                log::warn!("--node {id} ignored without --inventory; using the demo node");
            }
            Ok(Node::demo())
        }
    }
}

fn connection_config(dashboard: &mut Dashboard, node: &Node, target: &Target) -> ConnectionConfig {
    let mut config = dashboard.default_config_for(node);
    if let Some(method) = target.method {
        config.set_method(method);
    }
    if let Some(host) = &target.host {
        config.host = host.clone();
    }
    if let Some(port) = &target.port {
        config.port = lenient_number("port", port);
    }
    if let Some(username) = &target.username {
        config.username = username.clone();
    }
    if target.no_tls {
        config.use_tls = false;
    }
    if let Some(timeout) = &target.timeout {
        config.timeout_secs = lenient_number("timeout", timeout);
    }
    config.credentials = credentials(dashboard, config.method, target);
    config
}

fn credentials(dashboard: &mut Dashboard, method: Method, target: &Target) -> Credentials {
    match method {
        Method::Ssh => {
            if let Some(password) = &target.password {
                Credentials::Password(password.clone())
            } else if let Some(key) = &target.private_key {
                Credentials::PrivateKey(key.clone())
            } else if target.generate_key {
                Credentials::PrivateKey(dashboard.generate_ssh_key())
            } else {
                Credentials::None
            }
        }
        Method::Api | Method::Rpc => match &target.api_key {
            Some(key) => Credentials::ApiKey(key.clone()),
            None => Credentials::None,
        },
    }
}
