use crate::catalog;
use crate::clipboard;
use crate::dashboard::{Dashboard, DashboardError, PanelRun, TerminalRun};
use crate::i18n::I18n;
use crate::terminal::LineState;
use crate::transcript;
use crate::view;
use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Once;
use std::time::{Duration, Instant};

const POLL_CAP: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Terminal,
    Results,
    Metrics,
    History,
}

enum Job {
    Terminal(TerminalRun),
    Panel(PanelRun),
}

struct Pending {
    started: Instant,
    ready_at: Instant,
    job: Job,
}

/// Leaves raw mode and the alternate screen however the loop ends.
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        print!("\x1b[?25h\x1b[?1049l");
        let _ = io::stdout().flush();
        let _ = terminal::disable_raw_mode();
    }
}

fn install_interrupt_handler() {
    static INIT_CTRL_C: Once = Once::new();
    INIT_CTRL_C.call_once(|| {
        let result = ctrlc::set_handler(move || {
            let _ = terminal::disable_raw_mode();
            print!("\x1b[?25h\x1b[?1049l");
            let _ = io::stdout().flush();
            std::process::exit(130);
        });
        if let Err(err) = result {
            log::warn!("cannot install Ctrl-C handler: {err}");
        }
    });
}

pub struct Console<'a> {
    dashboard: Dashboard,
    i18n: &'a I18n,
    visible: usize,
    pane: Pane,
    pending: Vec<Pending>,
    awaiting_confirmation: Option<&'static str>,
    notice: Option<String>,
    quit: bool,
}

impl<'a> Console<'a> {
    pub fn new(dashboard: Dashboard, i18n: &'a I18n, visible: usize) -> Self {
        Self {
            dashboard,
            i18n,
            visible: visible.max(1),
            pane: Pane::Terminal,
            pending: Vec::new(),
            awaiting_confirmation: None,
            notice: None,
            quit: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        install_interrupt_handler();
        terminal::enable_raw_mode().context(self.i18n.t("error_raw_mode"))?;
        let _guard = RawModeGuard;
        print!("\x1b[?1049h\x1b[?25l");

        let mut stdout = io::stdout();
        let mut dirty = true;
        while !self.quit {
            if dirty {
                self.draw(&mut stdout)?;
            }
            let now = Instant::now();
            let wait = self
                .next_deadline()
                .map(|due| due.saturating_duration_since(now))
                .unwrap_or(POLL_CAP)
                .min(POLL_CAP);

            dirty = false;
            if event::poll(wait)? {
                match event::read()? {
                    Event::Key(key) => {
                        self.handle_key(key, Instant::now());
                        dirty = true;
                    }
                    Event::Resize(..) => dirty = true,
                    _ => {}
                }
            }
            dirty |= self.settle(Instant::now());
        }

        if self.dashboard.is_connected() {
            self.dashboard.disconnect();
        }
        Ok(())
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        let frame = self.render().replace('\n', "\x1b[K\r\n");
        write!(out, "\x1b[2J\x1b[H{}\x1b[K", frame)?;
        out.flush()
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.quit = true,
            KeyCode::Char('l') if ctrl => self.dashboard.terminal_mut().clear(),
            KeyCode::Esc => self.quit = true,
            KeyCode::Enter => self.submit(now),
            KeyCode::Backspace => self.dashboard.terminal_mut().backspace(),
            KeyCode::Up => self.dashboard.terminal_mut().history_previous(),
            KeyCode::Down => self.dashboard.terminal_mut().history_next(),
            KeyCode::Tab => {
                self.dashboard.terminal_mut().complete_tab();
            }
            KeyCode::Char(c) if !ctrl => self.dashboard.terminal_mut().insert_char(c),
            _ => {}
        }
    }

    fn submit(&mut self, now: Instant) {
        let line = self.dashboard.terminal().input().trim().to_string();
        if let Some(meta) = line.strip_prefix(':') {
            self.dashboard.terminal_mut().set_input("");
            self.meta(meta, now);
            return;
        }
        match self.dashboard.terminal_submit() {
            Ok(Some(run)) => {
                self.notice = None;
                self.pane = Pane::Terminal;
                let latency = run.resolution.latency;
                self.schedule(Job::Terminal(run), latency, now);
            }
            Ok(None) => {}
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    fn meta(&mut self, line: &str, now: Instant) {
        let i18n = self.i18n;
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or("");
        let arg = parts.next();
        match name {
            "run" => match arg {
                Some(id) => self.start_panel(id, false, now),
                None => self.notice = Some(i18n.t("usage_run")),
            },
            "confirm" => match self.awaiting_confirmation.take() {
                Some(id) => self.start_panel(id, true, now),
                None => self.notice = Some(i18n.t("nothing_to_confirm")),
            },
            "results" => self.pane = Pane::Results,
            "terminal" => self.pane = Pane::Terminal,
            "metrics" => self.pane = Pane::Metrics,
            "history" => self.pane = Pane::History,
            "copy" => self.copy(arg),
            "export" => match arg {
                Some(file) => self.export(Path::new(file)),
                None => self.notice = Some(i18n.t("usage_export")),
            },
            "clear" => self.dashboard.terminal_mut().clear(),
            "disconnect" => {
                self.dashboard.disconnect();
                self.pending.clear();
                self.quit = true;
            }
            "quit" | "q" => self.quit = true,
            "help" | "" => self.notice = Some(i18n.t("console_meta_help")),
            other => self.notice = Some(i18n.t_format("unknown_meta", &[other])),
        }
    }

    fn start_panel(&mut self, id: &str, confirmed: bool, now: Instant) {
        let i18n = self.i18n;
        match self.dashboard.run_catalog_command(id, confirmed) {
            Ok(run) => {
                self.notice = Some(i18n.t_format("panel_started", &[run.command.command]));
                self.pane = Pane::Results;
                let latency = run.resolution.latency;
                self.schedule(Job::Panel(run), latency, now);
            }
            Err(DashboardError::ConfirmationRequired(id)) => {
                self.awaiting_confirmation = catalog::lookup(&id).map(|c| c.id);
                self.notice = Some(i18n.t_format("confirm_prompt", &[&id]));
            }
            Err(DashboardError::UnknownCommand(id)) => {
                let suggestions = catalog::suggest(&id, 3);
                self.notice = Some(if suggestions.is_empty() {
                    i18n.t_format("unknown_command", &[&id])
                } else {
                    i18n.t_format("unknown_command_suggest", &[&id, &suggestions.join(", ")])
                });
            }
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    /// No argument copies the last terminal output, `N` the Nth panel result.
    fn copy(&mut self, arg: Option<&str>) {
        let text = match arg {
            None => self.dashboard.terminal().last_output().map(str::to_string),
            Some(n) => n
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| self.dashboard.results().get(i))
                .map(|r| r.output.clone()),
        };
        self.notice = Some(match text {
            Some(text) => {
                clipboard::copy(&text);
                self.i18n.t("copied")
            }
            None => self.i18n.t("nothing_to_copy"),
        });
    }

    fn export(&mut self, path: &Path) {
        self.notice = Some(match transcript::export(&self.dashboard, path, self.i18n) {
            Ok(count) => self
                .i18n
                .t_format("exported", &[&count.to_string(), &path.display().to_string()]),
            Err(err) => format!("{err:#}"),
        });
    }

    fn schedule(&mut self, job: Job, latency: Duration, now: Instant) {
        self.pending.push(Pending {
            started: now,
            ready_at: now + latency,
            job,
        });
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .iter()
            .map(|p| p.ready_at)
            .chain(self.dashboard.next_tick())
            .min()
    }

    /// Deliver due results and metric ticks. True when anything changed.
    fn settle(&mut self, now: Instant) -> bool {
        let (due, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.ready_at <= now);
        self.pending = waiting;
        let mut changed = !due.is_empty();

        let i18n = self.i18n;
        for pending in due {
            let elapsed = now.saturating_duration_since(pending.started);
            match pending.job {
                Job::Terminal(run) => self.dashboard.terminal_complete(run, elapsed),
                Job::Panel(run) => {
                    let message = self.dashboard.finish_panel(run, elapsed).map(|record| {
                        i18n.t_format("panel_finished", &[&record.command, record.status.as_str()])
                    });
                    if message.is_some() {
                        self.notice = message;
                    }
                }
            }
        }
        changed |= self.dashboard.tick(now);
        changed
    }

    fn render(&self) -> String {
        let i18n = self.i18n;
        let live = self.dashboard.live();
        let mut out = format!(
            "{}  {}\n",
            i18n.t("console_title").bold(),
            view::connection_banner(self.dashboard.state(), i18n)
        );
        if self.dashboard.ticker_running() {
            let gauges = i18n.t_format(
                "console_gauges",
                &[
                    &live.cpu.to_string(),
                    &live.memory.to_string(),
                    &live.storage.to_string(),
                    &live.peers.to_string(),
                    &live.uptime,
                ],
            );
            out.push_str(&format!("{}\n", gauges.dimmed()));
        }
        out.push('\n');

        match self.pane {
            Pane::Terminal => {
                let records = self.dashboard.terminal().visible_records(self.visible);
                if records.is_empty() {
                    out.push_str(&format!("{}\n", i18n.t("terminal_empty").dimmed()));
                }
                for record in records {
                    out.push_str(&view::record_block(record, i18n));
                }
            }
            Pane::Results => {
                if let Some(id) = self.dashboard.running_panel() {
                    out.push_str(&format!("{}\n", i18n.t_format("panel_running", &[id]).yellow()));
                }
                let results = self.dashboard.results();
                if results.is_empty() && self.dashboard.running_panel().is_none() {
                    out.push_str(&format!("{}\n", i18n.t("results_empty").dimmed()));
                }
                for (i, record) in results.iter().enumerate() {
                    out.push_str(&format!("{}\n", format!("[{}]", i + 1).cyan()));
                    out.push_str(&view::record_block(record, i18n));
                }
            }
            Pane::Metrics => {
                out.push_str(&view::fleet_summary(self.dashboard.fleet(), i18n));
                out.push('\n');
                out.push_str(&view::live_summary(live, i18n));
            }
            Pane::History => {
                let history = self.dashboard.terminal().history();
                if history.is_empty() {
                    out.push_str(&format!("{}\n", i18n.t("history_empty").dimmed()));
                }
                for (i, entry) in history.iter().enumerate() {
                    let at = entry.timestamp.with_timezone(&Local).format("%H:%M:%S");
                    out.push_str(&format!("{:>4}  {}  {}\n", i + 1, at.to_string().dimmed(), entry.command));
                }
            }
        }

        out.push('\n');
        if let Some(notice) = &self.notice {
            out.push_str(&format!("{}\n", notice.yellow()));
        }
        let terminal = self.dashboard.terminal();
        let prompt = match terminal.state() {
            LineState::Idle => "$".green().bold(),
            LineState::AwaitingResult => "…".yellow().bold(),
        };
        let recall = if terminal.is_browsing() { i18n.t("history_recall") } else { String::new() };
        out.push_str(&format!("{} {}_ {}\n", prompt, terminal.input(), recall.dimmed()));
        out.push_str(&i18n.t("console_hint").dimmed().to_string());
        out
    }
}
