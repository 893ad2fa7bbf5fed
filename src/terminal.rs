use crate::record::{CommandStatus, ExecutedCommand, HistoryEntry};
use crate::simulator::Resolution;
use std::time::Duration;

/// Words offered by Tab, tried in this order.
pub const COMPLETIONS: [&str; 8] = [
    "ls",
    "pwd",
    "ps",
    "df",
    "top",
    "netstat",
    "systemctl",
    "validator-cli",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Idle,
    AwaitingResult,
}

/// Handle for a submitted command whose output has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub record_id: String,
    pub command: String,
}

#[derive(Debug, Default)]
struct Browse {
    // 0 is the newest entry
    offset: usize,
    // buffer as it was before browsing started
    draft: String,
}

pub struct LineDiscipline {
    input: String,
    history: Vec<HistoryEntry>,
    browse: Option<Browse>,
    records: Vec<ExecutedCommand>,
    state: LineState,
    sequence: u64,
}

impl LineDiscipline {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            history: Vec::new(),
            browse: None,
            records: Vec::new(),
            state: LineState::Idle,
            sequence: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn records(&self) -> &[ExecutedCommand] {
        &self.records
    }

    /// The newest `n` records; the view is always scrolled to the bottom.
    pub fn visible_records(&self, n: usize) -> &[ExecutedCommand] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn is_browsing(&self) -> bool {
        self.browse.is_some()
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Up: step back through history, stopping at the oldest entry.
    pub fn history_previous(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next_offset = match &self.browse {
            None => 0,
            Some(b) if b.offset + 1 < self.history.len() => b.offset + 1,
            Some(_) => return,
        };
        let browse = self.browse.get_or_insert_with(|| Browse {
            offset: 0,
            draft: self.input.clone(),
        });
        browse.offset = next_offset;
        self.input = self.history[self.history.len() - 1 - next_offset].command.clone();
    }

    /// Down: step forward; past the newest entry browsing ends and the
    /// pre-browse buffer comes back. A no-op when not browsing.
    pub fn history_next(&mut self) {
        match self.browse.take() {
            None => {}
            Some(b) if b.offset == 0 => {
                self.input = b.draft;
            }
            Some(mut b) => {
                b.offset -= 1;
                self.input = self.history[self.history.len() - 1 - b.offset].command.clone();
                self.browse = Some(b);
            }
        }
    }

    /// Tab: replace the buffer with the first completion it prefixes.
    pub fn complete_tab(&mut self) -> bool {
        match COMPLETIONS.iter().find(|s| s.starts_with(self.input.as_str())) {
            Some(word) => {
                self.input = word.to_string();
                true
            }
            None => false,
        }
    }

    /// Enter. Blank input, or a command already in flight, does nothing.
    pub fn submit(&mut self) -> Option<Ticket> {
        if self.state == LineState::AwaitingResult || self.input.trim().is_empty() {
            return None;
        }
        let command = std::mem::take(&mut self.input);
        self.browse = None;
        self.history.push(HistoryEntry::now(&command));

        self.sequence += 1;
        let record = ExecutedCommand::start(&command, self.sequence);
        let ticket = Ticket {
            record_id: record.id.clone(),
            command,
        };
        self.records.push(record);
        self.state = LineState::AwaitingResult;
        Some(ticket)
    }

    /// Deliver the result for `ticket` and return to idle.
    pub fn complete(&mut self, ticket: &Ticket, resolution: Resolution, elapsed: Duration) {
        self.state = LineState::Idle;
        if resolution.clears_screen {
            self.clear();
            return;
        }
        match self.records.iter_mut().find(|r| r.id == ticket.record_id) {
            Some(record) => {
                record.complete(resolution.output, resolution.status, elapsed);
            }
            None => log::debug!("record {} was cleared before its result arrived", ticket.record_id),
        }
    }

    /// Drop the rendered records; history stays.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn last_output(&self) -> Option<&str> {
        self.records
            .iter()
            .rev()
            .find(|r| r.status != CommandStatus::Running)
            .map(|r| r.output.as_str())
    }
}

impl Default for LineDiscipline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(term: &mut LineDiscipline, text: &str) {
        for c in text.chars() {
            term.insert_char(c);
        }
    }

    fn done(output: &str) -> Resolution {
        Resolution {
            output: output.to_string(),
            status: CommandStatus::Success,
            clears_screen: false,
            latency: Duration::ZERO,
        }
    }

    fn run(term: &mut LineDiscipline, text: &str) {
        term.set_input(text);
        let ticket = term.submit().unwrap();
        term.complete(&ticket, done("ok"), Duration::from_millis(5));
    }

    #[test]
    fn blank_submit_creates_nothing() {
        let mut term = LineDiscipline::new();
        assert!(term.submit().is_none());
        typed(&mut term, "   \t ");
        assert!(term.submit().is_none());
        assert!(term.history().is_empty());
        assert!(term.records().is_empty());
        assert_eq!(term.state(), LineState::Idle);
    }

    #[test]
    fn submit_and_complete_cycle() {
        let mut term = LineDiscipline::new();
        typed(&mut term, "Pwd");
        let ticket = term.submit().unwrap();
        assert_eq!(ticket.command, "Pwd");
        assert_eq!(term.state(), LineState::AwaitingResult);
        assert_eq!(term.input(), "");
        assert!(term.records()[0].is_running());

        // Enter while waiting is ignored
        typed(&mut term, "ls");
        assert!(term.submit().is_none());
        assert_eq!(term.history().len(), 1);

        term.complete(&ticket, done("/var/lib/validator"), Duration::from_millis(700));
        assert_eq!(term.state(), LineState::Idle);
        let record = &term.records()[0];
        assert_eq!(record.command, "Pwd");
        assert_eq!(record.output, "/var/lib/validator");
        assert_eq!(record.execution_ms, Some(700));
        assert_eq!(term.last_output(), Some("/var/lib/validator"));
    }

    #[test]
    fn submit_resets_browsing() {
        let mut term = LineDiscipline::new();
        run(&mut term, "one");
        run(&mut term, "two");
        term.history_previous();
        term.history_previous();
        assert_eq!(term.input(), "one");
        let ticket = term.submit().unwrap();
        term.complete(&ticket, done("ok"), Duration::ZERO);
        assert!(!term.is_browsing());

        term.history_previous();
        assert_eq!(term.input(), "one");
        assert_eq!(term.history().len(), 3);
    }

    #[test]
    fn previous_is_bounded_at_oldest() {
        let mut term = LineDiscipline::new();
        run(&mut term, "a");
        run(&mut term, "b");
        for _ in 0..5 {
            term.history_previous();
        }
        assert_eq!(term.input(), "a");
        term.history_next();
        assert_eq!(term.input(), "b");
        term.history_next();
        assert_eq!(term.input(), "");
        assert!(!term.is_browsing());
        term.history_next();
        assert_eq!(term.input(), "");
    }

    #[test]
    fn equal_up_down_restores_buffer() {
        let mut term = LineDiscipline::new();
        for cmd in ["ls", "pwd", "df -h"] {
            run(&mut term, cmd);
        }
        for steps in 0..6 {
            term.set_input("draft");
            for _ in 0..steps {
                term.history_previous();
            }
            for _ in 0..steps {
                term.history_next();
            }
            assert_eq!(term.input(), "draft", "after {steps} steps");
        }
        assert_eq!(term.history().len(), 3);
    }

    #[test]
    fn navigation_without_history_is_noop() {
        let mut term = LineDiscipline::new();
        typed(&mut term, "x");
        term.history_previous();
        term.history_next();
        assert_eq!(term.input(), "x");
    }

    #[test]
    fn tab_completes_case_sensitive_prefix() {
        let mut term = LineDiscipline::new();
        typed(&mut term, "sys");
        assert!(term.complete_tab());
        assert_eq!(term.input(), "systemctl");

        term.set_input("valid");
        assert!(term.complete_tab());
        assert_eq!(term.input(), "validator-cli");

        term.set_input("p");
        assert!(term.complete_tab());
        assert_eq!(term.input(), "pwd");

        term.set_input("SYS");
        assert!(!term.complete_tab());
        assert_eq!(term.input(), "SYS");

        term.set_input("xyz");
        assert!(!term.complete_tab());
        assert_eq!(term.input(), "xyz");
    }

    #[test]
    fn clear_keeps_history() {
        let mut term = LineDiscipline::new();
        run(&mut term, "ls");
        run(&mut term, "pwd");
        term.clear();
        assert!(term.records().is_empty());
        assert_eq!(term.history().len(), 2);
    }

    #[test]
    fn clearing_resolution_leaves_no_record() {
        let mut term = LineDiscipline::new();
        run(&mut term, "ls");
        term.set_input("clear");
        let ticket = term.submit().unwrap();
        let resolution = Resolution { clears_screen: true, ..done("") };
        term.complete(&ticket, resolution, Duration::ZERO);
        assert!(term.records().is_empty());
        assert_eq!(term.history().len(), 2);
        assert_eq!(term.state(), LineState::Idle);
    }

    #[test]
    fn visible_records_is_the_tail() {
        let mut term = LineDiscipline::new();
        for i in 0..5 {
            run(&mut term, &format!("echo {i}"));
        }
        let tail: Vec<&str> = term.visible_records(2).iter().map(|r| r.command.as_str()).collect();
        assert_eq!(tail, vec!["echo 3", "echo 4"]);
        assert_eq!(term.visible_records(50).len(), 5);
    }
}
