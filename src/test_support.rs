//! Shared test helpers.
//!
//! `Probe` is a widget/pager that records what happens to it into a
//! [`ProbeLog`]. `RecordingControl` and `RecordingRunner` stand in for the
//! real terminal and process spawner so command execution can be observed
//! without a tty.

use std::cell::{Cell, RefCell};
use std::io;
use std::process::ExitStatus;
use std::rc::Rc;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;
#[cfg(windows)]
use std::os::windows::process::ExitStatusExt;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::context::Context;
use crate::core::exec::{ProcessRunner, ShellCommand};
use crate::core::key::KeySequence;
use crate::core::keymap::{KeyOutcome, Keymap, Resolution};
use crate::tui::component::{Pager, Widget};
use crate::tui::terminal::TerminalControl;

/// Ordered record of test observations, shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct ProbeLog(Rc<RefCell<Vec<String>>>);

impl ProbeLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub struct Probe {
    name: String,
    log: ProbeLog,
    bindings: Keymap<()>,
    modes: Vec<String>,
    area: Rc<Cell<Rect>>,
}

impl Probe {
    pub fn new(name: &str, log: &ProbeLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            bindings: Keymap::new(),
            modes: Vec::new(),
            area: Rc::new(Cell::new(Rect::default())),
        }
    }

    pub fn bind(mut self, chord: &str) -> Self {
        self.bindings.insert(chord.parse().unwrap(), ());
        self
    }

    pub fn with_mode(mut self, name: &str) -> Self {
        self.modes.push(name.to_string());
        self
    }

    /// Shared view of the last area assigned to this probe.
    pub fn area_handle(&self) -> Rc<Cell<Rect>> {
        self.area.clone()
    }
}

impl Widget for Probe {
    fn set_area(&mut self, area: Rect) {
        self.area.set(area);
    }

    fn render(&mut self, _frame: &mut Frame) {
        self.log.push(format!("render:{}", self.name));
    }

    fn handle_keys(&mut self, keys: &KeySequence) -> KeyOutcome {
        match self.bindings.resolve(keys) {
            Resolution::Full(_) => {
                self.log.push(format!("{}:{keys}", self.name));
                KeyOutcome::Matched
            }
            Resolution::Partial => KeyOutcome::Pending,
            Resolution::Unmatched => KeyOutcome::Unmatched,
        }
    }

    fn destroy(&mut self) {
        self.log.push(format!("destroy:{}", self.name));
    }
}

impl Pager for Probe {
    fn title(&self) -> &str {
        &self.name
    }

    fn modes(&self) -> &[String] {
        &self.modes
    }

    fn context(&self) -> Context {
        Context::new().with("title", self.name.clone())
    }
}

/// Terminal control that only logs `release` / `acquire`.
pub struct RecordingControl {
    log: ProbeLog,
    fail_release: bool,
}

impl RecordingControl {
    pub fn new(log: &ProbeLog) -> Self {
        Self {
            log: log.clone(),
            fail_release: false,
        }
    }

    pub fn failing_release(log: &ProbeLog) -> Self {
        Self {
            log: log.clone(),
            fail_release: true,
        }
    }
}

impl TerminalControl for RecordingControl {
    fn release(&mut self) -> io::Result<()> {
        self.log.push("release");
        if self.fail_release {
            return Err(io::Error::other("release failed"));
        }
        Ok(())
    }

    fn acquire(&mut self) -> io::Result<()> {
        self.log.push("acquire");
        Ok(())
    }
}

/// Process runner that records commands instead of spawning them.
pub struct RecordingRunner {
    log: ProbeLog,
    commands: Rc<RefCell<Vec<ShellCommand>>>,
}

impl RecordingRunner {
    pub fn new(log: &ProbeLog) -> Self {
        Self {
            log: log.clone(),
            commands: Rc::default(),
        }
    }

    pub fn commands_handle(&self) -> Rc<RefCell<Vec<ShellCommand>>> {
        self.commands.clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&mut self, command: &ShellCommand) -> io::Result<ExitStatus> {
        self.log.push(format!("run:{}", command.args.join(" ")));
        self.commands.borrow_mut().push(command.clone());
        Ok(ExitStatus::from_raw(0))
    }
}
