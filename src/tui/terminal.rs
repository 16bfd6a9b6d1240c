//! Terminal ownership.
//!
//! The UI owns the terminal (raw mode, alternate screen) for the whole
//! session except while a shell command runs. [`Suspended`] hands it over
//! for the lifetime of the guard and takes it back on drop, so the terminal
//! is restored even if the child could not be spawned.

use std::io::{self, stdout};
use std::sync::Arc;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{error, info};

use crate::tui::event::InputGate;

pub trait TerminalControl {
    /// Give the terminal back to a cooked-mode child.
    fn release(&mut self) -> io::Result<()>;

    /// Put the terminal back into UI mode.
    fn acquire(&mut self) -> io::Result<()>;
}

/// Real terminal control via crossterm.
///
/// `gate` is shared with the input pump. Release parks the pump before the
/// terminal leaves raw mode, so a child never races it for stdin.
pub struct CrosstermControl {
    gate: Arc<InputGate>,
}

impl CrosstermControl {
    pub fn new(gate: Arc<InputGate>) -> Self {
        Self { gate }
    }
}

impl TerminalControl for CrosstermControl {
    fn release(&mut self) -> io::Result<()> {
        self.gate.pause();
        execute!(stdout(), LeaveAlternateScreen, Show)?;
        disable_raw_mode()
    }

    fn acquire(&mut self) -> io::Result<()> {
        let restored = enable_raw_mode().and_then(|()| execute!(stdout(), EnterAlternateScreen, Hide));
        self.gate.resume();
        restored
    }
}

/// Terminal released to a child process. Reacquired on drop.
pub struct Suspended<'a, C: TerminalControl + ?Sized> {
    control: &'a mut C,
}

impl<'a, C: TerminalControl + ?Sized> Suspended<'a, C> {
    /// Releases the terminal. On failure the UI mode is restored before the
    /// error is returned.
    pub fn new(control: &'a mut C) -> io::Result<Self> {
        if let Err(e) = control.release() {
            if let Err(restore) = control.acquire() {
                error!("Failed to restore terminal after release error: {restore}");
            }
            return Err(e);
        }
        Ok(Self { control })
    }
}

impl<C: TerminalControl + ?Sized> Drop for Suspended<'_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.control.acquire() {
            error!("Failed to reacquire terminal: {e}");
        }
    }
}

/// Restores the terminal when the UI session ends, including on panic
/// unwinding out of the event loop.
pub struct SessionGuard;

impl SessionGuard {
    pub fn new() -> Self {
        info!("Terminal session started");
        Self
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        ratatui::restore();
        info!("Terminal session restored");
    }
}
