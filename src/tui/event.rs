use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode as CtKeyCode, KeyEventKind, KeyModifiers};
use log::{debug, error};
use tokio::sync::mpsc::Sender;

use crate::core::key::{KeyCode, KeyEvent, Modifiers};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PAUSED_INTERVAL: Duration = Duration::from_millis(20);

/// Input events delivered to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Translates a crossterm event. Only key presses and resizes are kept.
pub fn translate(event: Event) -> Option<TerminalEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => translate_key(key.code, key.modifiers).map(TerminalEvent::Key),
        Event::Resize(width, height) => Some(TerminalEvent::Resize(width, height)),
        _ => None,
    }
}

fn translate_key(code: CtKeyCode, modifiers: KeyModifiers) -> Option<KeyEvent> {
    let mut mods = Modifiers {
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        alt: modifiers.contains(KeyModifiers::ALT),
        shift: modifiers.contains(KeyModifiers::SHIFT),
    };
    let code = match code {
        CtKeyCode::Char(c) => KeyCode::Char(c),
        CtKeyCode::Enter => KeyCode::Enter,
        CtKeyCode::Esc => KeyCode::Esc,
        CtKeyCode::Tab => KeyCode::Tab,
        CtKeyCode::BackTab => {
            mods.shift = false;
            KeyCode::BackTab
        }
        CtKeyCode::Backspace => KeyCode::Backspace,
        CtKeyCode::Up => KeyCode::Up,
        CtKeyCode::Down => KeyCode::Down,
        CtKeyCode::Left => KeyCode::Left,
        CtKeyCode::Right => KeyCode::Right,
        CtKeyCode::Home => KeyCode::Home,
        CtKeyCode::End => KeyCode::End,
        CtKeyCode::PageUp => KeyCode::PageUp,
        CtKeyCode::PageDown => KeyCode::PageDown,
        CtKeyCode::Delete => KeyCode::Delete,
        CtKeyCode::Insert => KeyCode::Insert,
        CtKeyCode::F(n) => KeyCode::F(n),
        other => {
            debug!("Ignoring key {other:?}");
            return None;
        }
    };
    Some(KeyEvent::new(code, mods))
}

/// Hand-off point between the input pump and whoever needs stdin back.
///
/// The pump holds the read lock for every poll/read. [`pause`](Self::pause)
/// takes the same lock, so once it returns the pump is parked and will not
/// read again until [`resume`](Self::resume).
#[derive(Default)]
pub struct InputGate {
    paused: AtomicBool,
    reading: Mutex<()>,
    resumed: Condvar,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the pump. Blocks until any in-flight poll or read has returned.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        drop(self.lock());
        debug!("Input pump parked");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.resumed.notify_all();
    }

    /// Read access for one poll/read cycle, or `None` while paused. When
    /// paused this waits up to `PAUSED_INTERVAL` for a resume first.
    fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        let guard = self.lock();
        if !self.paused.load(Ordering::SeqCst) {
            return Some(guard);
        }
        let (guard, _) = self
            .resumed
            .wait_timeout(guard, PAUSED_INTERVAL)
            .unwrap_or_else(PoisonError::into_inner);
        drop(guard);
        None
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reads terminal events on a dedicated thread and forwards them to `tx`.
///
/// While `gate` is paused the thread does not touch stdin. The thread exits
/// once the receiving side is dropped.
pub fn spawn_input_pump(tx: Sender<TerminalEvent>, gate: Arc<InputGate>) -> JoinHandle<()> {
    thread::spawn(move || {
        while !tx.is_closed() {
            let Some(reading) = gate.enter() else {
                continue;
            };
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    error!("Terminal poll failed: {e}");
                    break;
                }
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    error!("Terminal read failed: {e}");
                    break;
                }
            };
            drop(reading);
            if let Some(event) = translate(event)
                && tx.blocking_send(event).is_err()
            {
                break;
            }
        }
        debug!("Input pump stopped");
    })
}
