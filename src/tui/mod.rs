//! # TUI Adapter
//!
//! The ratatui/crossterm layer: terminal ownership, the input pump, the
//! widget stacks and the event loop that ties them to [`App`].
//!
//! ## Event Loop
//!
//! One current-thread tokio task owns the `App`. A producer thread reads the
//! terminal and forwards events through a bounded channel:
//!
//! ```text
//!  input pump ──mpsc(64)──▶ select! { quit │ event │ 100ms tick } ──▶ App
//!                                  ▲                                  │
//!                                  └────────── render ◀───────────────┘
//! ```
//!
//! Every iteration renders first, then waits. At most one event is handled
//! per iteration. The wait is biased towards the quit signal so nothing is
//! dispatched once quit has fired.

pub mod app;
pub mod component;
pub mod components;
pub mod effect;
pub mod event;
pub mod executor;
pub mod host;
pub mod pager_stack;
pub mod stack;
pub mod terminal;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use log::{error, info};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc;

use crate::core::config::ResolvedConfig;
use crate::core::exec::InheritedStdio;
use crate::tui::app::{App, AppSettings};
use crate::tui::components::TextPager;
use crate::tui::event::{InputGate, TerminalEvent, spawn_input_pump};
use crate::tui::executor::CommandExecutor;
use crate::tui::terminal::{CrosstermControl, SessionGuard};

pub const EVENT_CHANNEL_CAPACITY: usize = 64;
pub const TICK: Duration = Duration::from_millis(100);

/// Drives `app` until the quit signal fires, then destroys every widget.
///
/// A closed event channel counts as a quit request. Widgets are destroyed
/// on every exit path, including a failed draw.
pub async fn run_loop<B>(
    app: &mut App,
    terminal: &mut Terminal<B>,
    events: &mut mpsc::Receiver<TerminalEvent>,
) -> anyhow::Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let result = drive(app, terminal, events).await;
    if let Err(e) = &result {
        error!("Event loop failed: {e:#}");
    }
    app.shutdown();
    result
}

async fn drive<B>(
    app: &mut App,
    terminal: &mut Terminal<B>,
    events: &mut mpsc::Receiver<TerminalEvent>,
) -> anyhow::Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let size = terminal.size().context("failed to read terminal size")?;
    app.resize(size.width, size.height);
    let quit = app.quit_signal();

    loop {
        if app.take_full_redraw() {
            terminal.clear().context("failed to clear terminal")?;
        }
        terminal.draw(|frame| app.render(frame)).context("failed to draw")?;

        tokio::select! {
            biased;
            _ = quit.wait() => return Ok(()),
            event = events.recv() => match event {
                Some(event) => app.handle_event(event),
                None => {
                    info!("Input channel closed");
                    quit.trigger();
                }
            },
            _ = tokio::time::sleep(TICK) => {}
        }
    }
}

/// Root pager content shown at startup.
pub struct RootPage {
    pub title: String,
    pub text: String,
}

/// Takes over the terminal, loads the user's scripts and runs the event loop.
pub async fn run(config: &ResolvedConfig, root: RootPage) -> anyhow::Result<()> {
    let mut terminal = ratatui::try_init().context("failed to initialize terminal")?;
    let _session = SessionGuard::new();

    let gate = Arc::new(InputGate::new());
    let executor = CommandExecutor::new(
        config.shell.clone(),
        Box::new(InheritedStdio),
        Box::new(CrosstermControl::new(gate.clone())),
    );
    let mut app = App::new(executor, AppSettings::from(config));
    let root = TextPager::new(root.title, &root.text, app.effects());
    app.push_pager(Box::new(root));

    app.load_scripts(&config.config_dir)
        .context("failed to load scripts")?;

    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let _pump = spawn_input_pump(tx, gate);

    run_loop(&mut app, &mut terminal, &mut rx).await
}
