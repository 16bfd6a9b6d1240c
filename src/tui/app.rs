//! # Application Context
//!
//! `App` owns every piece of UI state and is the only thing that mutates it.
//! A keystroke goes through one dispatch chain, first handled wins:
//!
//! ```text
//! pending chord
//!   │
//!   ├─▶ Prompt           (only while confirming; eats the whole chord)
//!   ├─▶ overlay widgets  (top-down)
//!   ├─▶ active pager     (its own keymap)
//!   ├─▶ pager's modes    (in the order the pager lists them)
//!   └─▶ global bindings  (C-c quits by default)
//! ```
//!
//! Handlers run during dispatch but only queue [`Effect`]s; the queue is
//! drained right after, which is where stacks change, commands run and
//! script callbacks are invoked.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::config::{ResolvedConfig, SpawnPolicy};
use crate::core::context::Context;
use crate::core::key::{KeyEvent, KeyParseError, KeySequence};
use crate::core::keymap::{Handler, HandlerRegistry, KeyOutcome};
use crate::core::mode::{Mode, ModeTable};
use crate::core::prompt::{Callback, Prompt};
use crate::core::quit::QuitSignal;
use crate::script::{ScriptError, ScriptVm, loader};
use crate::tui::component::{Pager, Widget};
use crate::tui::components::render_prompt;
use crate::tui::effect::{Effect, Effects};
use crate::tui::event::TerminalEvent;
use crate::tui::executor::CommandExecutor;
use crate::tui::host::CommandHost;
use crate::tui::pager_stack::{PagerId, PagerStack};
use crate::tui::stack::WidgetStack;

#[derive(Debug, Clone, Copy)]
pub struct AppSettings {
    pub spawn_policy: SpawnPolicy,
    pub affirmative: KeyEvent,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            spawn_policy: SpawnPolicy::default(),
            affirmative: KeyEvent::char('y'),
        }
    }
}

impl From<&ResolvedConfig> for AppSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            spawn_policy: config.spawn_policy,
            affirmative: config.affirmative,
        }
    }
}

pub struct App {
    widgets: WidgetStack,
    pagers: PagerStack,
    prompt: Prompt,
    prompt_area: Rect,
    globals: HandlerRegistry,
    modes: ModeTable,
    pending: KeySequence,
    effects: Effects,
    quit: QuitSignal,
    executor: CommandExecutor,
    scripts: Option<ScriptVm>,
    full_redraw: bool,
}

impl App {
    pub fn new(executor: CommandExecutor, settings: AppSettings) -> Self {
        let quit = QuitSignal::new();
        let effects = Effects::new(quit.clone());

        let mut globals = HandlerRegistry::new();
        let on_quit = effects.clone();
        globals.insert(KeyEvent::ctrl('c').into(), Rc::new(move || on_quit.quit()));

        Self {
            widgets: WidgetStack::new(),
            pagers: PagerStack::new(settings.spawn_policy),
            prompt: Prompt::new(settings.affirmative),
            prompt_area: Rect::default(),
            globals,
            modes: ModeTable::new(),
            pending: KeySequence::new(),
            effects,
            quit,
            executor,
            scripts: None,
            full_redraw: false,
        }
    }

    /// Handle for queueing effects from outside a dispatch.
    pub fn effects(&self) -> Effects {
        self.effects.clone()
    }

    pub fn quit_signal(&self) -> QuitSignal {
        self.quit.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.quit.is_triggered()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Binds a global chord, replacing any previous binding for it.
    pub fn bind_global(&mut self, keys: KeySequence, handler: Handler) {
        if self.globals.insert(keys.clone(), handler).is_some() {
            debug!("Global binding `{keys}` replaced");
        }
    }

    pub fn bind(&mut self, chord: &str, handler: impl Fn() + 'static) -> Result<(), KeyParseError> {
        self.bind_global(chord.parse()?, Rc::new(handler));
        Ok(())
    }

    pub fn register_mode(&mut self, name: impl Into<String>, mode: Mode) {
        self.modes.register(name, mode);
    }

    /// Creates the script VM on first use and evaluates the scripts in `dir`.
    pub fn load_scripts(&mut self, dir: &Path) -> Result<usize, ScriptError> {
        let effects = self.effects.clone();
        let vm = self
            .scripts
            .get_or_insert_with(|| ScriptVm::new(Rc::new(RefCell::new(CommandHost::new(effects)))));
        let loaded = loader::load_scripts(vm, dir)?;
        self.apply_effects();
        Ok(loaded)
    }

    // ------------------------------------------------------------------
    // Stacks
    // ------------------------------------------------------------------

    pub fn push_pager(&mut self, pager: Box<dyn Pager>) -> PagerId {
        self.pagers.push(pager)
    }

    /// Pops the active pager; popping the last one quits.
    pub fn pop_pager(&mut self) {
        if self.pagers.pop().is_some() && self.pagers.is_empty() {
            info!("Last pager popped");
            self.quit.trigger();
        }
    }

    pub fn add_child_pager(&mut self, parent: PagerId, child: Box<dyn Pager>, keys: KeySequence) -> PagerId {
        self.pagers.add_child(parent, child, keys)
    }

    pub fn descend(&mut self, keys: KeySequence, make: impl FnOnce() -> Box<dyn Pager>) -> Option<PagerId> {
        self.pagers.descend(keys, make)
    }

    pub fn push_widget(&mut self, widget: Box<dyn Widget>) {
        self.widgets.push(widget);
    }

    pub fn pop_widget(&mut self) {
        if let Some(mut widget) = self.widgets.pop() {
            widget.destroy();
        }
    }

    pub fn pager_titles(&self) -> Vec<String> {
        self.pagers.titles()
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    // ------------------------------------------------------------------
    // Prompt and commands
    // ------------------------------------------------------------------

    pub fn confirm(&mut self, message: impl Into<String>, callback: Callback) {
        if let Err(e) = self.prompt.confirm(message, callback) {
            warn!("{e}");
        }
    }

    pub fn is_confirming(&self) -> bool {
        self.prompt.is_confirming()
    }

    /// Runs `command` in the foreground. `None` uses the active pager's
    /// context. Failures are logged.
    pub fn exec(&mut self, command: &str, context: Option<Context>) {
        let context = context.unwrap_or_else(|| self.pagers.active_context());
        match self.executor.run(command, &context) {
            Ok(status) => info!("`{command}` finished: {status}"),
            Err(e) => warn!("`{command}` failed: {e}"),
        }
        self.full_redraw = true;
    }

    /// Asks ``Run `<command>` `` and, on yes, runs it and then `then`.
    pub fn confirm_exec(&mut self, command: String, context: Option<Context>, then: Option<Handler>) {
        let context = context.unwrap_or_else(|| self.pagers.active_context());
        let effects = self.effects.clone();
        let message = format!("Run `{command}`");
        self.confirm(
            message,
            Box::new(move || {
                effects.push(Effect::Exec {
                    command,
                    context: Some(context),
                    then,
                })
            }),
        );
    }

    /// True once after a command ran; the caller should repaint from scratch.
    pub fn take_full_redraw(&mut self) -> bool {
        std::mem::take(&mut self.full_redraw)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: TerminalEvent) {
        match event {
            TerminalEvent::Key(key) => self.handle_key(key),
            TerminalEvent::Resize(width, height) => self.resize(width, height),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.pending.push(key);
        match self.dispatch() {
            KeyOutcome::Matched => self.pending.clear(),
            KeyOutcome::Pending => debug!("Chord `{}` pending", self.pending),
            KeyOutcome::Unmatched => {
                debug!("Chord `{}` unbound", self.pending);
                self.pending.clear();
            }
        }
        self.apply_effects();
    }

    /// Keys typed so far towards a multi-key chord.
    pub fn pending_keys(&self) -> &KeySequence {
        &self.pending
    }

    fn dispatch(&mut self) -> KeyOutcome {
        let keys = self.pending.clone();

        let outcome = self.prompt.handle_keys(&keys);
        if outcome.is_handled() {
            return outcome;
        }
        let outcome = self.widgets.handle_keys(&keys);
        if outcome.is_handled() {
            return outcome;
        }
        let outcome = self.pagers.handle_keys(&keys);
        if outcome.is_handled() {
            return outcome;
        }
        let modes = self.pagers.active_modes();
        let outcome = self.modes.dispatch(modes.iter().map(String::as_str), &keys);
        if outcome.is_handled() {
            return outcome;
        }
        self.globals.dispatch(&keys)
    }

    /// Applies queued effects, including ones queued while applying.
    pub fn apply_effects(&mut self) {
        while let Some(effect) = self.effects.next() {
            debug!("Applying {effect:?}");
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Confirm { message, callback } => self.confirm(message, callback),
            Effect::Exec { command, context, then } => {
                self.exec(&command, context);
                if let Some(then) = then {
                    then();
                }
            }
            Effect::ConfirmExec { command, context, then } => self.confirm_exec(command, context, then),
            Effect::BindKey { keys, handler } => self.bind_global(keys, handler),
            Effect::RegisterMode { name, mode } => self.register_mode(name, mode),
            Effect::PushPager(pager) => {
                self.push_pager(pager);
            }
            Effect::PopPager => self.pop_pager(),
            Effect::AddChildPager { parent, child, keys } => {
                self.add_child_pager(parent, child, keys);
            }
            Effect::Descend { keys, make } => {
                self.descend(keys, make);
            }
            Effect::PushWidget(widget) => self.push_widget(widget),
            Effect::PopWidget => self.pop_widget(),
            Effect::CallScript(func) => match &self.scripts {
                Some(vm) => {
                    if let Err(e) = vm.call(&func) {
                        warn!("{e}");
                    }
                }
                None => warn!("No script engine to run {func:?}"),
            },
        }
    }

    // ------------------------------------------------------------------
    // Layout and rendering
    // ------------------------------------------------------------------

    /// Gives the stacks everything but the bottom row, which is reserved for
    /// the prompt.
    pub fn resize(&mut self, width: u16, height: u16) {
        let body = Rect::new(0, 0, width, height.saturating_sub(1));
        self.prompt_area = Rect::new(0, height.saturating_sub(1), width, height.min(1));
        self.pagers.set_area(body);
        self.widgets.set_area(body);
    }

    pub fn body_area(&self) -> Rect {
        self.widgets.area()
    }

    pub fn prompt_area(&self) -> Rect {
        self.prompt_area
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.pagers.render(frame);
        self.widgets.render(frame);
        render_prompt(frame, self.prompt_area, &self.prompt);
    }

    /// Destroys overlays then pagers, each top to bottom.
    pub fn shutdown(&mut self) {
        self.prompt.dismiss();
        self.widgets.destroy_all();
        self.pagers.destroy_all();
        info!("App shut down");
    }
}
