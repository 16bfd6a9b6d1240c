//! # Effects
//!
//! Handlers are zero-argument closures, so they cannot borrow the [`App`].
//! Instead they capture an [`Effects`] handle and queue what they want done:
//!
//! ```text
//! key ──▶ handler() ──push──▶ Effects queue ──drain──▶ App::apply()
//! ```
//!
//! The queue is drained right after every dispatch, in FIFO order, on the
//! same thread. Quit is the exception: it fires the shared [`QuitSignal`]
//! immediately.
//!
//! [`App`]: crate::tui::app::App

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::core::context::Context;
use crate::core::key::KeySequence;
use crate::core::keymap::Handler;
use crate::core::mode::Mode;
use crate::core::prompt::Callback;
use crate::core::quit::QuitSignal;
use crate::script::ScriptFn;
use crate::tui::component::{Pager, Widget};
use crate::tui::pager_stack::PagerId;

/// Builds a child pager on demand.
pub type PagerFactory = Box<dyn FnOnce() -> Box<dyn Pager>>;

pub enum Effect {
    Confirm {
        message: String,
        callback: Callback,
    },
    /// Runs `command`; `context: None` means the active pager's context.
    Exec {
        command: String,
        context: Option<Context>,
        then: Option<Handler>,
    },
    ConfirmExec {
        command: String,
        context: Option<Context>,
        then: Option<Handler>,
    },
    BindKey {
        keys: KeySequence,
        handler: Handler,
    },
    RegisterMode {
        name: String,
        mode: Mode,
    },
    PushPager(Box<dyn Pager>),
    PopPager,
    AddChildPager {
        parent: PagerId,
        child: Box<dyn Pager>,
        keys: KeySequence,
    },
    Descend {
        keys: KeySequence,
        make: PagerFactory,
    },
    PushWidget(Box<dyn Widget>),
    PopWidget,
    CallScript(ScriptFn),
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Confirm { message, .. } => write!(f, "Confirm({message:?})"),
            Effect::Exec { command, .. } => write!(f, "Exec({command:?})"),
            Effect::ConfirmExec { command, .. } => write!(f, "ConfirmExec({command:?})"),
            Effect::BindKey { keys, .. } => write!(f, "BindKey({keys})"),
            Effect::RegisterMode { name, .. } => write!(f, "RegisterMode({name:?})"),
            Effect::PushPager(pager) => write!(f, "PushPager({:?})", pager.title()),
            Effect::PopPager => f.write_str("PopPager"),
            Effect::AddChildPager { parent, keys, .. } => write!(f, "AddChildPager({parent:?}, {keys})"),
            Effect::Descend { keys, .. } => write!(f, "Descend({keys})"),
            Effect::PushWidget(_) => f.write_str("PushWidget"),
            Effect::PopWidget => f.write_str("PopWidget"),
            Effect::CallScript(func) => write!(f, "CallScript({func:?})"),
        }
    }
}

/// Cloneable handle for queueing effects from handlers and callbacks.
#[derive(Clone)]
pub struct Effects {
    queue: Rc<RefCell<VecDeque<Effect>>>,
    quit: QuitSignal,
}

impl Effects {
    pub fn new(quit: QuitSignal) -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
            quit,
        }
    }

    pub fn push(&self, effect: Effect) {
        self.queue.borrow_mut().push_back(effect);
    }

    pub(crate) fn next(&self) -> Option<Effect> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn quit(&self) {
        self.quit.trigger();
    }

    pub fn quit_signal(&self) -> &QuitSignal {
        &self.quit
    }

    pub fn confirm(&self, message: impl Into<String>, callback: impl FnOnce() + 'static) {
        self.push(Effect::Confirm {
            message: message.into(),
            callback: Box::new(callback),
        });
    }

    pub fn exec(&self, command: impl Into<String>, context: Option<Context>) {
        self.push(Effect::Exec {
            command: command.into(),
            context,
            then: None,
        });
    }

    /// Asks for confirmation, runs `command` with `context`, then `then`.
    pub fn confirm_exec(&self, command: impl Into<String>, context: Context, then: impl Fn() + 'static) {
        self.push(Effect::ConfirmExec {
            command: command.into(),
            context: Some(context),
            then: Some(Rc::new(then)),
        });
    }

    pub fn push_pager(&self, pager: Box<dyn Pager>) {
        self.push(Effect::PushPager(pager));
    }

    pub fn pop_pager(&self) {
        self.push(Effect::PopPager);
    }

    /// Pushes `child` and records it as spawned from `parent` by `keys`.
    pub fn add_child_pager(&self, parent: PagerId, child: Box<dyn Pager>, keys: KeySequence) {
        self.push(Effect::AddChildPager { parent, child, keys });
    }

    pub fn descend(&self, keys: KeySequence, make: impl FnOnce() -> Box<dyn Pager> + 'static) {
        self.push(Effect::Descend {
            keys,
            make: Box::new(make),
        });
    }

    pub fn push_widget(&self, widget: Box<dyn Widget>) {
        self.push(Effect::PushWidget(widget));
    }

    pub fn pop_widget(&self) {
        self.push(Effect::PopWidget);
    }
}
