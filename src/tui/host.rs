//! Production [`HostApi`]: turns script calls into queued effects.
//!
//! Script callbacks are not run here. Bindings registered from a script
//! queue an [`Effect::CallScript`] when they fire, and the app hands that to
//! the VM once the current dispatch has finished.

use std::rc::Rc;

use crate::core::key::KeySequence;
use crate::core::keymap::{Handler, HandlerRegistry};
use crate::core::mode::Mode;
use crate::script::{HostApi, ScriptFn};
use crate::tui::components::TextPager;
use crate::tui::effect::{Effect, Effects};

pub struct CommandHost {
    effects: Effects,
}

impl CommandHost {
    pub fn new(effects: Effects) -> Self {
        Self { effects }
    }

    fn script_handler(&self, func: ScriptFn) -> Handler {
        let effects = self.effects.clone();
        Rc::new(move || effects.push(Effect::CallScript(func.clone())))
    }
}

impl HostApi for CommandHost {
    fn bind_key(&mut self, keys: KeySequence, callback: ScriptFn) {
        let handler = self.script_handler(callback);
        self.effects.push(Effect::BindKey { keys, handler });
    }

    fn confirm(&mut self, message: String, callback: ScriptFn) {
        let effects = self.effects.clone();
        self.effects
            .confirm(message, move || effects.push(Effect::CallScript(callback)));
    }

    fn exec(&mut self, command: String) {
        self.effects.exec(command, None);
    }

    fn confirm_exec(&mut self, command: String, then: Option<ScriptFn>) {
        let then = then.map(|func| self.script_handler(func));
        self.effects.push(Effect::ConfirmExec {
            command,
            context: None,
            then,
        });
    }

    fn register_mode(&mut self, name: String, bindings: Vec<(KeySequence, ScriptFn)>) {
        let mut registry = HandlerRegistry::new();
        for (keys, func) in bindings {
            registry.insert(keys, self.script_handler(func));
        }
        self.effects.push(Effect::RegisterMode {
            name,
            mode: Mode::new(registry),
        });
    }

    fn quit(&mut self) {
        self.effects.quit();
    }

    fn push_pager(&mut self, title: String, text: String, modes: Vec<String>) {
        let pager = TextPager::new(title, &text, self.effects.clone()).with_modes(modes);
        self.effects.push_pager(Box::new(pager));
    }

    fn pop_pager(&mut self) {
        self.effects.pop_pager();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quit::QuitSignal;
    use std::cell::RefCell;
    use crate::script::ScriptVm;

    fn host() -> (Rc<RefCell<CommandHost>>, Effects) {
        let effects = Effects::new(QuitSignal::new());
        (Rc::new(RefCell::new(CommandHost::new(effects.clone()))), effects)
    }

    #[test]
    fn test_bound_script_handler_queues_call() {
        let (host, effects) = host();
        let mut vm = ScriptVm::new(host);
        vm.eval(std::path::Path::new("init.rhai"), r#"bind_key("x", || quit());"#)
            .unwrap();

        let Some(Effect::BindKey { keys, handler }) = effects.next() else {
            panic!("expected BindKey");
        };
        assert_eq!(keys, "x".parse().unwrap());

        handler();
        let Some(Effect::CallScript(func)) = effects.next() else {
            panic!("expected CallScript");
        };
        vm.call(&func).unwrap();
        assert!(effects.quit_signal().is_triggered());
    }

    #[test]
    fn test_confirm_exec_without_callback() {
        let (host, effects) = host();
        host.borrow_mut().confirm_exec("make".to_string(), None);
        assert!(matches!(
            effects.next(),
            Some(Effect::ConfirmExec { command, context: None, then: None }) if command == "make"
        ));
    }

    #[test]
    fn test_push_pager_builds_text_pager_with_modes() {
        let (host, effects) = host();
        host.borrow_mut()
            .push_pager("notes".to_string(), "a\nb".to_string(), vec!["git".to_string()]);
        let Some(Effect::PushPager(pager)) = effects.next() else {
            panic!("expected PushPager");
        };
        assert_eq!(pager.title(), "notes");
        assert_eq!(pager.modes(), ["git".to_string()]);
    }

    #[test]
    fn test_register_mode_wraps_every_binding() {
        let (host, effects) = host();
        let mut vm = ScriptVm::new(host);
        vm.eval(
            std::path::Path::new("init.rhai"),
            r#"register_mode("git", #{ "s": || exec("git status"), "l": || exec("git log") });"#,
        )
        .unwrap();
        let Some(Effect::RegisterMode { name, mode }) = effects.next() else {
            panic!("expected RegisterMode");
        };
        assert_eq!(name, "git");
        assert_eq!(mode.bindings().len(), 2);
    }
}
