use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};
use rhai::{AST, Array, Dynamic, Engine, EvalAltResult, FnPtr, Map};

use super::{HostApi, ScriptError, ScriptFn};
use crate::core::key::{KeyParseError, KeySequence};

type HostRef = Rc<RefCell<dyn HostApi>>;
type HostResult = Result<(), Box<EvalAltResult>>;

/// The embedded script engine.
///
/// Functions defined by every evaluated script are kept in one library so
/// callbacks registered by a script can still be called after evaluation,
/// and a later script can call (or override) an earlier script's functions.
pub struct ScriptVm {
    engine: Engine,
    lib: AST,
}

impl ScriptVm {
    pub fn new(host: HostRef) -> Self {
        let mut engine = Engine::new();
        engine.on_print(|text| info!("[script] {text}"));
        engine.on_debug(|text, source, pos| debug!("[script] {}@{pos}: {text}", source.unwrap_or("<eval>")));
        register_host(&mut engine, host);
        Self {
            engine,
            lib: AST::empty(),
        }
    }

    /// Compiles and runs `source`. `path` is only used for error reporting.
    pub fn eval(&mut self, path: &Path, source: &str) -> Result<(), ScriptError> {
        let eval_error = |message: String| ScriptError::Eval {
            path: path.to_path_buf(),
            message,
        };

        let mut ast = self.engine.compile(source).map_err(|e| eval_error(e.to_string()))?;
        ast.set_source(path.display().to_string());

        let merged = self.lib.merge(&ast);
        self.engine.run_ast(&merged).map_err(|e| eval_error(e.to_string()))?;
        self.lib = merged.clone_functions_only();
        debug!("Evaluated {}", path.display());
        Ok(())
    }

    /// Invokes a stored script function with no arguments. Its return value
    /// is discarded.
    pub fn call(&self, func: &ScriptFn) -> Result<(), ScriptError> {
        func.ptr()
            .call::<Dynamic>(&self.engine, &self.lib, ())
            .map(|_| ())
            .map_err(|e| ScriptError::Call {
                name: func.name().to_string(),
                message: e.to_string(),
            })
    }
}

fn parse_chord(chord: &str) -> Result<KeySequence, Box<EvalAltResult>> {
    chord
        .parse()
        .map_err(|e: KeyParseError| format!("invalid chord `{chord}`: {e}").into())
}

fn register_host(engine: &mut Engine, host: HostRef) {
    let h = host.clone();
    engine.register_fn("bind_key", move |chord: &str, callback: FnPtr| -> HostResult {
        let keys = parse_chord(chord)?;
        h.borrow_mut().bind_key(keys, ScriptFn::new(callback));
        Ok(())
    });

    let h = host.clone();
    engine.register_fn("confirm", move |message: &str, callback: FnPtr| {
        h.borrow_mut().confirm(message.to_string(), ScriptFn::new(callback));
    });

    let h = host.clone();
    engine.register_fn("exec", move |command: &str| {
        h.borrow_mut().exec(command.to_string());
    });

    let h = host.clone();
    engine.register_fn("confirm_exec", move |command: &str| {
        h.borrow_mut().confirm_exec(command.to_string(), None);
    });

    let h = host.clone();
    engine.register_fn("confirm_exec", move |command: &str, then: FnPtr| {
        h.borrow_mut().confirm_exec(command.to_string(), Some(ScriptFn::new(then)));
    });

    let h = host.clone();
    engine.register_fn("register_mode", move |name: &str, map: Map| -> HostResult {
        let mut bindings = Vec::with_capacity(map.len());
        for (chord, value) in map {
            let keys = parse_chord(&chord)?;
            let type_name = value.type_name().to_string();
            let Some(callback) = value.try_cast::<FnPtr>() else {
                return Err(format!("mode `{name}`: binding `{chord}` must be a function, got {type_name}").into());
            };
            bindings.push((keys, ScriptFn::new(callback)));
        }
        h.borrow_mut().register_mode(name.to_string(), bindings);
        Ok(())
    });

    let h = host.clone();
    engine.register_fn("quit", move || h.borrow_mut().quit());

    let h = host.clone();
    engine.register_fn("push_pager", move |title: &str, text: &str| {
        h.borrow_mut().push_pager(title.to_string(), text.to_string(), Vec::new());
    });

    let h = host.clone();
    engine.register_fn("push_pager", move |title: &str, text: &str, modes: Array| {
        let modes = modes.into_iter().map(|mode| mode.to_string()).collect();
        h.borrow_mut().push_pager(title.to_string(), text.to_string(), modes);
    });

    engine.register_fn("pop_pager", move || host.borrow_mut().pop_pager());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<String>,
        callbacks: Vec<ScriptFn>,
    }

    impl HostApi for RecordingHost {
        fn bind_key(&mut self, keys: KeySequence, callback: ScriptFn) {
            self.calls.push(format!("bind_key:{keys}"));
            self.callbacks.push(callback);
        }

        fn confirm(&mut self, message: String, callback: ScriptFn) {
            self.calls.push(format!("confirm:{message}"));
            self.callbacks.push(callback);
        }

        fn exec(&mut self, command: String) {
            self.calls.push(format!("exec:{command}"));
        }

        fn confirm_exec(&mut self, command: String, then: Option<ScriptFn>) {
            self.calls.push(format!("confirm_exec:{command}:{}", then.is_some()));
        }

        fn register_mode(&mut self, name: String, bindings: Vec<(KeySequence, ScriptFn)>) {
            let mut chords: Vec<String> = bindings.iter().map(|(keys, _)| keys.to_string()).collect();
            chords.sort();
            self.calls.push(format!("register_mode:{name}:{}", chords.join(",")));
        }

        fn quit(&mut self) {
            self.calls.push("quit".to_string());
        }

        fn push_pager(&mut self, title: String, text: String, modes: Vec<String>) {
            self.calls.push(format!("push_pager:{title}:{text}:{}", modes.join(",")));
        }

        fn pop_pager(&mut self) {
            self.calls.push("pop_pager".to_string());
        }
    }

    fn vm() -> (ScriptVm, Rc<RefCell<RecordingHost>>) {
        let recording = Rc::new(RefCell::new(RecordingHost::default()));
        let host: HostRef = recording.clone();
        (ScriptVm::new(host), recording)
    }

    fn eval(vm: &mut ScriptVm, source: &str) -> Result<(), ScriptError> {
        vm.eval(Path::new("test.rhai"), source)
    }

    #[test]
    fn test_host_functions_reach_host() {
        let (mut vm, host) = vm();
        eval(
            &mut vm,
            r#"
            exec("make");
            confirm_exec("rm -rf build");
            confirm_exec("git push", || quit());
            push_pager("help", "line one");
            push_pager("log", "", ["git", "review"]);
            pop_pager();
            quit();
            "#,
        )
        .unwrap();

        assert_eq!(
            host.borrow().calls,
            vec![
                "exec:make",
                "confirm_exec:rm -rf build:false",
                "confirm_exec:git push:true",
                "push_pager:help:line one:",
                "push_pager:log::git,review",
                "pop_pager",
                "quit",
            ]
        );
    }

    #[test]
    fn test_bound_callback_runs_later() {
        let (mut vm, host) = vm();
        eval(&mut vm, r#"bind_key("g g", || exec("git status"));"#).unwrap();
        assert_eq!(host.borrow().calls, vec!["bind_key:g g"]);

        let callback = host.borrow().callbacks[0].clone();
        vm.call(&callback).unwrap();
        assert_eq!(host.borrow().calls[1], "exec:git status");
    }

    #[test]
    fn test_closure_captures_script_variable() {
        let (mut vm, host) = vm();
        eval(&mut vm, r#"let cmd = "cargo test"; bind_key("t", || exec(cmd));"#).unwrap();

        let callback = host.borrow().callbacks[0].clone();
        vm.call(&callback).unwrap();
        assert_eq!(host.borrow().calls[1], "exec:cargo test");
    }

    #[test]
    fn test_later_script_sees_and_overrides_earlier_functions() {
        let (mut vm, host) = vm();
        eval(&mut vm, r#"fn action() { exec("first") }"#).unwrap();
        eval(&mut vm, r#"bind_key("a", Fn("action"));"#).unwrap();
        eval(&mut vm, r#"fn action() { exec("second") }"#).unwrap();

        let callback = host.borrow().callbacks[0].clone();
        vm.call(&callback).unwrap();
        assert_eq!(host.borrow().calls.last().unwrap(), "exec:second");
    }

    #[test]
    fn test_register_mode_collects_bindings() {
        let (mut vm, host) = vm();
        eval(
            &mut vm,
            r#"register_mode("git", #{ "s": || exec("git status"), "c c": || exec("git commit") });"#,
        )
        .unwrap();
        assert_eq!(host.borrow().calls, vec!["register_mode:git:c c,s"]);
    }

    #[test]
    fn test_register_mode_rejects_non_function() {
        let (mut vm, host) = vm();
        let err = eval(&mut vm, r#"register_mode("git", #{ "s": 42 });"#).unwrap_err();
        assert!(err.to_string().contains("must be a function"), "{err}");
        assert!(host.borrow().calls.is_empty());
    }

    #[test]
    fn test_syntax_error_reports_path() {
        let (mut vm, _host) = vm();
        let err = vm.eval(Path::new("/cfg/broken.rhai"), "bind_key(").unwrap_err();
        match err {
            ScriptError::Eval { path, .. } => assert_eq!(path, Path::new("/cfg/broken.rhai")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_chord_is_eval_error() {
        let (mut vm, host) = vm();
        let err = eval(&mut vm, r#"bind_key("hyper-x", || quit());"#).unwrap_err();
        assert!(err.to_string().contains("invalid chord"), "{err}");
        assert!(host.borrow().calls.is_empty());
    }

    #[test]
    fn test_callback_error_is_reported_not_panicked() {
        let (mut vm, host) = vm();
        eval(&mut vm, r#"bind_key("x", || { throw "boom"; });"#).unwrap();

        let callback = host.borrow().callbacks[0].clone();
        let err = vm.call(&callback).unwrap_err();
        assert!(matches!(err, ScriptError::Call { .. }));
        assert!(err.to_string().contains("boom"), "{err}");
    }

    #[test]
    fn test_print_goes_to_log_not_stdout() {
        let (mut vm, _host) = vm();
        eval(&mut vm, r#"print("hello"); debug("there");"#).unwrap();
    }
}
