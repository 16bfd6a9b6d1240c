//! Shell invocation: what to run and how to spawn it.
//!
//! Terminal hand-off is not handled here; see `tui::executor`, which wraps
//! a [`ProcessRunner`] call in a terminal suspension.

use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;
use thiserror::Error;

pub const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("could not hand the terminal over: {0}")]
    Suspend(#[source] io::Error),
    #[error("context key `{0}` cannot be exported as an environment variable")]
    InvalidContextKey(String),
    #[error("context value for `{0}` contains a NUL byte")]
    InvalidContextValue(String),
    #[error("failed to run `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },
}

/// A fully resolved `<shell> -c <command>` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub shell: String,
    pub args: Vec<String>,
    /// Complete environment; the child inherits nothing else.
    pub env: Vec<(OsString, OsString)>,
}

impl ShellCommand {
    pub fn new(shell: &str, command: &str, env: Vec<(OsString, OsString)>) -> Self {
        Self {
            shell: shell.to_string(),
            args: vec!["-c".to_string(), command.to_string()],
            env,
        }
    }

    pub fn env_var(&self, name: &str) -> Option<&OsString> {
        self.env.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

/// Runs a shell command to completion.
pub trait ProcessRunner {
    fn run(&mut self, command: &ShellCommand) -> io::Result<ExitStatus>;
}

/// Spawns the real process with stdio connected to the terminal.
#[derive(Debug, Default)]
pub struct InheritedStdio;

impl ProcessRunner for InheritedStdio {
    fn run(&mut self, command: &ShellCommand) -> io::Result<ExitStatus> {
        debug!("Spawning {} {:?}", command.shell, command.args);
        Command::new(&command.shell)
            .args(&command.args)
            .env_clear()
            .envs(command.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
    }
}

/// Shell named by `$SHELL`, falling back to `/bin/sh`.
pub fn shell_from_env() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|shell| !shell.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}
