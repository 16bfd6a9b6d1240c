//! Runs shell commands in the foreground of the terminal.

use std::process::ExitStatus;

use log::{info, warn};

use crate::core::context::{Context, derive_environment};
use crate::core::exec::{ExecError, ProcessRunner, ShellCommand};
use crate::tui::terminal::{Suspended, TerminalControl};

pub struct CommandExecutor {
    shell: String,
    runner: Box<dyn ProcessRunner>,
    control: Box<dyn TerminalControl>,
}

impl CommandExecutor {
    pub fn new(shell: impl Into<String>, runner: Box<dyn ProcessRunner>, control: Box<dyn TerminalControl>) -> Self {
        Self {
            shell: shell.into(),
            runner,
            control,
        }
    }

    /// Runs `command` through the shell with `ctx` exported, blocking until
    /// it exits. The terminal is released for the duration of the child.
    pub fn run(&mut self, command: &str, ctx: &Context) -> Result<ExitStatus, ExecError> {
        let env = derive_environment(ctx, std::env::vars_os())?;
        let shell_command = ShellCommand::new(&self.shell, command, env);

        info!("Running `{command}` via {}", self.shell);
        let _suspended = Suspended::new(&mut *self.control).map_err(ExecError::Suspend)?;
        let status = self.runner.run(&shell_command).map_err(|source| ExecError::Spawn {
            shell: self.shell.clone(),
            source,
        })?;

        if !status.success() {
            warn!("`{command}` exited with {status}");
        }
        Ok(status)
    }
}
