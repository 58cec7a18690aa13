//! Process execution seam of the bootloader environment access.
//!
//! [`UbootEnv`](super::UbootEnv) never touches `std::process` directly. It asks a
//! [`Runner`] for a started [`Child`], drains the child's stdout and waits for it.
//! Production code uses [`ProcessRunner`], tests substitute a runner that spawns
//! nothing.

use log::warn;
#[cfg(test)]
use mockall::automock;
use std::{
    io::{self, Read},
    process::{Command, ExitStatus, Stdio},
};

/// Starts external commands.
#[cfg_attr(test, automock)]
pub trait Runner {
    /// Starts `program` with `args`. The returned child is already running and
    /// its stdout is captured.
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Box<dyn Child>>;
}

/// A started external command.
pub trait Child {
    /// Hands out the captured stdout stream. Returns `None` if stdout was not
    /// captured or was already taken.
    fn take_stdout(&mut self) -> Option<Box<dyn Read>>;

    /// Blocks until the command terminated.
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

/// Runs commands as real subprocesses.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Box<dyn Child>> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()?;

        Ok(Box::new(ProcessChild {
            inner: child,
            reaped: false,
        }))
    }
}

struct ProcessChild {
    inner: std::process::Child,
    reaped: bool,
}

impl Child for ProcessChild {
    fn take_stdout(&mut self) -> Option<Box<dyn Read>> {
        self.inner
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as Box<dyn Read>)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.inner.wait()?;
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ProcessChild {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }

        // caller bailed out before waiting: don't leave a zombie behind
        if let Err(e) = self.inner.kill() {
            warn!("process_child: failed to kill pid {}: {e}", self.inner.id());
        }
        if let Err(e) = self.inner.wait() {
            warn!("process_child: failed to reap pid {}: {e}", self.inner.id());
        }
    }
}
