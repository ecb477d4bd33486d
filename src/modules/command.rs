//! Run an external command

use crate::runner::{self, Finished};
use anyhow::{Result, bail};
use std::time::Duration;
use tasktree::{Module, Probe};

/// Bounded-wait command execution
///
/// Without a process pattern the status is always unknown, so the command
/// runs on every install. With one, the command counts as applied while a
/// matching process is running (checked with `pgrep`). Not reversible.
#[derive(Debug, Clone, Default)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
    /// `pgrep` pattern for a process the command is expected to start
    pub pattern: String,
    pub ignore_errors: bool,
    /// Kill the command after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Command {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Module for Command {
    fn id(&self) -> String {
        format!("Command: {} {}", self.program, self.args.join(" "))
    }

    fn status(&self) -> Result<Probe> {
        if self.pattern.is_empty() {
            return Ok(Probe::unknown(
                "Cannot discern whether a command has been run or not.",
            ));
        }
        match runner::is_running(&self.pattern) {
            Ok(true) => Ok(Probe::pass(format!("{} is running.", self.pattern))),
            Ok(false) => Ok(Probe::fail(format!("{} is not running.", self.pattern))),
            Err(e) => {
                log::debug!("Process check failed: {e:#}");
                Ok(Probe::unknown("Cannot tell if the process is running."))
            }
        }
    }

    fn install(&self) -> Result<String> {
        let finished = match runner::run_with_timeout(&self.program, &self.args, self.timeout) {
            Ok(finished) => finished,
            Err(e) if self.ignore_errors => return Ok(format!("Ignored error: {e:#}")),
            Err(e) => return Err(e),
        };
        match finished {
            Finished::Exited { success, output } => {
                if success || self.ignore_errors {
                    Ok(output)
                } else {
                    bail!("Command failed: {output}")
                }
            }
            Finished::TimedOut if self.ignore_errors => Ok("Command timed out.".into()),
            Finished::TimedOut => bail!("Command timed out."),
        }
    }

    fn remove(&self) -> Result<String> {
        Ok("Cannot undo a command.".into())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tasktree::Status;

    #[test]
    fn test_status_unknown_without_pattern() {
        let cmd = Command::new("true", Vec::<String>::new());
        assert_eq!(cmd.status().unwrap().status, Status::Unknown);
    }

    #[test]
    fn test_install_output() {
        let cmd = Command::new("sh", ["-c", "echo one; echo two"]);
        assert_eq!(cmd.install().unwrap(), "one; two");
    }

    #[test]
    fn test_failure_and_ignore_errors() {
        let cmd = Command::new("sh", ["-c", "echo broken; exit 2"]);
        let err = cmd.install().unwrap_err();
        assert!(err.to_string().contains("broken"));

        assert_eq!(cmd.ignore_errors(true).install().unwrap(), "broken");
    }

    #[test]
    fn test_timeout() {
        let cmd = Command::new("sleep", ["5"]).timeout(Duration::from_millis(100));
        assert!(cmd.clone().install().is_err());
        assert_eq!(
            cmd.ignore_errors(true).install().unwrap(),
            "Command timed out."
        );
    }

    #[test]
    fn test_id() {
        let cmd = Command::new("systemctl", ["restart", "nginx"]);
        assert_eq!(cmd.id(), "Command: systemctl restart nginx");
    }
}
