//! External process helpers used by modules and fact gathering

use anyhow::{Context, Result, bail};
use std::io::{Read, Write};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a bounded wait polls the child
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run a command and capture output
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("Command failed: {}", stderr.trim())
    }
}

/// Run a command, returning its exit status and combined output
pub fn run_combined(cmd: &str, args: &[&str]) -> Result<(bool, String)> {
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;
    Ok((output.status.success(), combined(&output)))
}

/// Run a command with `input` on its stdin, returning status and output
pub fn run_with_input(cmd: &str, args: &[&str], input: &str) -> Result<(bool, String)> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .with_context(|| format!("Failed to write to {cmd}"))?;
    }
    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for {cmd}"))?;
    Ok((output.status.success(), combined(&output)))
}

/// Outcome of a bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finished {
    /// The command exited; combined output with newlines flattened
    Exited { success: bool, output: String },
    /// The command was killed after the timeout
    TimedOut,
}

/// Run a command, killing it if it runs longer than `timeout`
///
/// `None` waits indefinitely. Output is drained on background threads so a
/// chatty child cannot block on a full pipe while we poll it.
pub fn run_with_timeout(cmd: &str, args: &[String], timeout: Option<Duration>) -> Result<Finished> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().context("Failed to poll command")? {
            break status;
        }
        if timeout.is_some_and(|limit| started.elapsed() >= limit) {
            log::debug!("Killing {cmd} after {timeout:?}");
            // The child may exit between the poll and the kill.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Finished::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    };

    let mut text = collect(stdout);
    text.push_str(&collect(stderr));
    Ok(Finished::Exited {
        success: status.success(),
        output: flatten(text.trim()),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Check whether any process matches `pattern` (via `pgrep`)
///
/// `pgrep` exits 1 when nothing matches, which is not an error here.
pub fn is_running(pattern: &str) -> Result<bool> {
    let mut child = Command::new("pgrep")
        .arg(pattern)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to execute pgrep")?;

    let mut out = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout
            .read_to_string(&mut out)
            .context("Failed to read pgrep output")?;
    }
    let status = child.wait().context("Failed to wait for pgrep")?;
    match status.code() {
        Some(0 | 1) => Ok(!out.trim().is_empty()),
        _ => bail!("pgrep failed for pattern {pattern:?}"),
    }
}

fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

fn flatten(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join("; ")
}
