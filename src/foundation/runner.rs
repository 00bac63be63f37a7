//! Cooperative external-process runner.
//!
//! Grounded in `process_ext::run_command_with_timeout_capture_stderr`
//! (dedicated reader threads, a `try_wait()` poll loop) generalized with the
//! cancellation-predicate polling from the legacy
//! `break_circular.py::Execute_Check_Output`: instead of a single hard
//! deadline, the loop checks a `CancellationFlag` every ~10ms and terminates
//! the child gracefully (then forcibly) when it is set.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::foundation::cancel::CancellationFlag;

/// Polling cadence between `try_wait()` iterations; "~10ms granularity is
/// adequate" per the cooperative-cancellation design note (§9).
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Grace period after `kill()` before giving up on a clean exit and just
/// joining the reader threads with whatever was captured.
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Mirrors the exit-code convention of §6.3: `(1, stdout)` on success,
/// `(-1, message)` on failure, `(-2, partial_stdout)` on cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success(String),
    Failed(String),
    Cancelled(String),
}

impl RunOutcome {
    pub fn code(&self) -> i32 {
        match self {
            RunOutcome::Success(_) => 1,
            RunOutcome::Failed(_) => -1,
            RunOutcome::Cancelled(_) => -2,
        }
    }
}

/// Runs `cmd` to completion, polling `cancel` between wait iterations.
/// stdout/stderr are captured on dedicated reader threads so they drain
/// even while the command is still running (avoiding a full pipe buffer
/// stalling the child).
pub fn run_cooperative(mut cmd: Command, cancel: &CancellationFlag) -> std::io::Result<RunOutcome> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn()?;

    let mut stdout = child.stdout.take();
    let stdout_handle = std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(out) = stdout.as_mut() {
            let _ = out.read_to_string(&mut buf);
        }
        buf
    });

    let mut stderr = child.stderr.take();
    let stderr_handle = std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(err) = stderr.as_mut() {
            let _ = err.read_to_string(&mut buf);
        }
        buf
    });

    loop {
        if let Some(status) = child.try_wait()? {
            let stdout_text = stdout_handle.join().unwrap_or_default();
            let stderr_text = stderr_handle.join().unwrap_or_default();
            return Ok(classify(status.code(), &stdout_text, &stderr_text));
        }

        if cancel.is_requested() {
            drop(child.kill());
            let deadline = Instant::now() + TERMINATE_GRACE;
            while Instant::now() < deadline && child.try_wait()?.is_none() {
                std::thread::sleep(POLL_INTERVAL);
            }
            let _ = child.wait();
            let stdout_text = stdout_handle.join().unwrap_or_default();
            return Ok(RunOutcome::Cancelled(stdout_text.trim().to_string()));
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

fn classify(code: Option<i32>, stdout: &str, stderr: &str) -> RunOutcome {
    let diagnostic = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
    match code {
        Some(0) | Some(1) => RunOutcome::Success(stdout.trim().to_string()),
        Some(127) => RunOutcome::Failed(format!("tool not found or exited abnormally: {diagnostic}")),
        Some(c) if c <= 125 => RunOutcome::Failed(format!("command failed (exit {c}): {diagnostic}")),
        Some(c) => RunOutcome::Failed(format!("command crashed (exit {c}): {diagnostic}")),
        None => RunOutcome::Failed("command terminated by signal".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_command(arg: &str) -> Command {
        let mut cmd = Command::new("echo");
        cmd.arg(arg);
        cmd
    }

    #[test]
    fn success_exit_code_zero_captures_stdout() {
        let cancel = CancellationFlag::new();
        let outcome = run_cooperative(echo_command("hello"), &cancel).unwrap();
        assert_eq!(outcome, RunOutcome::Success("hello".to_string()));
        assert_eq!(outcome.code(), 1);
    }

    #[test]
    fn missing_binary_is_classified_as_failure() {
        let cancel = CancellationFlag::new();
        let mut cmd = Command::new("definitely-not-a-real-binary-xyz");
        cmd.arg("--version");
        let err = run_cooperative(cmd, &cancel);
        assert!(err.is_err());
    }

    #[test]
    fn pre_cancelled_flag_still_lets_short_commands_finish_or_abort() {
        let cancel = CancellationFlag::new();
        cancel.request();
        let outcome = run_cooperative(echo_command("hi"), &cancel).unwrap();
        // A command that completes before the first poll iteration may still
        // observe success; otherwise cancellation must win.
        assert!(matches!(outcome, RunOutcome::Success(_) | RunOutcome::Cancelled(_)));
    }
}
