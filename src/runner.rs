//! Sequential execution of the benchmarked command
//!
//! Each run spawns the command through `sh -c`, waits for it to exit, and only
//! then feeds its captured stdout into the [`ResultSet`]. Runs never overlap.

use crate::cancel::CancellationToken;
use crate::error::{BenchError, Result};
use crate::progress::ProgressBar;
use crate::result_set::ResultSet;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::{self, Read, Write};
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Runs a command line and returns its stdout split into lines
pub trait CommandExecutor {
    /// Run `command_line` to completion and capture its stdout.
    ///
    /// Returns [`BenchError::Cancelled`] if `cancel` fires before the command
    /// exits, after the command has been terminated.
    fn execute_captured(
        &mut self,
        command_line: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>>;
}

/// Executes command lines with a POSIX shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    /// Shell used to interpret the command line
    pub shell: PathBuf,
    /// How often the cancellation token is checked while the command runs
    pub poll_interval: Duration,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            shell: PathBuf::from("/bin/sh"),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl ShellExecutor {
    fn spawn(&self, command_line: &str) -> Result<Child> {
        Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            // Own process group, so cancellation reaches everything the shell started
            .process_group(0)
            .spawn()
            .map_err(|e| BenchError::process(command_line, format!("cannot start: {}", e)))
    }

    fn wait(
        &self,
        child: &mut Child,
        command_line: &str,
        cancel: &CancellationToken,
    ) -> Result<ExitStatus> {
        loop {
            let polled = child
                .try_wait()
                .map_err(|e| BenchError::process(command_line, format!("wait failed: {}", e)))?;
            if let Some(status) = polled {
                return Ok(status);
            }
            if cancel.is_cancelled() {
                terminate(child);
                return Err(BenchError::Cancelled);
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// Kill the child's process group and reap the child
fn terminate(child: &mut Child) {
    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(errno) = killpg(pgid, Signal::SIGKILL) {
        warn!(pgid = pgid.as_raw(), %errno, "failed to kill process group");
        let _ = child.kill();
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "failed to reap cancelled command");
    }
    debug!(pgid = pgid.as_raw(), "cancelled command terminated");
}

impl CommandExecutor for ShellExecutor {
    fn execute_captured(
        &mut self,
        command_line: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let mut child = self.spawn(command_line)?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| BenchError::process(command_line, "stdout was not captured"))?;

        // Drain stdout on a helper thread so a full pipe cannot block the child
        // while this thread waits for it.
        let (status, captured) = thread::scope(|scope| {
            let reader = scope.spawn(move || -> io::Result<Vec<u8>> {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf)?;
                Ok(buf)
            });
            let status = self.wait(&mut child, command_line, cancel);
            (status, reader.join())
        });

        let status = status?;
        let bytes = match captured {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return Err(BenchError::io("reading command output", e)),
            Err(_) => {
                return Err(BenchError::process(command_line, "output reader panicked"));
            }
        };

        if !status.success() {
            return Err(BenchError::process(command_line, status.to_string()));
        }

        let text = String::from_utf8(bytes).map_err(|source| BenchError::InvalidUtf8 {
            command: command_line.to_string(),
            source,
        })?;
        let lines: Vec<String> = text
            .lines()
            .map(str::to_string)
            .collect();
        trace!(command = command_line, lines = lines.len(), "captured output");
        Ok(lines)
    }
}

/// Result of the run loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Samples of every completed run
    pub results: ResultSet,
    /// Number of runs that completed and were recorded
    pub completed: usize,
    /// True when the loop stopped on cancellation
    pub interrupted: bool,
}

/// Run `command_line` `runs` times and aggregate its `label,value` lines.
///
/// A run's lines are appended only after the run has exited successfully.
/// Any failure or malformed line aborts the loop; cancellation stops it and
/// returns the runs completed so far.
pub fn run_benchmark<E, W>(
    executor: &mut E,
    command_line: &str,
    runs: usize,
    cancel: &CancellationToken,
    progress: &mut ProgressBar<W>,
) -> Result<RunOutcome>
where
    E: CommandExecutor + ?Sized,
    W: Write,
{
    let mut results = ResultSet::new();
    let mut completed = 0;
    let mut interrupted = false;

    progress.update(0);
    while completed < runs {
        if cancel.is_cancelled() {
            interrupted = true;
            break;
        }

        let lines = match executor.execute_captured(command_line, cancel) {
            Ok(lines) => lines,
            Err(BenchError::Cancelled) => {
                interrupted = true;
                break;
            }
            Err(e) => {
                progress.finish();
                return Err(e);
            }
        };

        for line in &lines {
            if let Err(e) = results.append_line(line) {
                progress.finish();
                return Err(e);
            }
        }

        completed += 1;
        debug!(run = completed, of = runs, lines = lines.len(), "run completed");
        progress.update(completed);
    }
    progress.finish();

    if interrupted {
        warn!(completed, of = runs, "benchmark run interrupted");
    }

    Ok(RunOutcome {
        results,
        completed,
        interrupted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Instant;

    /// Replays canned outputs, optionally cancelling after a number of runs
    struct ScriptedExecutor {
        outputs: VecDeque<Result<Vec<String>>>,
        calls: usize,
        cancel_after: Option<usize>,
    }

    impl ScriptedExecutor {
        fn new(outputs: Vec<Result<Vec<&str>>>) -> Self {
            Self {
                outputs: outputs
                    .into_iter()
                    .map(|o| o.map(|lines| lines.into_iter().map(String::from).collect()))
                    .collect(),
                calls: 0,
                cancel_after: None,
            }
        }
    }

    impl CommandExecutor for ScriptedExecutor {
        fn execute_captured(
            &mut self,
            _command_line: &str,
            cancel: &CancellationToken,
        ) -> Result<Vec<String>> {
            self.calls += 1;
            if self.cancel_after == Some(self.calls) {
                cancel.cancel();
                return Err(BenchError::Cancelled);
            }
            self.outputs.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn hidden() -> ProgressBar<io::Sink> {
        ProgressBar::hidden(0)
    }

    #[test]
    fn test_run_loop_aggregates_runs() {
        let mut executor = ScriptedExecutor::new(vec![
            Ok(vec!["lat,10", "thr,100"]),
            Ok(vec!["lat,20", "thr,200"]),
            Ok(vec!["lat,30", "thr,300"]),
        ]);
        let outcome =
            run_benchmark(&mut executor, "bench", 3, &CancellationToken::new(), &mut hidden())
                .unwrap();
        assert_eq!(outcome.completed, 3);
        assert!(!outcome.interrupted);
        assert_eq!(outcome.results.samples("lat").unwrap(), &[10, 20, 30]);
        assert_eq!(outcome.results.samples("thr").unwrap(), &[100, 200, 300]);
        assert_eq!(executor.calls, 3);
    }

    #[test]
    fn test_run_loop_stops_on_process_failure() {
        let mut executor = ScriptedExecutor::new(vec![
            Ok(vec!["lat,10"]),
            Err(BenchError::process("bench", "exit status: 1")),
            Ok(vec!["lat,30"]),
        ]);
        let err = run_benchmark(&mut executor, "bench", 3, &CancellationToken::new(), &mut hidden())
            .unwrap_err();
        assert!(matches!(err, BenchError::ProcessFailure { .. }));
        assert_eq!(executor.calls, 2);
    }

    #[test]
    fn test_run_loop_stops_on_malformed_line() {
        let mut executor = ScriptedExecutor::new(vec![Ok(vec!["lat,10", "garbage"])]);
        let err = run_benchmark(&mut executor, "bench", 5, &CancellationToken::new(), &mut hidden())
            .unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(executor.calls, 1);
    }

    #[test]
    fn test_run_loop_cancelled_mid_run_keeps_completed_runs() {
        let mut executor = ScriptedExecutor::new(vec![
            Ok(vec!["lat,10"]),
            Ok(vec!["lat,20"]),
        ]);
        executor.cancel_after = Some(3);
        let cancel = CancellationToken::new();
        let outcome = run_benchmark(&mut executor, "bench", 10, &cancel, &mut hidden()).unwrap();
        assert!(outcome.interrupted);
        assert_eq!(outcome.completed, 2);
        assert_eq!(outcome.results.samples("lat").unwrap(), &[10, 20]);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_run_loop_cancelled_before_start() {
        let mut executor = ScriptedExecutor::new(vec![Ok(vec!["lat,10"])]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = run_benchmark(&mut executor, "bench", 3, &cancel, &mut hidden()).unwrap();
        assert!(outcome.interrupted);
        assert_eq!(outcome.completed, 0);
        assert!(outcome.results.is_empty());
        assert_eq!(executor.calls, 0);
    }

    #[test]
    fn test_run_loop_draws_progress() {
        let mut executor = ScriptedExecutor::new(vec![Ok(vec!["a,1"]), Ok(vec!["a,2"])]);
        let mut buf = Vec::new();
        {
            let mut bar = ProgressBar::new(&mut buf, 2).with_width(2);
            run_benchmark(&mut executor, "bench", 2, &CancellationToken::new(), &mut bar)
                .unwrap();
        }
        let drawn = String::from_utf8(buf).unwrap();
        assert!(drawn.contains("[..] 0/2"));
        assert!(drawn.contains("[#.] 1/2"));
        assert!(drawn.contains("[##] 2/2"));
    }

    #[test]
    fn test_shell_executor_captures_lines() {
        let mut shell = ShellExecutor::default();
        let lines = shell
            .execute_captured("printf 'lat,10\\nthr,20\\n'", &CancellationToken::new())
            .unwrap();
        assert_eq!(lines, vec!["lat,10", "thr,20"]);
    }

    #[test]
    fn test_shell_executor_supports_shell_syntax() {
        let mut shell = ShellExecutor::default();
        let lines = shell
            .execute_captured("for i in 1 2 3; do echo \"n,$i\"; done", &CancellationToken::new())
            .unwrap();
        assert_eq!(lines, vec!["n,1", "n,2", "n,3"]);
    }

    #[test]
    fn test_shell_executor_large_output() {
        let mut shell = ShellExecutor::default();
        let lines = shell
            .execute_captured(
                "i=0; while [ $i -lt 20000 ]; do echo \"label_$i,$i\"; i=$((i+1)); done",
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(lines.len(), 20000);
    }

    #[test]
    fn test_shell_executor_rejects_invalid_utf8() {
        let err = ShellExecutor::default()
            .execute_captured("printf 'l\\377at,5\\n'", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidUtf8 { .. }));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_run_benchmark_aborts_on_invalid_utf8() {
        let mut progress = ProgressBar::new(Vec::new(), 2);
        let err = run_benchmark(
            &mut ShellExecutor::default(),
            "printf 'lat,5\\n\\377\\n'",
            2,
            &CancellationToken::new(),
            &mut progress,
        )
        .unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_shell_executor_non_zero_exit() {
        let mut shell = ShellExecutor::default();
        let err = shell
            .execute_captured("echo lat,1; exit 3", &CancellationToken::new())
            .unwrap_err();
        match err {
            BenchError::ProcessFailure { command, reason } => {
                assert_eq!(command, "echo lat,1; exit 3");
                assert!(reason.contains('3'), "reason: {}", reason);
            }
            other => panic!("expected ProcessFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_shell_executor_missing_shell() {
        let mut shell = ShellExecutor {
            shell: PathBuf::from("/nonexistent/sh"),
            ..ShellExecutor::default()
        };
        let err = shell
            .execute_captured("true", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, BenchError::ProcessFailure { .. }));
    }

    #[test]
    fn test_shell_executor_cancellation_kills_command() {
        let mut shell = ShellExecutor::default();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let start = Instant::now();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            trigger.cancel();
        });
        let err = shell.execute_captured("sleep 30; echo late,1", &cancel).unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, BenchError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
