// Project Gate - Command Execution
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Runs a command line through the host shell in an already-guarded
// working directory. Output is captured up to a combined byte cap; past
// the cap the child is killed and the call fails. No timeout.

use crate::error::ToolError;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

const READ_CHUNK: usize = 8192;

/// How long to keep collecting the other stream after an overflow kill
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Captured output of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

enum Event {
    Data(Stream, Vec<u8>),
    Closed,
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Forward one pipe's chunks to the waiter. Exits on EOF, on a read error,
/// or once the waiter has stopped listening.
fn pump<R: Read + Send + 'static>(mut pipe: R, stream: Stream, tx: Sender<Event>) {
    thread::spawn(move || {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(Event::Data(stream, chunk[..n].to_vec())).is_err() {
                        return;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let _ = tx.send(Event::Closed);
    });
}

/// Both streams charged against one byte budget
struct Capture {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    used: usize,
    cap: usize,
    overflowed: bool,
}

impl Capture {
    fn new(cap: usize) -> Self {
        Self { stdout: Vec::new(), stderr: Vec::new(), used: 0, cap, overflowed: false }
    }

    /// Keep what fits. Returns true on the chunk that first crosses the cap.
    fn push(&mut self, stream: Stream, bytes: &[u8]) -> bool {
        let room = self.cap.saturating_sub(self.used);
        let kept = &bytes[..room.min(bytes.len())];
        match stream {
            Stream::Stdout => self.stdout.extend_from_slice(kept),
            Stream::Stderr => self.stderr.extend_from_slice(kept),
        }
        self.used = self.used.saturating_add(bytes.len());
        if self.used > self.cap && !self.overflowed {
            self.overflowed = true;
            return true;
        }
        false
    }
}

fn next_event(rx: &Receiver<Event>, deadline: Option<Instant>) -> Option<Event> {
    match deadline {
        None => rx.recv().ok(),
        Some(at) => match rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        },
    }
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Run `command` in `cwd`. Non-zero exit, signal death, spawn failure and
/// cap overflow are all process errors; partial output is kept on them.
pub fn run_command(command: &str, cwd: &Path, max_output: usize) -> Result<CommandOutput, ToolError> {
    log::info!("exec: {:?} in {:?}", command, cwd);

    let mut child = shell_command(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ToolError::process(format!("Failed to spawn command: {}", e)))?;

    let (tx, rx) = mpsc::channel();
    let mut open = 0;
    if let Some(pipe) = child.stdout.take() {
        pump(pipe, Stream::Stdout, tx.clone());
        open += 1;
    }
    if let Some(pipe) = child.stderr.take() {
        pump(pipe, Stream::Stderr, tx.clone());
        open += 1;
    }
    drop(tx);

    // Whichever stream crosses the cap ends the child. Descendants that
    // still hold a pipe only get KILL_GRACE before reading stops.
    let mut capture = Capture::new(max_output);
    let mut deadline = None;
    while open > 0 {
        let Some(event) = next_event(&rx, deadline) else { break };
        match event {
            Event::Data(stream, bytes) => {
                if capture.push(stream, &bytes) {
                    let _ = child.kill();
                    deadline = Some(Instant::now() + KILL_GRACE);
                }
            }
            Event::Closed => open -= 1,
        }
    }

    let status = child
        .wait()
        .map_err(|e| ToolError::process(format!("Failed to wait for command: {}", e)))?;

    let overflow = capture.overflowed;
    let stdout = lossy(capture.stdout);
    let stderr = lossy(capture.stderr);

    if overflow {
        log::warn!("exec: output exceeded {} bytes, child killed", max_output);
        return Err(ToolError::Process {
            message: format!("Command output exceeded maximum of {} bytes", max_output),
            stdout: Some(stdout),
            stderr: Some(stderr),
            exit_code: status.code(),
        });
    }

    if !status.success() {
        let message = match status.code() {
            Some(code) => format!("Command failed with exit code {}: {}", code, command),
            None => format!("Command terminated by signal: {}", command),
        };
        log::warn!("exec: {}", message);
        return Err(ToolError::Process {
            message,
            stdout: Some(stdout),
            stderr: Some(stderr),
            exit_code: status.code(),
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_OUTPUT_BYTES;
    use tempfile::tempdir;

    #[test]
    fn echo_succeeds_with_empty_stderr() {
        let dir = tempdir().unwrap();
        let out = run_command("echo hi", dir.path(), DEFAULT_MAX_OUTPUT_BYTES).unwrap();
        assert!(out.stdout.contains("hi"));
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn non_zero_exit_is_process_error() {
        let dir = tempdir().unwrap();
        let err = run_command("exit 1", dir.path(), DEFAULT_MAX_OUTPUT_BYTES).unwrap_err();
        assert_eq!(err.kind(), "process");
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn failure_keeps_partial_output() {
        let dir = tempdir().unwrap();
        let err = run_command("echo before; echo oops >&2; exit 3", dir.path(), DEFAULT_MAX_OUTPUT_BYTES)
            .unwrap_err();
        match err {
            ToolError::Process { stdout, stderr, exit_code, .. } => {
                assert_eq!(stdout.as_deref(), Some("before\n"));
                assert_eq!(stderr.as_deref(), Some("oops\n"));
                assert_eq!(exit_code, Some(3));
            }
            other => panic!("expected process error, got {:?}", other),
        }
    }

    #[test]
    fn runs_in_given_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let out = run_command("ls", dir.path(), DEFAULT_MAX_OUTPUT_BYTES).unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[test]
    fn output_over_cap_fails() {
        let dir = tempdir().unwrap();
        let err = run_command("yes | head -c 100000", dir.path(), 1024).unwrap_err();
        assert_eq!(err.kind(), "process");
        assert!(err.to_string().contains("exceeded maximum of 1024 bytes"));
        if let ToolError::Process { stdout, .. } = err {
            assert!(stdout.unwrap().len() <= 1024);
        }
    }

    #[test]
    fn stderr_overflow_kills_long_running_command() {
        let dir = tempdir().unwrap();
        let started = Instant::now();
        let err = run_command("head -c 5000 /dev/zero >&2; sleep 6", dir.path(), 1024).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
        assert!(err.to_string().contains("exceeded maximum of 1024 bytes"));
        if let ToolError::Process { stderr, .. } = err {
            assert!(stderr.unwrap().len() <= 1024);
        }
    }

    #[test]
    fn stdout_overflow_kills_long_running_command() {
        let dir = tempdir().unwrap();
        let started = Instant::now();
        let err = run_command("head -c 5000 /dev/zero; sleep 6", dir.path(), 1024).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
        assert_eq!(err.kind(), "process");
    }

    #[test]
    fn cap_is_shared_across_streams() {
        let mut capture = Capture::new(10);
        assert!(!capture.push(Stream::Stdout, b"123456"));
        assert!(capture.push(Stream::Stderr, b"abcdef"));
        assert!(!capture.push(Stream::Stdout, b"more"));
        assert_eq!(capture.stdout, b"123456");
        assert_eq!(capture.stderr, b"abcd");
    }

    #[test]
    fn missing_directory_fails_to_spawn() {
        let dir = tempdir().unwrap();
        let err = run_command("echo hi", &dir.path().join("ghost"), DEFAULT_MAX_OUTPUT_BYTES).unwrap_err();
        assert_eq!(err.kind(), "process");
    }
}
