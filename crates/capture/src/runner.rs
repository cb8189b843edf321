//! Child-process execution with a wall-clock timeout.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Exit code synthesized for a timed-out child, mirroring `timeout(1)`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code synthesized when the shell itself cannot be spawned.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Per-stream capture bound. Timing is the measurement; output beyond this
/// is discarded, not an error.
const STREAM_CAP: u64 = 256 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of one command run. Never an error: timeouts, spawn
/// failures, and non-zero exits are all representable as data.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub timed_out: bool,
}

/// Run `command` through the platform shell in `cwd`, capped at `timeout`.
///
/// On timeout the child is killed and the outcome carries exit code 124
/// with stderr `"timeout"`. Output is decoded lossily — invalid byte
/// sequences become replacement characters rather than failing the run.
pub fn run_command(command: &str, cwd: &Path, timeout: Duration) -> RunOutcome {
    let started = Instant::now();

    let mut child = match shell_command(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return RunOutcome {
                exit_code: SPAWN_FAILURE_EXIT_CODE,
                stdout: String::new(),
                stderr: format!("spawn failed: {}", e),
                elapsed: started.elapsed(),
                timed_out: false,
            }
        }
    };

    // Drain pipes on helper threads so a chatty child cannot deadlock
    // against a full pipe while we poll for completion.
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdout_thread = std::thread::spawn(move || drain(stdout_pipe));
    let stderr_thread = std::thread::spawn(move || drain(stderr_pipe));

    let deadline = started + timeout;
    let mut timed_out = false;
    let mut status = None;
    loop {
        match child.try_wait() {
            Ok(Some(s)) => {
                status = Some(s);
                break;
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    timed_out = true;
                    let _ = child.kill();
                    let _ = child.wait();
                    break;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                break;
            }
        }
    }

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();
    let elapsed = started.elapsed();

    if timed_out {
        return RunOutcome {
            exit_code: TIMEOUT_EXIT_CODE,
            stdout,
            stderr: "timeout".to_string(),
            elapsed,
            timed_out: true,
        };
    }

    RunOutcome {
        // A signal-killed child has no code; fold it to a generic failure.
        exit_code: status.and_then(|s| s.code()).unwrap_or(1),
        stdout,
        stderr,
        elapsed,
        timed_out: false,
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

fn drain<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        let _ = pipe.take(STREAM_CAP).read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
