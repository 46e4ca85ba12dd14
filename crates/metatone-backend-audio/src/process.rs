//! Waiting on external processes with a deadline.
//!
//! Stdout and stderr are drained on background threads while the child runs
//! so a chatty process cannot block on a full pipe.

use std::io::{ErrorKind, Read};
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Poll interval while waiting for a child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Minimum time given to the readers to reach EOF once the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Captured result of a finished process.
#[derive(Debug)]
pub struct ProcessOutput {
    /// Exit status.
    pub status: ExitStatus,
    /// Captured stdout (lossy UTF-8); empty if not piped.
    pub stdout: String,
    /// Captured stderr (lossy UTF-8); empty if not piped.
    pub stderr: String,
}

impl ProcessOutput {
    /// Exit code, or -1 when the process was killed by a signal.
    pub fn exit_code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }
}

/// Outcome of [`wait_with_timeout`].
#[derive(Debug)]
pub enum WaitOutcome {
    /// The process exited on its own.
    Exited(ProcessOutput),
    /// The deadline passed; the process was killed.
    TimedOut,
}

type Captured = Arc<Mutex<Vec<u8>>>;

/// Copies `pipe` into a shared buffer on a background thread and signals
/// `done` at EOF.
fn drain<R: Read + Send + 'static>(pipe: Option<R>, done: &Sender<()>) -> Option<Captured> {
    pipe.map(|mut pipe| {
        let captured = Captured::default();
        let sink = Arc::clone(&captured);
        let done = done.clone();
        thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = done.send(());
        });
        captured
    })
}

fn snapshot(captured: &Option<Captured>) -> String {
    captured
        .as_ref()
        .and_then(|c| c.lock().ok().map(|buf| String::from_utf8_lossy(&buf).into_owned()))
        .unwrap_or_default()
}

/// Waits for `child` to exit, killing it once `timeout` has elapsed.
///
/// A grandchild that inherited the pipes can keep them open after the child
/// exits, so the readers are only waited on until the deadline (or a short
/// grace period) and are then detached with whatever they captured.
pub fn wait_with_timeout(mut child: Child, timeout: Duration) -> std::io::Result<WaitOutcome> {
    let (done_tx, done_rx) = mpsc::channel();
    let stdout = drain(child.stdout.take(), &done_tx);
    let stderr = drain(child.stderr.take(), &done_tx);
    drop(done_tx);
    let start = Instant::now();

    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(WaitOutcome::TimedOut);
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    };

    let readers = stdout.iter().chain(stderr.iter()).count();
    for _ in 0..readers {
        let wait = timeout.saturating_sub(start.elapsed()).max(DRAIN_GRACE);
        if done_rx.recv_timeout(wait).is_err() {
            debug!(
                pid = child.id(),
                "output pipes still open after exit; detaching readers"
            );
            break;
        }
    }

    Ok(WaitOutcome::Exited(ProcessOutput {
        status,
        stdout: snapshot(&stdout),
        stderr: snapshot(&stderr),
    }))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    fn sh(script: &str) -> Child {
        Command::new("sh")
            .args(["-c", script])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap()
    }

    #[test]
    fn test_captures_stdout_and_stderr() {
        let child = sh("echo out; echo err 1>&2");
        match wait_with_timeout(child, Duration::from_secs(5)).unwrap() {
            WaitOutcome::Exited(output) => {
                assert!(output.status.success());
                assert_eq!(output.stdout.trim(), "out");
                assert_eq!(output.stderr.trim(), "err");
            }
            WaitOutcome::TimedOut => panic!("unexpected timeout"),
        }
    }

    #[test]
    fn test_reports_exit_code() {
        let child = sh("exit 3");
        match wait_with_timeout(child, Duration::from_secs(5)).unwrap() {
            WaitOutcome::Exited(output) => assert_eq!(output.exit_code(), 3),
            WaitOutcome::TimedOut => panic!("unexpected timeout"),
        }
    }

    #[test]
    fn test_large_output_does_not_block() {
        let child = sh("i=0; while [ $i -lt 20000 ]; do echo 0123456789; i=$((i+1)); done");
        match wait_with_timeout(child, Duration::from_secs(30)).unwrap() {
            WaitOutcome::Exited(output) => assert!(output.stdout.len() >= 200_000),
            WaitOutcome::TimedOut => panic!("unexpected timeout"),
        }
    }

    #[test]
    fn test_times_out() {
        let child = sh("exec sleep 10");
        let start = Instant::now();
        let outcome = wait_with_timeout(child, Duration::from_millis(200)).unwrap();
        assert!(matches!(outcome, WaitOutcome::TimedOut));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_background_grandchild_does_not_extend_wait() {
        let child = sh("sleep 8 & echo done");
        let start = Instant::now();
        match wait_with_timeout(child, Duration::from_secs(1)).unwrap() {
            WaitOutcome::Exited(output) => {
                assert!(output.status.success());
                assert_eq!(output.stdout.trim(), "done");
            }
            WaitOutcome::TimedOut => panic!("unexpected timeout"),
        }
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
