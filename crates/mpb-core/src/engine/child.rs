//! One supervised invocation of the benchmark binary.
//!
//! The binary is spawned with the config file path as its only argument and
//! its own directory as working directory. stdout and stderr are pumped into
//! a single line stream (the binary reports planner errors on stderr, with
//! the same `<stats>` markers as regular completions) and handed to the
//! caller line by line. A deadline, if set, kills the child.

use super::memory::MemoryLimit;
use crate::errors::{MpbError, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// Marker the binary prints once per finished repetition (successful or not).
pub const STATS_MARKER: &str = "<stats>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillMode {
    /// SIGKILL right away.
    Immediate,
    /// SIGTERM first so the binary can flush its results file, SIGKILL after
    /// the grace period. Unix only; elsewhere this degrades to immediate.
    Graceful { grace: Duration },
}

#[derive(Debug, Clone)]
pub struct ChildOptions {
    pub binary: PathBuf,
    pub config: PathBuf,
    pub cwd: PathBuf,
    pub deadline: Option<Duration>,
    pub kill_mode: KillMode,
    pub memory_limit: Option<MemoryLimit>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChildOutcome {
    /// Exit code; on unix a signal death is reported as the negated signal
    /// number. `None` if the status carried neither.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl ChildOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

fn pump<R>(reader: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
}

async fn kill_child(child: &mut Child, mode: KillMode) {
    #[cfg(not(unix))]
    let _ = mode;
    #[cfg(unix)]
    if let KillMode::Graceful { grace } = mode {
        if let Some(pid) = child.id() {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            if tokio::time::timeout(grace, child.wait()).await.is_ok() {
                return;
            }
            debug!(pid, "child ignored SIGTERM within grace period");
        }
    }
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill benchmark binary");
    }
}

/// Run the binary to completion or deadline, feeding every output line to
/// `on_line` (already newline-stripped, stdout and stderr interleaved).
pub async fn supervise<F>(opts: &ChildOptions, mut on_line: F) -> Result<ChildOutcome>
where
    F: FnMut(&str),
{
    let mut cmd = Command::new(&opts.binary);
    cmd.arg(&opts.config)
        .current_dir(&opts.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(limit) = opts.memory_limit {
        super::memory::limit_address_space(&mut cmd, limit);
    }

    let mut child = cmd.spawn().map_err(|source| MpbError::Spawn {
        binary: opts.binary.clone(),
        source,
    })?;

    let (tx, mut rx) = mpsc::channel::<String>(64);
    if let Some(stdout) = child.stdout.take() {
        pump(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        pump(stderr, tx.clone());
    }
    drop(tx);

    let deadline = opts.deadline.map(|d| Instant::now() + d);
    let mut timed_out = false;

    loop {
        let line = match deadline {
            Some(deadline) => tokio::select! {
                line = rx.recv() => line,
                _ = sleep_until(deadline) => {
                    timed_out = true;
                    kill_child(&mut child, opts.kill_mode).await;
                    break;
                }
            },
            None => rx.recv().await,
        };
        match line {
            Some(line) => on_line(&line),
            None => break,
        }
    }
    // Lines buffered between the deadline firing and the pumps observing EOF
    // still belong in the log.
    while let Some(line) = rx.recv().await {
        on_line(&line);
    }

    let status = child.wait().await.map_err(|source| MpbError::Spawn {
        binary: opts.binary.clone(),
        source,
    })?;
    let mut exit_code = status.code();
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        exit_code = exit_code.or_else(|| status.signal().map(|s| -s));
    }
    Ok(ChildOutcome {
        exit_code,
        timed_out,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("benchmark");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn opts(binary: PathBuf, deadline: Option<Duration>) -> ChildOptions {
        let cwd = binary.parent().unwrap().to_path_buf();
        ChildOptions {
            binary,
            config: PathBuf::from("config.json"),
            cwd,
            deadline,
            kill_mode: KillMode::Immediate,
            memory_limit: None,
        }
    }

    #[tokio::test]
    async fn collects_lines_from_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(
            dir.path(),
            "echo 'planning run 1'\n\
             echo '<stats> ok </stats>'\n\
             echo '<stats> Error </stats>' >&2",
        );
        let mut lines = Vec::new();
        let out = supervise(&opts(binary, None), |line| lines.push(line.to_string()))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(lines.iter().filter(|l| l.contains(STATS_MARKER)).count(), 2);
        assert!(lines.iter().any(|l| l == "planning run 1"));
    }

    #[tokio::test]
    async fn reports_nonzero_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "exit 3");
        let out = supervise(&opts(binary, None), |_| {}).await.unwrap();
        assert!(!out.success());
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.timed_out);
    }

    #[tokio::test]
    async fn deadline_kills_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "echo started\nsleep 300");
        let started = std::time::Instant::now();
        let out = supervise(
            &opts(binary, Some(Duration::from_millis(200))),
            |_| {},
        )
        .await
        .unwrap();
        assert!(out.timed_out);
        assert!(started.elapsed() < Duration::from_secs(30));
        // SIGKILL shows up as a negated signal number.
        assert_eq!(out.exit_code, Some(-9));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("benchmark");
        let err = supervise(&opts(missing, None), |_| {}).await.unwrap_err();
        assert!(matches!(err, MpbError::Spawn { .. }));
    }
}
