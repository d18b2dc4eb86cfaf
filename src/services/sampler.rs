//! Metric sampling
//!
//! Runs a metric's script or shell command and returns its trimmed
//! standard output. Each run is bounded by a timeout and an output cap.

use crate::domain::{MetricSource, MetricSpec};
use crate::error::SampleError;

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Default per-run timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on captured standard output
pub const DEFAULT_MAX_OUTPUT: usize = 64 * 1024;

/// Default shell for `command` metrics
pub const DEFAULT_SHELL: &str = "/bin/bash";

const EXIT_POLL: Duration = Duration::from_millis(10);

/// Produces the raw text of one metric observation
pub trait MetricSampler: Send + Sync {
    /// Run the metric's source once and return its trimmed output
    fn sample(&self, spec: &MetricSpec) -> Result<String, SampleError>;
}

/// Runs scripts directly and commands through `<shell> -c`
#[derive(Debug, Clone)]
pub struct CommandSampler {
    shell: String,
    timeout: Duration,
    max_output: usize,
}

impl Default for CommandSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL, DEFAULT_TIMEOUT, DEFAULT_MAX_OUTPUT)
    }
}

impl CommandSampler {
    pub fn new(shell: impl Into<String>, timeout: Duration, max_output: usize) -> Self {
        Self {
            shell: shell.into(),
            timeout,
            max_output,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command_for(&self, source: &MetricSource) -> Result<Command, SampleError> {
        match source {
            MetricSource::Script(path) => {
                check_script(path)?;
                Ok(Command::new(path))
            }
            MetricSource::Command(line) => {
                let mut cmd = Command::new(&self.shell);
                cmd.arg("-c").arg(line);
                Ok(cmd)
            }
        }
    }

    fn run(&self, mut cmd: Command, desc: &str) -> Result<String, SampleError> {
        let exec_err = |message: String| SampleError::Execution {
            source_desc: desc.to_string(),
            message,
        };
        let timed_out = || SampleError::Timeout {
            source_desc: desc.to_string(),
            timeout: self.timeout,
        };

        // Own process group so a kill reaches everything the source started
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let deadline = Instant::now() + self.timeout;
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| exec_err(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| exec_err("stdout was not captured".to_string()))?;

        let (tx, rx) = mpsc::channel();
        let cap = self.max_output;
        thread::spawn(move || {
            // Receiver may be gone after a timeout
            let _ = tx.send(read_capped(stdout, cap));
        });

        let output = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                kill(&mut child);
                return Err(exec_err(format!("failed to read output: {}", e)));
            }
            Err(_) => {
                kill(&mut child);
                return Err(timed_out());
            }
        };

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    kill(&mut child);
                    return Err(timed_out());
                }
                Ok(None) => thread::sleep(EXIT_POLL),
                Err(e) => {
                    kill(&mut child);
                    return Err(exec_err(e.to_string()));
                }
            }
        };

        if !status.success() {
            return Err(exec_err(format!("exited with {}", status)));
        }

        Ok(String::from_utf8_lossy(&output).trim().to_string())
    }
}

impl MetricSampler for CommandSampler {
    fn sample(&self, spec: &MetricSpec) -> Result<String, SampleError> {
        let cmd = self.command_for(&spec.source)?;
        let output = self.run(cmd, &spec.source.to_string())?;
        log::debug!("Metric '{}' output: '{}'", spec.name, output);
        Ok(output)
    }
}

fn check_script(path: &Path) -> Result<(), SampleError> {
    let metadata =
        std::fs::metadata(path).map_err(|_| SampleError::SourceNotFound(path.display().to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if !metadata.is_file() || metadata.permissions().mode() & 0o111 == 0 {
            return Err(SampleError::NotExecutable(path.display().to_string()));
        }
    }

    #[cfg(not(unix))]
    {
        if !metadata.is_file() {
            return Err(SampleError::NotExecutable(path.display().to_string()));
        }
    }

    Ok(())
}

/// Read up to `cap` bytes, then drain and discard the rest until EOF
fn read_capped(mut reader: impl Read, cap: usize) -> std::io::Result<Vec<u8>> {
    let mut kept = Vec::new();
    (&mut reader).take(cap as u64).read_to_end(&mut kept)?;
    std::io::copy(&mut reader, &mut std::io::sink())?;
    Ok(kept)
}

/// Kill the child's whole process group, then reap the child
#[cfg(unix)]
fn kill(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // Safety: killpg only sends a signal, and the group is ours
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
        log::debug!(
            "Failed to kill metric process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Failed to kill metric process {}: {}", child.id(), e);
    }
    let _ = child.wait();
}
