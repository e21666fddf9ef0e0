//! Running external command-line tools.
//!
//! Tools run with no console window and their output captured, and only a
//! zero exit status counts as success. An optional deadline kills a hung
//! process instead of blocking its worker forever.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long to wait for stderr after the tool itself has exited.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Longest stderr excerpt kept in an error.
const STDERR_LIMIT: usize = 2048;

/// Why an external tool call failed.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}{}", exit_code_label(.code), stderr_suffix(.stderr))]
    Exit {
        program: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} did not finish within {}s", .after.as_secs_f32())]
    TimedOut { program: PathBuf, after: Duration },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// An external executable plus how long to wait for it.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool to completion.
    pub fn run<I, S>(&self, args: I) -> Result<(), ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        log::debug!("Running {:?}", command);

        let mut child = command.spawn().map_err(|source| ToolError::Launch {
            program: self.program.clone(),
            source,
        })?;

        // Drain stderr on its own thread so a chatty tool can't fill the
        // pipe and stall while we wait on it.
        let (stderr_tx, stderr_rx) = crossbeam_channel::bounded::<Vec<u8>>(1);
        if let Some(mut pipe) = child.stderr.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = stderr_tx.send(buf);
            });
        }

        // On timeout the drainer is left behind: a grandchild of the killed
        // tool may still hold the pipe open.
        let status = self.wait(&mut child)?;

        // The pipe only closes once every holder exits, so wait a bounded time.
        let stderr = match stderr_rx.recv_timeout(STDERR_GRACE) {
            Ok(bytes) => truncate(&String::from_utf8_lossy(&bytes)),
            Err(_) => {
                log::debug!("{} left stderr open, not waiting for it", self.program.display());
                String::new()
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Exit {
                program: self.program.clone(),
                code: status.code(),
                stderr,
            })
        }
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, ToolError> {
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(|source| ToolError::Launch {
                program: self.program.clone(),
                source,
            });
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::TimedOut {
                        program: self.program.clone(),
                        after: timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(ToolError::Launch {
                        program: self.program.clone(),
                        source,
                    })
                }
            }
        }
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= STDERR_LIMIT {
        return text.to_string();
    }
    let mut end = STDERR_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
