//! Blender subprocess session.
//!
//! One Blender process is started per session and kept alive across
//! requests, so the scene built by `configure` survives between assets.
//! Every request waits at most the configured timeout for its reply; a
//! timed-out process is killed and the session must not be reused.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{BlenderError, BlenderResult};
use crate::protocol::{reply_payload, Request, Response};

const EMBEDDED_ENTRYPOINT_PY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../blender/entrypoint.py"
));

/// Default per-request timeout (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable overriding the entrypoint script.
pub const ENTRYPOINT_ENV: &str = "SPRITEBAKE_BLENDER_ENTRYPOINT";

/// Stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Configuration for a Blender session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Path to the Blender executable.
    pub blender_path: Option<PathBuf>,
    /// Path to the Python entrypoint script.
    pub entrypoint_path: PathBuf,
    /// Deadline for a single request.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            blender_path: None,
            entrypoint_path: PathBuf::from("blender/entrypoint.py"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SessionConfig {
    /// Creates a new config with the given entrypoint path.
    pub fn with_entrypoint(entrypoint_path: impl Into<PathBuf>) -> Self {
        Self {
            entrypoint_path: entrypoint_path.into(),
            ..Default::default()
        }
    }

    /// Sets the Blender executable path.
    pub fn blender_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.blender_path = Some(path.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Finds the Blender executable: explicit path, `BLENDER_PATH`, `PATH`,
/// then common installation locations.
pub fn find_blender(explicit: Option<&Path>) -> BlenderResult<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    if let Ok(path) = std::env::var("BLENDER_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
    }

    let blender_names = if cfg!(windows) {
        vec!["blender.exe", "blender"]
    } else {
        vec!["blender"]
    };

    for name in blender_names {
        if let Ok(path) = which::which(name) {
            return Ok(path);
        }
    }

    let common_paths = if cfg!(windows) {
        vec![
            "C:\\Program Files\\Blender Foundation\\Blender 4.2\\blender.exe",
            "C:\\Program Files\\Blender Foundation\\Blender 4.0\\blender.exe",
            "C:\\Program Files\\Blender Foundation\\Blender 3.6\\blender.exe",
            "C:\\Program Files\\Blender Foundation\\Blender\\blender.exe",
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            "/Applications/Blender.app/Contents/MacOS/Blender",
            "/Applications/Blender.app/Contents/MacOS/blender",
        ]
    } else {
        vec![
            "/usr/bin/blender",
            "/usr/local/bin/blender",
            "/snap/bin/blender",
        ]
    };

    for path_str in common_paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(BlenderError::BlenderNotFound)
}

/// Runs `blender --version` and returns its first line.
pub fn blender_version(blender_path: &Path) -> BlenderResult<String> {
    let output = Command::new(blender_path)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(BlenderError::SpawnFailed)?;

    if !output.status.success() {
        return Err(BlenderError::ProcessExited {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::new(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or("unknown").trim().to_string())
}

struct ResolvedEntrypoint {
    path: PathBuf,
    _tempfile: Option<tempfile::NamedTempFile>,
}

fn resolve_entrypoint(config: &SessionConfig) -> BlenderResult<ResolvedEntrypoint> {
    // Config override first.
    if config.entrypoint_path.exists() {
        return Ok(ResolvedEntrypoint {
            path: config.entrypoint_path.clone(),
            _tempfile: None,
        });
    }

    // Environment override (fallback).
    if let Ok(path) = std::env::var(ENTRYPOINT_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(ResolvedEntrypoint {
                path,
                _tempfile: None,
            });
        }
        return Err(BlenderError::EntrypointNotFound { path });
    }

    // Last resort: write embedded entrypoint to a temp file.
    let mut file = tempfile::Builder::new()
        .prefix("spritebake_blender_entrypoint_")
        .suffix(".py")
        .tempfile()
        .map_err(BlenderError::Io)?;
    file.write_all(EMBEDDED_ENTRYPOINT_PY.as_bytes())
        .map_err(BlenderError::Io)?;
    file.flush().map_err(BlenderError::Io)?;

    Ok(ResolvedEntrypoint {
        path: file.path().to_path_buf(),
        _tempfile: Some(file),
    })
}

/// A running Blender process serving requests.
pub struct BlenderSession {
    child: Child,
    stdin: Option<ChildStdin>,
    replies: Receiver<String>,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
    timeout: Duration,
    _entrypoint: ResolvedEntrypoint,
}

impl BlenderSession {
    /// Starts Blender in serve mode.
    pub fn spawn(config: &SessionConfig) -> BlenderResult<Self> {
        let blender_path = find_blender(config.blender_path.as_deref())?;
        let entrypoint = resolve_entrypoint(config)?;

        // blender --background --factory-startup --python entrypoint.py -- --serve
        let mut cmd = Command::new(&blender_path);
        cmd.arg("--background")
            .arg("--factory-startup")
            .arg("--python")
            .arg(&entrypoint.path)
            .arg("--")
            .arg("--serve")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Starting Blender: {}", blender_path.display());
        let mut child = cmd.spawn().map_err(BlenderError::SpawnFailed)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained on their own threads so a chatty Blender
        // never blocks on a full pipe.
        let (tx, replies) = mpsc::channel();
        if let Some(stdout) = stdout {
            thread::spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    match reply_payload(&line) {
                        Some(payload) => {
                            if tx.send(payload.to_string()).is_err() {
                                break;
                            }
                        }
                        None => trace!(target: "blender", "{}", line),
                    }
                }
            });
        }

        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        if let Some(stderr) = stderr {
            let tail = Arc::clone(&stderr_tail);
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines() {
                    let Ok(line) = line else { break };
                    trace!(target: "blender", "stderr: {}", line);
                    if let Ok(mut tail) = tail.lock() {
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
            });
        }

        Ok(Self {
            child,
            stdin,
            replies,
            stderr_tail,
            timeout: config.timeout,
            _entrypoint: entrypoint,
        })
    }

    /// Sends one request and waits for its reply.
    ///
    /// A reply with `ok: false` becomes [`BlenderError::CommandFailed`].
    pub fn request(&mut self, request: &Request) -> BlenderResult<Response> {
        let command = request.name();
        let line = request.to_line().map_err(BlenderError::SerializeFailed)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(self.exited());
        };
        if let Err(e) = stdin.write_all(line.as_bytes()).and_then(|_| stdin.flush()) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Err(self.exited());
            }
            return Err(BlenderError::SendFailed(e));
        }

        let payload = match self.replies.recv_timeout(self.timeout) {
            Ok(payload) => payload,
            Err(RecvTimeoutError::Timeout) => {
                self.kill();
                return Err(BlenderError::Timeout {
                    command,
                    timeout_secs: self.timeout.as_secs(),
                });
            }
            Err(RecvTimeoutError::Disconnected) => return Err(self.exited()),
        };

        let response: Response =
            serde_json::from_str(&payload).map_err(BlenderError::ParseReplyFailed)?;
        if !response.ok {
            return Err(BlenderError::command_failed(
                command,
                response
                    .error
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        Ok(response)
    }

    /// Asks Blender to exit, killing it if it does not.
    pub fn shutdown(mut self) {
        self.quit();
    }

    fn quit(&mut self) {
        if let Some(mut stdin) = self.stdin.take() {
            if let Ok(line) = Request::Quit.to_line() {
                let _ = stdin.write_all(line.as_bytes());
                let _ = stdin.flush();
            }
        }
        // Wait briefly for the serve loop to return.
        for _ in 0..20 {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(Duration::from_millis(100)),
                Err(_) => break,
            }
        }
        self.kill();
    }

    fn kill(&mut self) {
        self.stdin = None;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn exited(&mut self) -> BlenderError {
        self.stdin = None;
        let exit_code = match self.child.wait() {
            Ok(status) => status.code().unwrap_or(-1),
            Err(_) => -1,
        };
        let stderr = self
            .stderr_tail
            .lock()
            .map(|tail| tail.iter().cloned().collect::<Vec<_>>().join("\n"))
            .unwrap_or_default();
        BlenderError::ProcessExited { exit_code, stderr }
    }
}

impl Drop for BlenderSession {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            self.quit();
        }
    }
}
