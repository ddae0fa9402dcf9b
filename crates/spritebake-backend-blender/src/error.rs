//! Error types for the Blender backend.

use std::path::PathBuf;

use spritebake_core::SceneError;
use thiserror::Error;

/// Result type for Blender backend operations.
pub type BlenderResult<T> = Result<T, BlenderError>;

/// Errors that can occur while driving Blender.
#[derive(Debug, Error)]
pub enum BlenderError {
    /// Blender executable not found.
    #[error("Blender executable not found. Ensure Blender is installed and in PATH, or set BLENDER_PATH environment variable")]
    BlenderNotFound,

    /// Failed to spawn Blender process.
    #[error("Failed to spawn Blender process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// A request got no reply in time.
    #[error("Blender did not answer '{command}' within {timeout_secs} seconds")]
    Timeout {
        command: &'static str,
        timeout_secs: u64,
    },

    /// Blender exited while a request was pending.
    #[error("Blender process exited with status {exit_code}: {stderr}")]
    ProcessExited { exit_code: i32, stderr: String },

    /// Failed to write a request to Blender.
    #[error("Failed to send request to Blender: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Failed to serialize a request.
    #[error("Failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// A reply line was not valid JSON.
    #[error("Failed to parse Blender reply: {0}")]
    ParseReplyFailed(#[source] serde_json::Error),

    /// Blender reported an error for a command.
    #[error("Blender '{command}' failed: {message}")]
    CommandFailed {
        command: &'static str,
        message: String,
    },

    /// The model extension has no Blender importer.
    #[error("Unsupported model format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Python entrypoint script not found.
    #[error("Python entrypoint script not found at: {path}")]
    EntrypointNotFound { path: PathBuf },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlenderError {
    /// Creates a new command failed error.
    pub fn command_failed(command: &'static str, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command,
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BlenderError::BlenderNotFound => "BLENDER_001",
            BlenderError::SpawnFailed(_) => "BLENDER_002",
            BlenderError::Timeout { .. } => "BLENDER_003",
            BlenderError::ProcessExited { .. } => "BLENDER_004",
            BlenderError::SendFailed(_) => "BLENDER_005",
            BlenderError::SerializeFailed(_) => "BLENDER_006",
            BlenderError::ParseReplyFailed(_) => "BLENDER_007",
            BlenderError::CommandFailed { .. } => "BLENDER_008",
            BlenderError::UnsupportedFormat { .. } => "BLENDER_009",
            BlenderError::EntrypointNotFound { .. } => "BLENDER_010",
            BlenderError::Io(_) => "BLENDER_011",
        }
    }

    /// True when the subprocess can no longer be used.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            BlenderError::Timeout { .. }
                | BlenderError::ProcessExited { .. }
                | BlenderError::SendFailed(_)
                | BlenderError::ParseReplyFailed(_)
        )
    }
}

impl From<BlenderError> for SceneError {
    fn from(err: BlenderError) -> Self {
        match err {
            BlenderError::UnsupportedFormat { extension } => SceneError::UnsupportedFormat { extension },
            BlenderError::CommandFailed {
                command: "render",
                message,
            } => SceneError::render_failed(message),
            other => SceneError::backend(format!("[{}] {}", other.code(), other)),
        }
    }
}
