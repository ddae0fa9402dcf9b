//! spritebake Blender backend
//!
//! Implements [`spritebake_core::Scene`] on top of a long-lived Blender
//! process.
//!
//! # Architecture
//!
//! 1. **Rust side** - spawns Blender once, sends one JSON request per line
//!    and waits for the matching reply with a per-request deadline
//! 2. **Python entrypoint** - runs inside Blender in a serve loop, owning
//!    the camera, the sun light and the imported geometry
//!
//! Bounds, camera placement and canvas sizing are all computed on the Rust
//! side; Blender only imports, reports mesh transforms and renders.
//!
//! A session that times out or dies is discarded. The next request starts a
//! fresh Blender and replays the last `configure`, so one bad asset cannot
//! take the rest of the batch down with it.
//!
//! # Blender Requirements
//!
//! Blender is searched for in:
//!
//! 1. An explicit path (`--blender`)
//! 2. `BLENDER_PATH` environment variable
//! 3. System PATH
//! 4. Common installation locations (platform-specific)
//!
//! Recommended Blender version: 3.6 LTS or 4.0+
//!
//! # Crate Structure
//!
//! - [`session`] - Blender subprocess management
//! - [`protocol`] - Request and reply wire format
//! - [`error`] - Error types

pub mod error;
pub mod protocol;
pub mod session;

use std::path::Path;

use spritebake_core::scene::{MeshNode, RenderRequest, RenderSettings, Scene};
use spritebake_core::SceneError;
use tracing::{debug, warn};

pub use error::{BlenderError, BlenderResult};
pub use session::{blender_version, find_blender, BlenderSession, SessionConfig};

use protocol::{Request, Response};

/// Model extensions Blender can import.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".gltf", ".glb", ".obj", ".fbx"];

/// A [`Scene`] backed by a Blender subprocess.
///
/// The process is started on first use.
pub struct BlenderScene {
    config: SessionConfig,
    session: Option<BlenderSession>,
    settings: Option<RenderSettings>,
}

impl BlenderScene {
    /// Creates a scene; Blender is not started yet.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: None,
            settings: None,
        }
    }

    /// Starts Blender now instead of on the first request.
    pub fn start(&mut self) -> BlenderResult<()> {
        self.session()?;
        Ok(())
    }

    /// Stops the Blender process, if running.
    pub fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }

    fn session(&mut self) -> BlenderResult<&mut BlenderSession> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let mut session = BlenderSession::spawn(&self.config)?;
                if let Some(settings) = self.settings {
                    debug!("Re-applying render settings to new Blender session");
                    session.request(&Request::Configure { settings })?;
                }
                session
            }
        };
        Ok(self.session.insert(session))
    }

    fn call(&mut self, request: &Request) -> BlenderResult<Response> {
        let result = self.session()?.request(request);
        if let Err(e) = &result {
            if e.is_fatal_to_session() {
                warn!("Discarding Blender session: {}", e);
                self.session = None;
            }
        }
        result
    }
}

impl Drop for BlenderScene {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Lowercase extension with a leading dot.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

impl Scene for BlenderScene {
    fn configure(&mut self, settings: &RenderSettings) -> Result<(), SceneError> {
        let response = self.call(&Request::Configure {
            settings: *settings,
        })?;
        self.settings = Some(*settings);
        if let Some(version) = response.version {
            debug!("Blender {}", version);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SceneError> {
        self.call(&Request::Clear)?;
        Ok(())
    }

    fn import(&mut self, path: &Path, scale_factor: f64) -> Result<Vec<MeshNode>, SceneError> {
        let extension = extension_of(path);
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SceneError::UnsupportedFormat { extension });
        }

        let request = Request::Import {
            path: path.to_path_buf(),
            scale_factor,
        };
        match self.call(&request) {
            Ok(response) => Ok(response.meshes),
            Err(BlenderError::CommandFailed { message, .. }) => {
                Err(SceneError::import_failed(path, message))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), SceneError> {
        self.call(&Request::Render {
            location: request.pose.position,
            rotation: request.pose.rotation,
            resolution: request.canvas_size,
            output_path: request.output_path.clone(),
        })?;
        Ok(())
    }
}
