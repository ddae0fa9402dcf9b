//! Wire format between the Rust side and the Python entrypoint.
//!
//! Requests are JSON objects, one per line on Blender's stdin, tagged by
//! `cmd`. Replies are JSON objects on stdout, one per request, prefixed with
//! [`REPLY_PREFIX`] so they can be told apart from Blender's own output.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use spritebake_core::scene::{MeshNode, RenderSettings, Vec3};

/// Marks a stdout line as a reply.
pub const REPLY_PREFIX: &str = "@@spritebake@@ ";

/// A command for the entrypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    /// Create camera and light, set engine and output format.
    Configure {
        #[serde(flatten)]
        settings: RenderSettings,
    },
    /// Delete mesh geometry, keep camera and light.
    Clear,
    /// Import a model and report its meshes.
    Import { path: PathBuf, scale_factor: f64 },
    /// Place the camera and render one image.
    Render {
        location: Vec3,
        /// Quaternion `[w, x, y, z]`.
        rotation: [f64; 4],
        resolution: u32,
        output_path: PathBuf,
    },
    /// Exit the serve loop.
    Quit,
}

impl Request {
    /// Command name, for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Configure { .. } => "configure",
            Request::Clear => "clear",
            Request::Import { .. } => "import",
            Request::Render { .. } => "render",
            Request::Quit => "quit",
        }
    }

    /// Encodes the request as a single line, newline included.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// The entrypoint's answer to one request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Meshes in the scene after an import.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<MeshNode>,
    /// Blender version string, sent with the configure reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Extracts the reply payload from a stdout line, if it is one.
pub fn reply_payload(line: &str) -> Option<&str> {
    line.trim_end_matches(['\r', '\n']).strip_prefix(REPLY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spritebake_core::scene::LightSettings;

    #[test]
    fn test_requests_are_tagged_by_cmd() {
        let configure = Request::Configure {
            settings: RenderSettings {
                resolution: 512,
                samples: 64,
                ortho_scale: 4.0,
                light: LightSettings {
                    strength: 3.0,
                    angle_x: 45.0,
                    angle_z: 315.0,
                },
            },
        };
        let value = serde_json::to_value(&configure).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "cmd": "configure",
                "resolution": 512,
                "samples": 64,
                "ortho_scale": 4.0,
                "light": {"strength": 3.0, "angle_x": 45.0, "angle_z": 315.0}
            })
        );

        assert_eq!(Request::Clear.to_line().unwrap(), "{\"cmd\":\"clear\"}\n");
    }

    #[test]
    fn test_render_request_shape() {
        let request = Request::Render {
            location: [0.0, -5.0, 8.0],
            rotation: [1.0, 0.0, 0.0, 0.0],
            resolution: 1024,
            output_path: PathBuf::from("out/tree.png"),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["cmd"], "render");
        assert_eq!(value["resolution"], 1024);
        assert_eq!(value["output_path"], "out/tree.png");
        assert_eq!(request.name(), "render");
    }

    #[test]
    fn test_reply_lines_are_prefixed() {
        assert_eq!(
            reply_payload("@@spritebake@@ {\"ok\":true}\n"),
            Some("{\"ok\":true}")
        );
        assert_eq!(reply_payload("Read blend: /tmp/x.blend"), None);
        assert_eq!(reply_payload("  @@spritebake@@ {}"), None);
    }

    #[test]
    fn test_import_reply_parses_meshes() {
        let line = r#"{"ok": true, "meshes": [{
            "name": "Cube",
            "matrix_world": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]],
            "bound_box": [[-1,-1,-1],[-1,-1,1],[-1,1,1],[-1,1,-1],
                          [1,-1,-1],[1,-1,1],[1,1,1],[1,1,-1]]
        }]}"#;
        let response: Response = serde_json::from_str(line).unwrap();
        assert!(response.ok);
        assert_eq!(response.meshes.len(), 1);
        assert_eq!(response.meshes[0].name, "Cube");
        assert_eq!(response.meshes[0].bound_box[6], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_error_reply_defaults() {
        let response: Response =
            serde_json::from_str(r#"{"ok": false, "error": "import failed"}"#).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("import failed"));
        assert!(response.meshes.is_empty());
    }
}
