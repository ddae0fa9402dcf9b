//! spritebake core
//!
//! Framing math and batch orchestration for turning 3D models into 2D
//! sprites with a fixed, comparable scale.
//!
//! # Overview
//!
//! Every sprite of a run is rendered with the same orthographic extent and
//! the same pixel density, so one model-space unit maps to the same number
//! of pixels in every image. Per asset the pipeline:
//!
//! 1. Imports the model into a [`scene::Scene`] and measures its world-space
//!    bounds from the 8 corners of every mesh's local box
//! 2. Points the camera at the bounds center from a configured pitch and yaw
//! 3. Renders one image per capture direction onto a power-of-two canvas
//! 4. Optionally crops each image to its opaque pixels
//! 5. Writes a JSON sidecar with the framing parameters
//!
//! # Output layout
//!
//! | Rotations | Images |
//! |-----------|--------|
//! | 1 | `<output>/<rel>.png` |
//! | 4 | `<output>/<rel>_s.png`, `_e`, `_n`, `_w` |
//!
//! Each image has a `.json` sidecar next to it.
//!
//! # Crate Structure
//!
//! - [`batch`] - Batch orchestration
//! - [`bounds`] - World-space bounds
//! - [`camera`] - Camera placement
//! - [`canvas`] - Canvas sizing
//! - [`config`] - Run configuration
//! - [`crop`] - Crop-to-content
//! - [`discovery`] - Model discovery
//! - [`inspect`] - Model size inspection
//! - [`metadata`] - Sidecar metadata
//! - [`rotation`] - Capture directions
//! - [`scene`] - Render engine interface
//! - [`error`] - Error types

pub mod batch;
pub mod bounds;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod crop;
pub mod discovery;
pub mod error;
pub mod inspect;
pub mod metadata;
pub mod rotation;
pub mod scene;

pub use batch::{run_batch, BatchResult, FailedItem};
pub use bounds::{scene_bounds, SceneBounds};
pub use camera::{place_camera, CameraPose};
pub use canvas::{canvas_size, CanvasSpec};
pub use config::{ConfigFile, ConfigOverrides, ConfigWarning, RunConfig};
pub use crop::{cropper_for, CropInfo, Cropper, NoopCropper, AUTOCROP_AVAILABLE};
pub use discovery::{find_models, ModelAsset};
pub use error::{BatchError, ConfigError, MetadataError, SceneError};
pub use metadata::SpriteMetadata;
pub use rotation::{directions, Compass, Direction};
pub use scene::{MeshNode, RenderRequest, RenderSettings, Scene};
