//! spritebake End-to-End Test Infrastructure
//!
//! Integration tests for the batch pipeline, driven through a scripted
//! [`harness::FakeScene`] so they run without Blender.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all tests that need no Blender
//! cargo test -p spritebake-tests
//!
//! # Run the Blender-backed tests too
//! SPRITEBAKE_RUN_BLENDER_TESTS=1 cargo test -p spritebake-tests -- --ignored
//! ```

pub mod harness;

pub use harness::{FakeScene, ModelTree};
