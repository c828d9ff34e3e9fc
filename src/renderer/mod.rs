//! Rendering module
//!
//! `scene` turns read-only episode state into draw commands in logical field
//! units; `canvas` replays them on a browser 2D canvas.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use scene::{DrawCommand, Scene};
