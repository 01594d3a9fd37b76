//! Canvas2D rendering module
//!
//! Draws the session onto a fixed logical board; the shell scales the
//! backing store for the device pixel ratio.

pub mod canvas;

pub use canvas::CanvasPainter;
