//! UI modules for the Globe Workbench application.
//!
//! - Top bar: title, view readout, status and SVG export
//! - Central canvas: the globe and its drag/hover interaction

mod canvas;
mod globe_painter;
mod top_bar;

pub use canvas::render_canvas;
pub use top_bar::render_top_bar;
