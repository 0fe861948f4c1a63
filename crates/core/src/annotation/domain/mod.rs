pub mod annotation_canvas;
pub mod annotation_renderer;
pub mod classification;
pub mod image_writer;
pub mod session_counters;
