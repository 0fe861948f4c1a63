pub mod frame_canvas;
pub mod image_file_writer;
