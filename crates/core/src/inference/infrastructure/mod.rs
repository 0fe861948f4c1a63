pub mod http_inference_client;
pub mod jpeg_frame_encoder;
