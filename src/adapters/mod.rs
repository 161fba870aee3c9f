// Adapters - External system implementations

pub mod ffmpeg_engine;
pub mod json_store;

// Re-export adapters
pub use ffmpeg_engine::FfmpegEngine;
pub use json_store::JsonProjectStore;
