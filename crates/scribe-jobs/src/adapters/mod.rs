//! Adapters for external content platforms.

pub mod youtube;

pub use youtube::{extract_video_id, parse_webvtt, YoutubeClient, YoutubeConfig};
