pub mod avi_format;
pub mod compositor;
pub mod depth_stats;
pub mod frame_source;
pub mod palette;
