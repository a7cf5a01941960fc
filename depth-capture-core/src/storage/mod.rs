pub mod allocator;
pub mod avi_reader;
pub mod depth_log;
pub mod metadata;
pub mod video_writer;
