pub mod camera_stream;
pub mod session_hooks;
