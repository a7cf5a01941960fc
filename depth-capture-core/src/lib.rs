//! # depth-capture-core
//!
//! Platform-agnostic depth camera recording core.
//!
//! Pairs color and depth frames, composites them side by side with a
//! false-colored depth view, encodes the result to MJPEG/AVI, and logs the
//! per-frame depth range next to each video. Camera backends implement the
//! `CameraStream` trait and plug into the generic `SessionRecorder`.
//!
//! ## Architecture
//!
//! ```text
//! depth-capture-core (this crate)
//! ├── traits/       ← CameraStream, SessionHooks
//! ├── models/       ← RecorderError, RecorderState, RecorderConfiguration, FramePair, Session, etc.
//! ├── processing/   ← FrameSource, FrameCompositor, Palette, DepthStatsCollector, AVI layout
//! ├── session/      ← SessionRecorder (orchestrator)
//! └── storage/      ← SessionFileAllocator, VideoEncoder, depth log, metadata
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::RecorderConfiguration;
pub use models::error::RecorderError;
pub use models::frame::{
    ColorImage, CompositeFrame, DepthExtent, DepthImage, FramePair, PixelOrder, SessionDiagnostics,
};
pub use models::session::{Session, SessionMetadata, SessionOutcome, SessionReport};
pub use models::state::RecorderState;
pub use processing::compositor::FrameCompositor;
pub use processing::depth_stats::DepthStatsCollector;
pub use processing::frame_source::FrameSource;
pub use processing::palette::Palette;
pub use session::recorder::{CancelHandle, SessionRecorder, StatusHandle};
pub use storage::allocator::SessionFileAllocator;
pub use storage::avi_reader::AviSummary;
pub use storage::video_writer::VideoEncoder;
pub use traits::camera_stream::{CameraStream, SensorDelivery};
pub use traits::session_hooks::{NoHooks, SessionHooks};
