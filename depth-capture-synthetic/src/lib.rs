//! # depth-capture-synthetic
//!
//! Synthetic camera backend for depth-capture-kit.
//!
//! Provides:
//! - `SyntheticCamera`: a `CameraStream` producing a color gradient and a
//!   configurable depth pattern at a fixed resolution
//! - `DeliveryScript`: scripted partial deliveries and connection loss
//! - `SyntheticProbe`: poll counters and a remote "unplug"
//!
//! ## Usage
//! ```ignore
//! use depth_capture_core::{RecorderConfiguration, SessionRecorder};
//! use depth_capture_synthetic::SyntheticCamera;
//!
//! let camera = SyntheticCamera::default().paced();
//! let mut recorder = SessionRecorder::new(camera, RecorderConfiguration::default()).unwrap();
//! let report = recorder.start_session().unwrap();
//! ```

pub mod delivery_script;
pub mod synthetic_camera;

pub use delivery_script::{DeliveryScript, DeliveryStep};
pub use synthetic_camera::{DepthPattern, ProbeCounters, SyntheticCamera, SyntheticProbe};
