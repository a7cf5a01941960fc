use crate::models::error::RecorderError;
use crate::models::frame::{ColorImage, DepthImage};

/// One tick of sensor output.
///
/// Either half may be missing when the sensor skips a cycle for one
/// modality. A missing half is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDelivery {
    pub color: Option<ColorImage>,
    pub depth: Option<DepthImage>,
    pub timestamp_ms: i64,
}

/// Interface for camera backends delivering color + depth.
///
/// Implemented by:
/// - `SyntheticCamera` (`depth-capture-synthetic`)
/// - Future: hardware SDK bindings
///
/// The connection is opened and closed by the owner of the backend, outside
/// of any session. Only [`FrameSource`](crate::processing::frame_source::FrameSource)
/// polls it.
pub trait CameraStream {
    /// Block until the sensor produces its next tick.
    ///
    /// Returns `Err(RecorderError::Acquisition)` when the connection is lost
    /// or the stream has ended; a tick with a missing half is `Ok`.
    fn poll(&mut self) -> Result<SensorDelivery, RecorderError>;

    /// Nominal delivery rate the stream was configured for.
    fn nominal_frame_rate(&self) -> u32;

    /// `(width, height)` shared by the color and depth streams. Fixed for the
    /// lifetime of the connection.
    fn resolution(&self) -> (u32, u32);
}

impl<T: CameraStream + ?Sized> CameraStream for Box<T> {
    fn poll(&mut self) -> Result<SensorDelivery, RecorderError> {
        (**self).poll()
    }

    fn nominal_frame_rate(&self) -> u32 {
        (**self).nominal_frame_rate()
    }

    fn resolution(&self) -> (u32, u32) {
        (**self).resolution()
    }
}
