use crate::models::error::RecorderError;
use crate::models::frame::{ColorImage, DepthImage, FramePair, SessionDiagnostics};
use crate::traits::camera_stream::{CameraStream, SensorDelivery};

/// Pairs color and depth from a [`CameraStream`].
///
/// `next()` keeps polling until the stream delivers both halves of a tick at
/// the stream's declared resolution. Partial deliveries are counted and
/// dropped, never surfaced, so the index of every returned pair lines up
/// with the frames written downstream.
pub struct FrameSource<C: CameraStream> {
    stream: C,
    next_index: u64,
    diagnostics: SessionDiagnostics,
}

impl<C: CameraStream> FrameSource<C> {
    pub fn new(stream: C) -> Self {
        Self {
            stream,
            next_index: 0,
            diagnostics: SessionDiagnostics::default(),
        }
    }

    /// Block until a complete pair is available.
    ///
    /// Fails only with [`RecorderError::Acquisition`] (or whatever the stream
    /// reports) when the upstream connection is gone.
    pub fn next(&mut self) -> Result<FramePair, RecorderError> {
        loop {
            let SensorDelivery {
                color,
                depth,
                timestamp_ms,
            } = self.stream.poll()?;

            match (color, depth) {
                (Some(color), Some(depth)) => {
                    if !matches_resolution(&color, &depth, self.stream.resolution()) {
                        log::debug!(
                            "Dropping mismatched pair: color {}x{} ({} bytes), depth {}x{} ({} samples)",
                            color.width,
                            color.height,
                            color.data.len(),
                            depth.width,
                            depth.height,
                            depth.data.len()
                        );
                        self.diagnostics.mismatched_dropped += 1;
                        continue;
                    }
                    let capture_index = self.next_index;
                    self.next_index += 1;
                    self.diagnostics.pairs_accepted += 1;
                    return Ok(FramePair {
                        color,
                        depth,
                        capture_index,
                        timestamp_ms,
                    });
                }
                (Some(_), None) => {
                    log::debug!("Dropping color-only delivery at {} ms", timestamp_ms);
                    self.diagnostics.color_only_dropped += 1;
                }
                (None, Some(_)) => {
                    log::debug!("Dropping depth-only delivery at {} ms", timestamp_ms);
                    self.diagnostics.depth_only_dropped += 1;
                }
                (None, None) => {
                    log::debug!("Dropping empty delivery at {} ms", timestamp_ms);
                    self.diagnostics.empty_dropped += 1;
                }
            }
        }
    }

    /// Counters accumulated since the last [`take_diagnostics`](Self::take_diagnostics).
    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.diagnostics
    }

    /// Return and reset the counters; called once per session.
    pub fn take_diagnostics(&mut self) -> SessionDiagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn nominal_frame_rate(&self) -> u32 {
        self.stream.nominal_frame_rate()
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.stream.resolution()
    }

    pub fn stream(&self) -> &C {
        &self.stream
    }

    pub fn into_inner(self) -> C {
        self.stream
    }
}

/// Both images at the declared size, with buffers as long as that size says.
fn matches_resolution(color: &ColorImage, depth: &DepthImage, (width, height): (u32, u32)) -> bool {
    let pixels = width as u64 * height as u64;
    pixels > 0
        && (color.width, color.height) == (width, height)
        && (depth.width, depth.height) == (width, height)
        && color.data.len() as u64 == pixels * 3
        && depth.data.len() as u64 == pixels
}
