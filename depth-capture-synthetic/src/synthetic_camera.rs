//! Deterministic stand-in for a depth camera.
//!
//! Produces a moving color gradient and a configurable depth pattern at a
//! fixed resolution, following a [`DeliveryScript`] for partial deliveries
//! and failures.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use depth_capture_core::models::error::RecorderError;
use depth_capture_core::models::frame::{ColorImage, DepthImage, PixelOrder};
use depth_capture_core::traits::camera_stream::{CameraStream, SensorDelivery};

use crate::delivery_script::{DeliveryScript, DeliveryStep};

/// Default stream settings: 424×240 @ 30 fps.
pub const DEFAULT_WIDTH: u32 = 424;
pub const DEFAULT_HEIGHT: u32 = 240;
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Depth content of every delivered depth image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthPattern {
    /// Every sample equal.
    Constant(u16),
    /// Linear ramp from `near` at the left edge to `far` at the right edge.
    Ramp { near: u16, far: u16 },
}

/// Counters shared between the camera and its [`SyntheticProbe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeCounters {
    pub polls: u64,
    pub full: u64,
    pub partial: u64,
}

#[derive(Debug, Default)]
struct ProbeState {
    counters: ProbeCounters,
    disconnected: bool,
}

/// Handle for watching and unplugging a camera after it has been moved
/// into a recorder.
#[derive(Debug, Clone)]
pub struct SyntheticProbe(Arc<Mutex<ProbeState>>);

impl SyntheticProbe {
    pub fn counters(&self) -> ProbeCounters {
        self.0.lock().counters
    }

    /// Make every subsequent poll fail with an acquisition error.
    pub fn disconnect(&self) {
        self.0.lock().disconnected = true;
    }
}

pub struct SyntheticCamera {
    width: u32,
    height: u32,
    frame_rate: u32,
    order: PixelOrder,
    depth: DepthPattern,
    script: DeliveryScript,
    interval: Option<Duration>,
    tick: u64,
    probe: Arc<Mutex<ProbeState>>,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            width,
            height,
            frame_rate,
            order: PixelOrder::Rgb,
            depth: DepthPattern::Ramp { near: 300, far: 6000 },
            script: DeliveryScript::steady(),
            interval: None,
            tick: 0,
            probe: Arc::new(Mutex::new(ProbeState::default())),
        }
    }

    pub fn with_pixel_order(mut self, order: PixelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_depth(mut self, depth: DepthPattern) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_script(mut self, script: DeliveryScript) -> Self {
        self.script = script;
        self
    }

    /// Sleep this long inside every poll to mimic sensor cadence.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sleep one nominal frame period per poll.
    pub fn paced(self) -> Self {
        let period = Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64);
        self.with_interval(period)
    }

    pub fn probe(&self) -> SyntheticProbe {
        SyntheticProbe(Arc::clone(&self.probe))
    }

    fn color_frame(&self) -> ColorImage {
        let (w, h) = (self.width as usize, self.height as usize);
        let shift = (self.tick % 256) as usize;
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                let r = ((x * 255 / w.max(1)) + shift) as u8;
                let g = (y * 255 / h.max(1)) as u8;
                let b = (shift * 8) as u8;
                match self.order {
                    PixelOrder::Rgb => data.extend_from_slice(&[r, g, b]),
                    PixelOrder::Bgr => data.extend_from_slice(&[b, g, r]),
                }
            }
        }
        ColorImage {
            width: self.width,
            height: self.height,
            order: self.order,
            data,
        }
    }

    fn depth_frame(&self) -> DepthImage {
        match self.depth {
            DepthPattern::Constant(v) => DepthImage::filled(self.width, self.height, v),
            DepthPattern::Ramp { near, far } => {
                let w = self.width as usize;
                let span = far as i64 - near as i64;
                let row: Vec<u16> = (0..w)
                    .map(|x| {
                        let t = if w > 1 { x as i64 * span / (w as i64 - 1) } else { 0 };
                        (near as i64 + t) as u16
                    })
                    .collect();
                let data = row.iter().copied().cycle().take(w * self.height as usize).collect();
                DepthImage {
                    width: self.width,
                    height: self.height,
                    data,
                }
            }
        }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_FRAME_RATE)
    }
}

impl CameraStream for SyntheticCamera {
    fn poll(&mut self) -> Result<SensorDelivery, RecorderError> {
        let step = {
            let mut probe = self.probe.lock();
            probe.counters.polls += 1;
            if probe.disconnected {
                return Err(RecorderError::Acquisition("synthetic camera unplugged".into()));
            }
            self.script.next_step()
        };

        if let Some(interval) = self.interval {
            thread::sleep(interval);
        }

        let step = match step {
            Some(DeliveryStep::Fail) => {
                return Err(RecorderError::Acquisition("synthetic camera: scripted failure".into()))
            }
            None => return Err(RecorderError::Acquisition("synthetic camera: stream ended".into())),
            Some(step) => step,
        };

        self.tick += 1;
        let timestamp_ms = (self.tick * 1000 / self.frame_rate.max(1) as u64) as i64;
        let (color, depth) = match step {
            DeliveryStep::Full => (Some(self.color_frame()), Some(self.depth_frame())),
            DeliveryStep::ColorOnly => (Some(self.color_frame()), None),
            DeliveryStep::DepthOnly => (None, Some(self.depth_frame())),
            DeliveryStep::Empty | DeliveryStep::Fail => (None, None),
        };

        {
            let mut probe = self.probe.lock();
            if step == DeliveryStep::Full {
                probe.counters.full += 1;
            } else {
                probe.counters.partial += 1;
            }
        }
        log::trace!("synthetic tick {} → {:?}", self.tick, step);

        Ok(SensorDelivery {
            color,
            depth,
            timestamp_ms,
        })
    }

    fn nominal_frame_rate(&self) -> u32 {
        self.frame_rate
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
