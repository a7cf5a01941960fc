use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::processing::palette::Palette;

/// Scale applied to raw depth before palette lookup. Samples above
/// `255 / 0.03 ≈ 8500` saturate to the top of the palette.
pub const DEFAULT_DEPTH_SCALE: f32 = 0.03;

/// Configuration for a [`SessionRecorder`](crate::session::recorder::SessionRecorder).
///
/// Loading it from disk is left to the caller; the serde derives are there
/// so any format the caller picks can populate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfiguration {
    /// Directory where session files are written. Created on first use.
    pub output_directory: PathBuf,

    /// Delay between the trigger and the first captured frame (default: 2s).
    #[serde(with = "duration_secs")]
    pub pre_roll: Duration,

    /// Wall-clock length of the recording loop (default: 5s).
    #[serde(with = "duration_secs")]
    pub session_length: Duration,

    /// Nominal capture rate written into the container (default: 30).
    pub frame_rate: u32,

    /// Linear factor mapping raw depth into 0..=255 before the palette.
    pub depth_scale: f32,

    pub palette: Palette,

    /// JPEG quality for each encoded frame, 1..=100 (default: 90).
    pub jpeg_quality: u8,

    /// Write `video_<i>.metadata.json` next to each video (default: true).
    pub write_metadata: bool,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_rate == 0 {
            return Err("frame rate must be positive".into());
        }
        if self.session_length.is_zero() {
            return Err("session length must be non-zero".into());
        }
        if !self.depth_scale.is_finite() || self.depth_scale <= 0.0 {
            return Err(format!("invalid depth scale: {}", self.depth_scale));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("unsupported jpeg quality: {}", self.jpeg_quality));
        }
        Ok(())
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("videos"),
            pre_roll: Duration::from_secs(2),
            session_length: Duration::from_secs(5),
            frame_rate: 30,
            depth_scale: DEFAULT_DEPTH_SCALE,
            palette: Palette::Jet,
            jpeg_quality: 90,
            write_metadata: true,
        }
    }
}

/// (De)serializes a `Duration` as fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RecorderConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.pre_roll, Duration::from_secs(2));
        assert_eq!(config.session_length, Duration::from_secs(5));
    }

    #[test]
    fn rejects_zero_frame_rate() {
        let config = RecorderConfiguration {
            frame_rate: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_depth_scale() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = RecorderConfiguration {
                depth_scale: scale,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "scale {scale} accepted");
        }
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let config = RecorderConfiguration {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn durations_round_trip_as_seconds() {
        let config = RecorderConfiguration {
            pre_roll: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["pre_roll"], serde_json::json!(1.5));

        let partial: RecorderConfiguration =
            serde_json::from_str(r#"{"session_length": 2.5, "palette": "hot"}"#).unwrap();
        assert_eq!(partial.session_length, Duration::from_millis(2500));
        assert_eq!(partial.palette, Palette::Hot);
        assert_eq!(partial.frame_rate, 30);
    }
}
