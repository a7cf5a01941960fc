use serde::{Deserialize, Serialize};

/// Channel order of an 8-bit, 3-channel color buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelOrder {
    Rgb,
    Bgr,
}

/// Interleaved 8-bit color image, `height * width * 3` bytes, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorImage {
    pub width: u32,
    pub height: u32,
    pub order: PixelOrder,
    pub data: Vec<u8>,
}

impl ColorImage {
    /// Builds an image, returning `None` when `data` does not hold exactly
    /// `width * height * 3` bytes.
    pub fn new(width: u32, height: u32, order: PixelOrder, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            order,
            data,
        })
    }

    /// Solid-color image, `rgb` given in RGB order regardless of `order`.
    pub fn filled(width: u32, height: u32, order: PixelOrder, rgb: [u8; 3]) -> Self {
        let pixel = match order {
            PixelOrder::Rgb => rgb,
            PixelOrder::Bgr => [rgb[2], rgb[1], rgb[0]],
        };
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            order,
            data,
        }
    }

    /// Pixel at `(x, y)` in the buffer's native order.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// 16-bit single-channel depth image in sensor units, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u16>,
}

impl DepthImage {
    pub fn new(width: u32, height: u32, data: Vec<u16>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, value: u16) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }
}

/// One synchronized color + depth sample.
///
/// Only [`FrameSource`](crate::processing::frame_source::FrameSource) builds
/// these, and only when both halves are present at the same resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePair {
    pub color: ColorImage,
    pub depth: DepthImage,
    pub capture_index: u64,
    pub timestamp_ms: i64,
}

/// Side-by-side composite, always RGB ordered.
///
/// Left part: the color image. Right part: false-colored depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl CompositeFrame {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Minimum and maximum raw depth sample of one frame.
///
/// Serialized as a two-element array `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u16; 2]", into = "[u16; 2]")]
pub struct DepthExtent {
    pub min: u16,
    pub max: u16,
}

impl From<[u16; 2]> for DepthExtent {
    fn from([min, max]: [u16; 2]) -> Self {
        Self { min, max }
    }
}

impl From<DepthExtent> for [u16; 2] {
    fn from(extent: DepthExtent) -> Self {
        [extent.min, extent.max]
    }
}

/// Per-session acquisition counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDiagnostics {
    pub pairs_accepted: u64,
    pub color_only_dropped: u64,
    pub depth_only_dropped: u64,
    pub empty_dropped: u64,
    pub mismatched_dropped: u64,
    pub bytes_written: u64,
}

impl SessionDiagnostics {
    pub fn partials_dropped(&self) -> u64 {
        self.color_only_dropped + self.depth_only_dropped + self.empty_dropped + self.mismatched_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_image_rejects_wrong_length() {
        assert!(ColorImage::new(2, 2, PixelOrder::Rgb, vec![0; 11]).is_none());
        assert!(ColorImage::new(2, 2, PixelOrder::Rgb, vec![0; 12]).is_some());
    }

    #[test]
    fn filled_bgr_stores_reversed_channels() {
        let img = ColorImage::filled(1, 1, PixelOrder::Bgr, [10, 20, 30]);
        assert_eq!(img.pixel(0, 0), [30, 20, 10]);
    }

    #[test]
    fn depth_extent_serializes_as_pair() {
        let json = serde_json::to_string(&DepthExtent { min: 3, max: 900 }).unwrap();
        assert_eq!(json, "[3,900]");
        let back: DepthExtent = serde_json::from_str("[7,8]").unwrap();
        assert_eq!(back, DepthExtent { min: 7, max: 8 });
    }

    #[test]
    fn partials_dropped_sums_all_drop_kinds() {
        let d = SessionDiagnostics {
            color_only_dropped: 1,
            depth_only_dropped: 2,
            empty_dropped: 3,
            mismatched_dropped: 4,
            ..Default::default()
        };
        assert_eq!(d.partials_dropped(), 10);
    }
}
