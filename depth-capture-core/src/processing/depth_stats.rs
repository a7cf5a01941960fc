use crate::models::frame::{DepthExtent, DepthImage, FramePair};

/// Per-frame depth range extraction.
///
/// Must be fed the same [`FramePair`] as the compositor so that
/// `extents[i]` describes frame `i` of the video.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepthStatsCollector;

impl DepthStatsCollector {
    pub fn new() -> Self {
        Self
    }

    /// Raw (unscaled) min and max depth of the pair.
    pub fn extent(&self, pair: &FramePair) -> DepthExtent {
        depth_extent(&pair.depth)
    }
}

/// Min and max of a depth buffer. An empty buffer yields `(0, 0)`.
pub fn depth_extent(depth: &DepthImage) -> DepthExtent {
    let mut samples = depth.data.iter().copied();
    let Some(first) = samples.next() else {
        return DepthExtent { min: 0, max: 0 };
    };
    let (min, max) = samples.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    DepthExtent { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::{ColorImage, PixelOrder};

    fn pair_with_depth(depth: DepthImage) -> FramePair {
        FramePair {
            color: ColorImage::filled(depth.width, depth.height, PixelOrder::Rgb, [0, 0, 0]),
            depth,
            capture_index: 0,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn constant_depth() {
        let pair = pair_with_depth(DepthImage::filled(16, 8, 1000));
        assert_eq!(DepthStatsCollector::new().extent(&pair), DepthExtent { min: 1000, max: 1000 });
    }

    #[test]
    fn extent_spans_actual_values() {
        let depth = DepthImage::new(3, 2, vec![500, 0, 65535, 1200, 7, 42]).unwrap();
        let extent = DepthStatsCollector::new().extent(&pair_with_depth(depth.clone()));
        assert_eq!(extent, DepthExtent { min: 0, max: 65535 });
        assert!(extent.min <= extent.max);
        assert!(depth.data.contains(&extent.min));
        assert!(depth.data.contains(&extent.max));
    }

    #[test]
    fn extent_is_unscaled() {
        let depth = DepthImage::new(2, 1, vec![9000, 12000]).unwrap();
        assert_eq!(depth_extent(&depth), DepthExtent { min: 9000, max: 12000 });
    }

    #[test]
    fn empty_buffer() {
        let depth = DepthImage::new(0, 0, vec![]).unwrap();
        assert_eq!(depth_extent(&depth), DepthExtent { min: 0, max: 0 });
    }
}
