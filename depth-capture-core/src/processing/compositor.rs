use std::borrow::Cow;

use crate::models::config::RecorderConfiguration;
use crate::models::frame::{ColorImage, CompositeFrame, DepthImage, FramePair, PixelOrder};
use crate::processing::palette::{Palette, PaletteTable};

/// Turns a color + depth pair into one side-by-side RGB frame.
///
/// ```text
/// ┌──────────────┬──────────────┐
/// │ color (RGB)  │ depth → 8bit │
/// │              │ → palette    │
/// └──────────────┴──────────────┘
/// ```
///
/// Pure: the palette table and scale are fixed at construction, so identical
/// inputs always give byte-identical output.
#[derive(Debug, Clone)]
pub struct FrameCompositor {
    palette: Palette,
    depth_scale: f32,
    table: Box<PaletteTable>,
}

impl FrameCompositor {
    pub fn new(palette: Palette, depth_scale: f32) -> Self {
        Self {
            palette,
            depth_scale,
            table: Box::new(palette.table()),
        }
    }

    pub fn from_config(config: &RecorderConfiguration) -> Self {
        Self::new(config.palette, config.depth_scale)
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn depth_scale(&self) -> f32 {
        self.depth_scale
    }

    /// Composite dimensions for the given input sizes:
    /// `(color_w + depth_w, max(color_h, depth_h))`.
    pub fn output_dimensions(color: (u32, u32), depth: (u32, u32)) -> (u32, u32) {
        (color.0 + depth.0, color.1.max(depth.1))
    }

    /// Dimensions the composite of `pair` will have.
    pub fn dimensions_for(pair: &FramePair) -> (u32, u32) {
        Self::output_dimensions(
            (pair.color.width, pair.color.height),
            (pair.depth.width, pair.depth.height),
        )
    }

    pub fn composite(&self, pair: &FramePair) -> CompositeFrame {
        let (width, height) = Self::dimensions_for(pair);
        let row_bytes = width as usize * 3;
        let mut data = vec![0u8; row_bytes * height as usize];

        let color = to_rgb(&pair.color);
        let color_row = pair.color.width as usize * 3;
        for y in 0..pair.color.height as usize {
            let src = &color[y * color_row..(y + 1) * color_row];
            data[y * row_bytes..y * row_bytes + color_row].copy_from_slice(src);
        }

        let depth_offset = color_row;
        self.paint_depth(&pair.depth, &mut data, row_bytes, depth_offset);

        CompositeFrame {
            width,
            height,
            data,
        }
    }

    /// Map one raw depth sample to its 8-bit palette index.
    pub fn scale_depth(&self, raw: u16) -> u8 {
        (raw as f32 * self.depth_scale).round().clamp(0.0, 255.0) as u8
    }

    /// Palette color for one raw depth sample.
    pub fn colorize(&self, raw: u16) -> [u8; 3] {
        self.table[self.scale_depth(raw) as usize]
    }

    fn paint_depth(&self, depth: &DepthImage, out: &mut [u8], row_bytes: usize, x_offset: usize) {
        let w = depth.width as usize;
        for (y, row) in depth.data.chunks_exact(w.max(1)).enumerate() {
            let start = y * row_bytes + x_offset;
            for (x, &raw) in row.iter().enumerate() {
                let i = start + x * 3;
                out[i..i + 3].copy_from_slice(&self.colorize(raw));
            }
        }
    }
}

/// Color buffer in RGB order, converting from BGR when needed.
///
/// This is the only place channel order is decided; everything downstream
/// (JPEG encoder, container) assumes RGB.
pub fn to_rgb(color: &ColorImage) -> Cow<'_, [u8]> {
    match color.order {
        PixelOrder::Rgb => Cow::Borrowed(&color.data),
        PixelOrder::Bgr => {
            let mut swapped = color.data.clone();
            for px in swapped.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            Cow::Owned(swapped)
        }
    }
}
