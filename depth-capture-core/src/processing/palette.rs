use serde::{Deserialize, Serialize};

/// False-color palette for depth visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Rainbow ramp: dark blue → cyan → yellow → dark red.
    Jet,
    /// Black → red → yellow → white.
    Hot,
}

/// 256-entry RGB lookup table.
pub type PaletteTable = [[u8; 3]; 256];

impl Palette {
    /// Materialize the palette as a lookup table indexed by the 8-bit scaled depth.
    pub fn table(self) -> PaletteTable {
        let mut table = [[0u8; 3]; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let [r, g, b] = self.sample(i as f32 / 255.0);
            *entry = [to_u8(r), to_u8(g), to_u8(b)];
        }
        table
    }

    /// Continuous palette value at `x` in `[0, 1]`, channels in `[0, 1]`.
    pub fn sample(self, x: f32) -> [f32; 3] {
        let x = x.clamp(0.0, 1.0);
        match self {
            Self::Jet => [
                jet_channel(4.0 * x - 3.0),
                jet_channel(4.0 * x - 2.0),
                jet_channel(4.0 * x - 1.0),
            ],
            Self::Hot => [
                (3.0 * x).clamp(0.0, 1.0),
                (3.0 * x - 1.0).clamp(0.0, 1.0),
                (3.0 * x - 2.0).clamp(0.0, 1.0),
            ],
        }
    }
}

fn jet_channel(offset: f32) -> f32 {
    (1.5 - offset.abs()).clamp(0.0, 1.0)
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round() as u8
}
