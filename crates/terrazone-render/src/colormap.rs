//! The "terrain" colormap and per-zone palettes.

use terrazone_zones::ZoneTable;

/// Control points of matplotlib's `terrain` colormap as `(position, rgb)`.
const TERRAIN: [(f64, [f64; 3]); 6] = [
    (0.00, [0.2, 0.2, 0.6]),
    (0.15, [0.0, 0.6, 1.0]),
    (0.25, [0.0, 0.8, 0.4]),
    (0.50, [1.0, 1.0, 0.6]),
    (0.75, [0.5, 0.36, 0.33]),
    (1.00, [1.0, 1.0, 1.0]),
];

/// Colour at `t` in `[0, 1]` (clamped), channels in `[0, 1]`.
pub fn terrain_color(t: f64) -> [f64; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    for pair in TERRAIN.windows(2) {
        let (x0, c0) = pair[0];
        let (x1, c1) = pair[1];
        if t <= x1 {
            let f = (t - x0) / (x1 - x0);
            return [
                c0[0] + (c1[0] - c0[0]) * f,
                c0[1] + (c1[1] - c0[1]) * f,
                c0[2] + (c1[2] - c0[2]) * f,
            ];
        }
    }
    TERRAIN[TERRAIN.len() - 1].1
}

/// Convert a `[0, 1]` channel to a byte.
pub(crate) fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Discrete colours, one per zone in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePalette {
    colors: Vec<[u8; 3]>,
}

impl ZonePalette {
    pub fn new(colors: Vec<[u8; 3]>) -> Self {
        Self { colors }
    }

    /// `n` colours sampled evenly over the terrain colormap, first at 0 and
    /// last at 1.
    pub fn terrain(n: usize) -> Self {
        let colors = (0..n)
            .map(|i| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                terrain_color(t).map(to_u8)
            })
            .collect();
        Self { colors }
    }

    /// Palette sized for `table`.
    pub fn for_table(table: &ZoneTable) -> Self {
        Self::terrain(table.len())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    /// Colour at table position `index`.
    pub fn color(&self, index: usize) -> Option<[u8; 3]> {
        self.colors.get(index).copied()
    }

    /// Colour of zone `id`, looked up through its table position.
    pub fn zone_color(&self, table: &ZoneTable, id: i32) -> Option<[u8; 3]> {
        table.position(id).and_then(|index| self.color(index))
    }
}
