use serde::Deserialize;

/// Selects which color palette to use for field rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMap {
    /// Black -> white. The plain look of the pressure field.
    #[default]
    Grayscale,
    /// Tokyo Night: navy -> blue -> purple -> pink -> orange.
    TokyoNight,
    /// Ocean & Lava: deep blue -> blue -> white -> orange -> red.
    OceanLava,
    /// Blue-White-Red: diverging colormap for signed data (divergence).
    BlueWhiteRed,
}

impl ColorMap {
    /// Cycle to the next palette.
    pub fn next(self) -> Self {
        match self {
            ColorMap::Grayscale => ColorMap::TokyoNight,
            ColorMap::TokyoNight => ColorMap::OceanLava,
            ColorMap::OceanLava => ColorMap::BlueWhiteRed,
            ColorMap::BlueWhiteRed => ColorMap::Grayscale,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMap::Grayscale => "gray",
            ColorMap::TokyoNight => "tokyo",
            ColorMap::OceanLava => "lava",
            ColorMap::BlueWhiteRed => "bwr",
        }
    }
}

pub(crate) const GRAYSCALE_STOPS: [(f64, f64, f64); 5] = [
    (0.0, 0.0, 0.0),
    (63.75, 63.75, 63.75),
    (127.5, 127.5, 127.5),
    (191.25, 191.25, 191.25),
    (255.0, 255.0, 255.0),
];

/// Tokyo Night-inspired color stops for field mapping.
/// Deep navy -> blue -> purple -> pink -> orange
pub(crate) const TOKYO_NIGHT_STOPS: [(f64, f64, f64); 5] = [
    (26.0, 27.0, 38.0),    // #1a1b26 navy         (0.00)
    (122.0, 162.0, 247.0), // #7aa2f7 blue         (0.25)
    (187.0, 154.0, 247.0), // #bb9af7 purple       (0.50)
    (247.0, 118.0, 142.0), // #f7768e pink         (0.75)
    (255.0, 158.0, 100.0), // #ff9e64 orange       (1.00)
];

/// Ocean & Lava color stops: deep blue -> blue -> near-white -> orange -> deep red.
/// The 0.25/0.75 stops are kept dark so only high pressure glows.
pub(crate) const OCEAN_LAVA_STOPS: [(f64, f64, f64); 5] = [
    (10.0, 30.0, 120.0),   // deep ocean blue      (0.00)
    (20.0, 90.0, 200.0),   // medium blue           (0.25)
    (250.0, 250.0, 240.0), // bright white          (0.50)
    (220.0, 80.0, 10.0),   // medium orange          (0.75)
    (160.0, 20.0, 20.0),   // deep lava red         (1.00)
];

/// Blue-White-Red diverging colormap: blue=negative, white=zero, red=positive.
pub(crate) const BLUE_WHITE_RED_STOPS: [(f64, f64, f64); 5] = [
    (10.0, 30.0, 150.0),  // deep blue              (0.00)
    (80.0, 130.0, 230.0), // medium blue            (0.25)
    (245.0, 245.0, 245.0),// near white             (0.50)
    (230.0, 100.0, 70.0), // medium red             (0.75)
    (150.0, 20.0, 20.0),  // deep red               (1.00)
];

/// Convert a [0.0, 1.0] value to RGBA using the specified color map.
pub fn map_to_rgba(t: f64, colormap: ColorMap) -> [u8; 4] {
    let stops = match colormap {
        ColorMap::Grayscale => &GRAYSCALE_STOPS,
        ColorMap::TokyoNight => &TOKYO_NIGHT_STOPS,
        ColorMap::OceanLava => &OCEAN_LAVA_STOPS,
        ColorMap::BlueWhiteRed => &BLUE_WHITE_RED_STOPS,
    };

    // NaN maps to the low end.
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let seg = t * 4.0;
    let i = (seg as usize).min(3);
    let s = seg - i as f64;

    let (r0, g0, b0) = stops[i];
    let (r1, g1, b1) = stops[i + 1];

    [
        (r0 + s * (r1 - r0)).round() as u8,
        (g0 + s * (g1 - g0)).round() as u8,
        (b0 + s * (b1 - b0)).round() as u8,
        255,
    ]
}

/// Color bar layout constants.
pub(crate) const BAR_GAP: usize = 6;
pub(crate) const BAR_WIDTH: usize = 20;
pub(crate) const TICK_LEN: usize = 4;
pub(crate) const LABEL_GAP: usize = 2;
pub(crate) const LABEL_WIDTH: usize = 24;
pub(crate) const BAR_TOTAL: usize = BAR_GAP + BAR_WIDTH + TICK_LEN + LABEL_GAP + LABEL_WIDTH;
