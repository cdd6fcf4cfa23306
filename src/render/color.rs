/// Selects which color palette to use for field rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorMap {
    /// Ember: near-black -> deep red -> orange -> amber -> warm white.
    /// Sequential map for temperature backgrounds.
    Ember,
    /// IceSteam: vapor red -> ember orange -> pale neutral -> sky blue ->
    /// deep water blue. Diverging map for volume fraction (0 = vapor,
    /// 1 = water, neutral at the interface).
    IceSteam,
    /// Water: pale ice blue -> deep ocean blue, for the liquid bucket in
    /// the 3D cloud.
    Water,
    /// Vapor: pale rose -> deep crimson, for the vapor bucket.
    Vapor,
}

/// Ember color stops: cooling-metal ramp for temperature.
pub(crate) const EMBER_STOPS: [(f64, f64, f64); 5] = [
    (12.0, 6.0, 8.0),      // near black          (0.00)
    (122.0, 22.0, 12.0),   // deep red            (0.25)
    (224.0, 88.0, 20.0),   // orange              (0.50)
    (252.0, 188.0, 58.0),  // amber               (0.75)
    (255.0, 248.0, 224.0), // warm white          (1.00)
];

/// IceSteam diverging stops: vapor (low alpha) glows warm, water (high
/// alpha) reads cold, the interface sits on the pale midpoint.
pub(crate) const ICE_STEAM_STOPS: [(f64, f64, f64); 5] = [
    (156.0, 32.0, 26.0),   // vapor red           (0.00)
    (236.0, 134.0, 62.0),  // ember orange        (0.25)
    (244.0, 240.0, 218.0), // pale neutral        (0.50)
    (98.0, 152.0, 222.0),  // sky blue            (0.75)
    (18.0, 58.0, 148.0),   // deep water blue     (1.00)
];

/// Water stops: quiet blue ramp so the liquid bucket stays in the background.
pub(crate) const WATER_STOPS: [(f64, f64, f64); 5] = [
    (196.0, 220.0, 244.0), // pale ice            (0.00)
    (148.0, 186.0, 228.0), //                     (0.25)
    (96.0, 142.0, 206.0),  //                     (0.50)
    (52.0, 98.0, 176.0),   //                     (0.75)
    (20.0, 56.0, 132.0),   // deep ocean          (1.00)
];

/// Vapor stops: quiet red ramp for the gas bucket.
pub(crate) const VAPOR_STOPS: [(f64, f64, f64); 5] = [
    (248.0, 214.0, 212.0), // pale rose           (0.00)
    (234.0, 160.0, 152.0), //                     (0.25)
    (216.0, 104.0, 92.0),  //                     (0.50)
    (188.0, 58.0, 48.0),   //                     (0.75)
    (142.0, 22.0, 20.0),   // deep crimson        (1.00)
];

/// Convert a [0.0, 1.0] value to RGBA using the specified color map.
pub fn map_to_rgba(t: f64, colormap: ColorMap) -> [u8; 4] {
    let stops = match colormap {
        ColorMap::Ember => &EMBER_STOPS,
        ColorMap::IceSteam => &ICE_STEAM_STOPS,
        ColorMap::Water => &WATER_STOPS,
        ColorMap::Vapor => &VAPOR_STOPS,
    };

    let t = t.clamp(0.0, 1.0);
    let seg = t * 4.0;
    let i = (seg as usize).min(3);
    let s = seg - i as f64;

    let (r0, g0, b0) = stops[i];
    let (r1, g1, b1) = stops[i + 1];

    [
        (r0 + s * (r1 - r0)) as u8,
        (g0 + s * (g1 - g0)) as u8,
        (b0 + s * (b1 - b0)) as u8,
        255,
    ]
}

/// Color bar layout constants.
pub(crate) const BAR_GAP: usize = 8;
pub(crate) const BAR_WIDTH: usize = 18;
pub(crate) const TICK_LEN: usize = 4;
pub(crate) const LABEL_GAP: usize = 3;
pub(crate) const LABEL_WIDTH: usize = 42;
pub(crate) const BAR_TOTAL: usize = BAR_GAP + BAR_WIDTH + TICK_LEN + LABEL_GAP + LABEL_WIDTH;
