// src/encoding/colorscale.rs
//
// Named continuous colour scales (plotly naming) used when the plot is
// rendered locally. A trailing "_r" reverses a scale.

pub type Rgb = (u8, u8, u8);

const VIRIDIS: &[Rgb] = &[
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

const CIVIDIS: &[Rgb] = &[
    (0x00, 0x22, 0x4e),
    (0x12, 0x35, 0x70),
    (0x3b, 0x49, 0x6c),
    (0x57, 0x5d, 0x6d),
    (0x70, 0x71, 0x73),
    (0x8a, 0x86, 0x78),
    (0xa5, 0x9c, 0x74),
    (0xc3, 0xb3, 0x69),
    (0xe1, 0xcc, 0x55),
    (0xfe, 0xe8, 0x38),
];

const PLASMA: &[Rgb] = &[
    (0x0d, 0x08, 0x87),
    (0x46, 0x03, 0x9f),
    (0x72, 0x01, 0xa8),
    (0x9c, 0x17, 0x9e),
    (0xbd, 0x37, 0x86),
    (0xd8, 0x57, 0x6b),
    (0xed, 0x79, 0x53),
    (0xfb, 0x9f, 0x3a),
    (0xfd, 0xca, 0x26),
    (0xf0, 0xf9, 0x21),
];

const INFERNO: &[Rgb] = &[
    (0x00, 0x00, 0x04),
    (0x1b, 0x0c, 0x41),
    (0x4a, 0x0c, 0x6b),
    (0x78, 0x1c, 0x6d),
    (0xa5, 0x2c, 0x60),
    (0xcf, 0x44, 0x46),
    (0xed, 0x69, 0x25),
    (0xfb, 0x9b, 0x06),
    (0xf7, 0xd1, 0x3d),
    (0xfc, 0xff, 0xa4),
];

const MAGMA: &[Rgb] = &[
    (0x00, 0x00, 0x04),
    (0x18, 0x0f, 0x3d),
    (0x44, 0x0f, 0x76),
    (0x72, 0x1f, 0x81),
    (0x9e, 0x2f, 0x7f),
    (0xcd, 0x40, 0x71),
    (0xf1, 0x60, 0x5d),
    (0xfd, 0x96, 0x68),
    (0xfe, 0xca, 0x8d),
    (0xfc, 0xfd, 0xbf),
];

// Unevenly spaced scales: (position, colour)
const GREYS: &[(f64, Rgb)] = &[(0.0, (0, 0, 0)), (1.0, (255, 255, 255))];

const BLUES: &[(f64, Rgb)] = &[
    (0.0, (5, 10, 172)),
    (0.35, (40, 60, 190)),
    (0.5, (70, 100, 245)),
    (0.6, (90, 120, 245)),
    (0.7, (106, 137, 247)),
    (1.0, (220, 220, 220)),
];

const REDS: &[(f64, Rgb)] = &[
    (0.0, (220, 220, 220)),
    (0.2, (245, 195, 157)),
    (0.4, (245, 160, 105)),
    (1.0, (178, 10, 28)),
];

const RDBU: &[(f64, Rgb)] = &[
    (0.0, (5, 10, 172)),
    (0.35, (106, 137, 247)),
    (0.5, (190, 190, 190)),
    (0.6, (220, 170, 132)),
    (0.7, (230, 145, 90)),
    (1.0, (178, 10, 28)),
];

const JET: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 131)),
    (0.125, (0, 60, 170)),
    (0.375, (5, 255, 255)),
    (0.625, (255, 255, 0)),
    (0.875, (250, 0, 0)),
    (1.0, (128, 0, 0)),
];

const HOT: &[(f64, Rgb)] = &[
    (0.0, (0, 0, 0)),
    (0.3, (230, 0, 0)),
    (0.6, (255, 210, 0)),
    (1.0, (255, 255, 255)),
];

#[derive(Debug, Clone, Copy)]
enum Stops {
    Even(&'static [Rgb]),
    Positioned(&'static [(f64, Rgb)]),
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    pub name: &'static str,
    stops: Stops,
    reversed: bool,
}

pub const DEFAULT_SCALE: &str = "Viridis";

const SCALES: &[(&str, Stops)] = &[
    ("Viridis", Stops::Even(VIRIDIS)),
    ("Cividis", Stops::Even(CIVIDIS)),
    ("Plasma", Stops::Even(PLASMA)),
    ("Inferno", Stops::Even(INFERNO)),
    ("Magma", Stops::Even(MAGMA)),
    ("Greys", Stops::Positioned(GREYS)),
    ("Blues", Stops::Positioned(BLUES)),
    ("Reds", Stops::Positioned(REDS)),
    ("RdBu", Stops::Positioned(RDBU)),
    ("Jet", Stops::Positioned(JET)),
    ("Hot", Stops::Positioned(HOT)),
];

impl ColorScale {
    /// Case-insensitive lookup; "Viridis_r" gives the reversed scale.
    pub fn by_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let (base, reversed) = match trimmed.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (trimmed, false),
        };

        SCALES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(base))
            .map(|&(name, stops)| ColorScale { name, stops, reversed })
    }

    /// Unknown names render with the default scale.
    pub fn by_name_or_default(name: &str) -> Self {
        Self::by_name(name).unwrap_or_else(|| {
            log::warn!("Unknown colourscale '{}', rendering with {}", name, DEFAULT_SCALE);
            Self::default()
        })
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        SCALES.iter().map(|(n, _)| *n)
    }

    /// Interpolate the scale at position `t` in [0, 1].
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };

        match self.stops {
            Stops::Even(colors) => {
                let n = colors.len() - 1;
                let scaled = t * n as f64;
                let idx = (scaled as usize).min(n - 1);
                lerp(colors[idx], colors[idx + 1], scaled - idx as f64)
            }
            Stops::Positioned(stops) => {
                let upper = stops
                    .iter()
                    .position(|(p, _)| *p >= t)
                    .unwrap_or(stops.len() - 1)
                    .max(1);
                let (p0, c0) = stops[upper - 1];
                let (p1, c1) = stops[upper];
                let frac = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
                lerp(c0, c1, frac)
            }
        }
    }

    /// Colour of `value` inside the display window `[cmin, cmax]`.
    /// Values outside the window take the boundary colour.
    pub fn map(&self, value: f64, domain: [f64; 2]) -> Rgb {
        let [cmin, cmax] = domain;
        let t = if cmax > cmin { (value - cmin) / (cmax - cmin) } else { 0.5 };
        self.sample(t)
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale {
            name: DEFAULT_SCALE,
            stops: Stops::Even(VIRIDIS),
            reversed: false,
        }
    }
}

fn lerp(a: Rgb, b: Rgb, frac: f64) -> Rgb {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
