use image::Rgba;

/// Parses `#rrggbb` at compile time.
pub const fn hex(s: &str) -> Rgba<u8> {
    let b = s.as_bytes();
    Rgba([
        (nibble(b[1]) << 4) | nibble(b[2]),
        (nibble(b[3]) << 4) | nibble(b[4]),
        (nibble(b[5]) << 4) | nibble(b[6]),
        255,
    ])
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// Rank 1 accent.
pub const RED: Rgba<u8> = hex("#ff0033");
/// Rank 2 accent; also used for village, time and QR modules.
pub const CYAN: Rgba<u8> = hex("#00d9ff");
/// Rank 3 accent.
pub const PINK: Rgba<u8> = hex("#ff1493");
/// Ranks 4 to 10.
pub const MAGENTA: Rgba<u8> = hex("#ec4899");
/// Below the top ten.
pub const TEAL: Rgba<u8> = hex("#06b6d4");
/// Participant name.
pub const WHITE: Rgba<u8> = hex("#ffffff");
/// Badge text and QR background.
pub const BLACK: Rgba<u8> = hex("#000000");
/// Organization line.
pub const LIGHT_GREY: Rgba<u8> = hex("#aaaaaa");
/// Footer date.
pub const GREY: Rgba<u8> = hex("#888888");

/// Colors chosen by rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Border, badge and glow color.
    pub accent: Rgba<u8>,
    /// Diagonal background stops as `(offset, color)`, offsets ascending.
    pub stops: Vec<(f32, Rgba<u8>)>,
    /// Top-ten cards get a glow around border and badge.
    pub glow: bool,
}

impl Palette {
    /// Palette for a 1-based rank.
    pub fn for_rank(rank: usize) -> Self {
        let (accent, middle) = match rank {
            1 => (RED, Some(hex("#1a0a3a"))),
            2 => (CYAN, Some(hex("#0a2a3a"))),
            3 => (PINK, Some(hex("#2a0a2a"))),
            4..=10 => (MAGENTA, Some(hex("#1a1a2a"))),
            _ => (TEAL, None),
        };
        let stops = match middle {
            Some(mid) => vec![(0.0, hex("#0a1628")), (0.5, mid), (1.0, hex("#0f1a2e"))],
            None => vec![(0.0, hex("#0a0a1a")), (1.0, hex("#0f1a2e"))],
        };
        Self {
            accent,
            stops,
            glow: middle.is_some(),
        }
    }

    /// Background color at gradient offset `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Rgba<u8> {
        let t = t.clamp(0.0, 1.0);
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                return lerp(c0, c1, f);
            }
        }
        self.stops.last().map(|(_, c)| *c).unwrap_or(BLACK)
    }
}

/// Linear mix of two opaque colors.
pub fn lerp(a: Rgba<u8>, b: Rgba<u8>, f: f32) -> Rgba<u8> {
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * f).round() as u8;
    Rgba([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), 255])
}
