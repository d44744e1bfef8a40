// src/ui/color.rs
use crate::error::OverlayError;

/// RGB tint of the pause arrow, channels in 0..=255.
///
/// Channels are kept as `f32` because tween steps land between integers;
/// `rounded` snaps them back once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseColor(pub [f32; 3]);

impl PulseColor {
    pub const WHITE: PulseColor = PulseColor([255.0, 255.0, 255.0]);

    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        PulseColor([v, v, v])
    }

    /// Nearest integer per channel (halves round up), clamped into 0..=255.
    pub fn rounded(self) -> Self {
        PulseColor(self.0.map(|c| c.round().clamp(0.0, 255.0)))
    }

    pub fn is_integral(&self) -> bool {
        self.0.iter().all(|c| c.fract() == 0.0)
    }

    /// Canvas fill style, e.g. `rgba(255, 255, 255, 0.8)`.
    pub fn css(&self, alpha: f32) -> String {
        let [r, g, b] = self.0;
        format!("rgba({}, {}, {}, {})", r, g, b, alpha)
    }
}

impl Default for PulseColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Parses a canvas fill style into straight (non-premultiplied) RGBA8.
///
/// Accepts `rgba(r, g, b, a)`, `rgb(r, g, b)` with `a` in 0..=1, and
/// "#rgb", "#rgba", "#rrggbb", "#rrggbbaa" (with or without '#').
pub fn parse_css_rgba(s: &str) -> Result<[u8; 4], OverlayError> {
    let t = s.trim();
    let invalid = || OverlayError::InvalidFillStyle(s.to_string());

    if let Some(body) = t.strip_prefix("rgba(").or_else(|| t.strip_prefix("rgb(")) {
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<f32> = body
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        let has_alpha = t.starts_with("rgba(");
        let (rgb, a) = match (has_alpha, parts.as_slice()) {
            (true, [r, g, b, a]) => ([*r, *g, *b], *a),
            (false, [r, g, b]) => ([*r, *g, *b], 1.0),
            _ => return Err(invalid()),
        };
        if rgb.iter().chain(std::iter::once(&a)).any(|v| !v.is_finite()) {
            return Err(invalid());
        }
        let [r, g, b] = rgb.map(|c| c.round().clamp(0.0, 255.0) as u8);
        let a = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        return Ok([r, g, b, a]);
    }

    rgba_hex(t).ok_or_else(invalid)
}

// "#rgb", "#rgba", "#rrggbb", "#rrggbbaa"
fn rgba_hex(s: &str) -> Option<[u8; 4]> {
    #[inline(always)] fn nib(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(10 + (b - b'a')),
            b'A'..=b'F' => Some(10 + (b - b'A')),
            _ => None,
        }
    }
    #[inline(always)] fn byte2(h: u8, l: u8) -> Option<u8> { Some((nib(h)? << 4) | nib(l)?) }
    #[inline(always)] fn rep(n: u8) -> Option<u8> { let n = nib(n)?; Some((n << 4) | n) }

    let b = s.strip_prefix('#').unwrap_or(s).as_bytes();
    let (r, g, bl, a) = match b.len() {
        3 => (rep(b[0])?, rep(b[1])?, rep(b[2])?, 0xFF),
        4 => (rep(b[0])?, rep(b[1])?, rep(b[2])?, rep(b[3])?),
        6 => (byte2(b[0], b[1])?, byte2(b[2], b[3])?, byte2(b[4], b[5])?, 0xFF),
        8 => (byte2(b[0], b[1])?, byte2(b[2], b[3])?, byte2(b[4], b[5])?, byte2(b[6], b[7])?),
        _ => return None,
    };
    Some([r, g, bl, a])
}
