//! Colour palette and the pixel arithmetic the preview renderer needs.
//!
//! The core treats colour as an opaque string; only the renderer parses it.

use particle_field::Color;

use crate::error::ConfigError;

/// Control-panel swatches, in order.
pub const PALETTE: [&str; 6] = ["#00ffff", "#ff00ff", "#ffff00", "#ff4444", "#ffffff", "#44ff44"];

/// Parse `#rrggbb` / `#rgb` (leading `#` optional) into packed `0x00RRGGBB`.
pub fn parse_hex(s: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidColor(s.to_string());
    let hex = s.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).map_err(|_| invalid()),
        3 => {
            // #abc → #aabbcc
            let wide: String = hex.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&wide, 16).map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

/// The swatch after `current`; colours not in the palette restart at the first.
pub fn next_color(current: &Color) -> Color {
    let i = PALETTE.iter()
        .position(|p| p.eq_ignore_ascii_case(current.as_str()))
        .map(|i| i + 1)
        .unwrap_or(0);
    Color::new(PALETTE[i % PALETTE.len()])
}

/// Additively blend `src × k` onto `dst`, saturating per channel.
pub fn add_scaled(dst: u32, src: u32, k: f32) -> u32 {
    let k = k.clamp(0.0, 1.0);
    let channel = |shift: u32| {
        let d = (dst >> shift) & 0xFF;
        let s = ((src >> shift) & 0xFF) as f32 * k;
        (d + s as u32).min(0xFF) << shift
    };
    channel(16) | channel(8) | channel(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(parse_hex("#00ffff"), Ok(0x00FFFF));
        assert_eq!(parse_hex("FF4444"), Ok(0xFF4444));
        assert_eq!(parse_hex("#4f4"), Ok(0x44FF44));
    }

    #[test]
    fn rejects_bad_hex() {
        for bad in ["", "#", "#12345", "#gggggg", "cyan", "#+12345"] {
            assert!(matches!(parse_hex(bad), Err(ConfigError::InvalidColor(_))), "{:?}", bad);
        }
    }

    #[test]
    fn every_swatch_parses() {
        for c in PALETTE { assert!(parse_hex(c).is_ok()); }
    }

    #[test]
    fn next_color_cycles_and_recovers() {
        assert_eq!(next_color(&Color::new("#00ffff")).as_str(), "#ff00ff");
        assert_eq!(next_color(&Color::new("#44FF44")).as_str(), "#00ffff");
        assert_eq!(next_color(&Color::new("#123456")).as_str(), "#00ffff");
    }

    #[test]
    fn additive_blend_saturates() {
        assert_eq!(add_scaled(0x000000, 0x00FFFF, 1.0), 0x00FFFF);
        assert_eq!(add_scaled(0x808080, 0xFFFFFF, 1.0), 0xFFFFFF);
        assert_eq!(add_scaled(0x100000, 0xFF0000, 0.5), 0x8F0000);
        assert_eq!(add_scaled(0x123456, 0xFFFFFF, 0.0), 0x123456);
    }
}
