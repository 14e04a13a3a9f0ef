//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece and UI colours, loadable from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours indexed by colour id − 1, in catalog order
    /// (I, T, L, J, S, O, Z): cyan, purple, orange, blue, green, yellow, red.
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Playfield border.
    pub outline: Color,
    /// Text (title, key hints).
    pub text: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic_default()
    }
}

impl Theme {
    /// Hardcoded classic palette: the traditional bright piece colours on a
    /// black board with a white border.
    pub fn classic_default() -> Self {
        Self {
            pieces: [
                parse_hex("#00FFFF").unwrap(), // I / cyan
                parse_hex("#800080").unwrap(), // T / purple
                parse_hex("#FFA500").unwrap(), // L / orange
                parse_hex("#0000FF").unwrap(), // J / blue
                parse_hex("#00FF00").unwrap(), // S / green
                parse_hex("#FFFF00").unwrap(), // O / yellow
                parse_hex("#FF0000").unwrap(), // Z / red
            ],
            bg: parse_hex("#000000").unwrap(),
            outline: parse_hex("#FFFFFF").unwrap(),
            text: parse_hex("#ABB2BF").unwrap(),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or
    /// `theme[key]='value'`. Falls back to the classic palette if path is
    /// None or the file is missing/invalid. `palette` selects the colour
    /// variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::classic_default();
        t.apply_palette(palette);
        t
    }

    /// Override piece colours for high-contrast or colorblind viewing.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                // Saturated colours with extra separation on a dark bg
                self.pieces = [
                    parse_hex("#00FFFF").unwrap(), // cyan
                    parse_hex("#FF00FF").unwrap(), // magenta
                    parse_hex("#FF8800").unwrap(), // orange
                    parse_hex("#0088FF").unwrap(), // blue
                    parse_hex("#00FF00").unwrap(), // green
                    parse_hex("#FFFF00").unwrap(), // yellow
                    parse_hex("#FF0000").unwrap(), // red
                ];
            }
            crate::Palette::Colorblind => {
                // Colorblind-friendly: avoid red/green alone
                self.pieces = [
                    parse_hex("#33BBEE").unwrap(), // light blue
                    parse_hex("#EE3377").unwrap(), // magenta
                    parse_hex("#EE7733").unwrap(), // orange
                    parse_hex("#0077BB").unwrap(), // blue
                    parse_hex("#009988").unwrap(), // teal
                    parse_hex("#BBBB00").unwrap(), // yellow
                    parse_hex("#CC3311").unwrap(), // red
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::classic_default();
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        const PIECE_KEYS: [&str; 7] = [
            "piece_i", "piece_t", "piece_l", "piece_j", "piece_s", "piece_o", "piece_z",
        ];
        let mut pieces = defaults.pieces;
        for (slot, key) in pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = get(key) {
                *slot = c;
            }
        }
        Self {
            pieces,
            bg: get("bg").unwrap_or(defaults.bg),
            outline: get("outline").unwrap_or(defaults.outline),
            text: get("text").unwrap_or(defaults.text),
        }
    }

    /// Colour for a 1-based colour id (board cells store 1..=7).
    #[inline]
    pub fn piece_color(&self, color_id: u8) -> Color {
        self.pieces[(color_id.max(1) as usize - 1) % 7]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, tail)) = rest.split_once(']') else {
            continue;
        };
        let Some((_, value)) = tail.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value);
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let t = s.trim().trim_start_matches('#');
    let channel = |a: &str| u8::from_str_radix(a, 16).map_err(|_| ThemeError::InvalidHex(s.to_string()));
    match t.len() {
        6 => Ok(Color::Rgb(
            channel(&t[0..2])?,
            channel(&t[2..4])?,
            channel(&t[4..6])?,
        )),
        3 => Ok(Color::Rgb(
            channel(&t[0..1])? * 17,
            channel(&t[1..2])? * 17,
            channel(&t[2..3])? * 17,
        )),
        _ => Err(ThemeError::InvalidHex(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#FFA500").unwrap();
        assert!(matches!(c, Color::Rgb(0xFF, 0xA5, 0x00)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGHHII").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[piece_i]="#00FFFF""##);
        assert_eq!(map.get("piece_i"), Some(&"#00FFFF".to_string()));
    }

    #[test]
    fn test_theme_from_map_overrides_one_piece() {
        let map = parse_theme_file(r##"theme[piece_z]="#123456""##);
        let theme = Theme::from_map(&map);
        assert!(matches!(theme.pieces[6], Color::Rgb(0x12, 0x34, 0x56)));
        // untouched slots keep the classic defaults
        assert_eq!(theme.pieces[0], Theme::classic_default().pieces[0]);
    }

    #[test]
    fn test_piece_color_is_one_based() {
        let theme = Theme::classic_default();
        assert_eq!(theme.piece_color(1), theme.pieces[0]);
        assert_eq!(theme.piece_color(7), theme.pieces[6]);
    }
}
