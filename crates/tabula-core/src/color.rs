//! Color representation for cell backgrounds and fonts

use std::fmt;

/// Standard 56-entry palette addressed by color index 1..=56
const PALETTE: [(u8, u8, u8); 56] = [
    (0, 0, 0),       // 1: Black
    (255, 255, 255), // 2: White
    (255, 0, 0),     // 3: Red
    (0, 255, 0),     // 4: Bright Green
    (0, 0, 255),     // 5: Blue
    (255, 255, 0),   // 6: Yellow
    (255, 0, 255),   // 7: Pink
    (0, 255, 255),   // 8: Turquoise
    (128, 0, 0),     // 9: Dark Red
    (0, 128, 0),     // 10: Green
    (0, 0, 128),     // 11: Dark Blue
    (128, 128, 0),   // 12: Dark Yellow
    (128, 0, 128),   // 13: Violet
    (0, 128, 128),   // 14: Teal
    (192, 192, 192), // 15: 25% Gray
    (128, 128, 128), // 16: 50% Gray
    (153, 153, 255), // 17: Periwinkle
    (153, 51, 102),  // 18: Plum
    (255, 255, 204), // 19: Ivory
    (204, 255, 255), // 20: Light Turquoise
    (102, 0, 102),   // 21: Dark Purple
    (255, 128, 128), // 22: Coral
    (0, 102, 204),   // 23: Ocean Blue
    (204, 204, 255), // 24: Ice Blue
    (0, 0, 128),     // 25: Dark Blue
    (255, 0, 255),   // 26: Pink
    (255, 255, 0),   // 27: Yellow
    (0, 255, 255),   // 28: Turquoise
    (128, 0, 128),   // 29: Violet
    (128, 0, 0),     // 30: Dark Red
    (0, 128, 128),   // 31: Teal
    (0, 0, 255),     // 32: Blue
    (0, 204, 255),   // 33: Sky Blue
    (204, 255, 255), // 34: Light Turquoise
    (204, 255, 204), // 35: Light Green
    (255, 255, 153), // 36: Light Yellow
    (153, 204, 255), // 37: Pale Blue
    (255, 153, 204), // 38: Rose
    (204, 153, 255), // 39: Lavender
    (255, 204, 153), // 40: Tan
    (51, 102, 255),  // 41: Light Blue
    (51, 204, 204),  // 42: Aqua
    (153, 204, 0),   // 43: Lime
    (255, 204, 0),   // 44: Gold
    (255, 153, 0),   // 45: Light Orange
    (255, 102, 0),   // 46: Orange
    (102, 102, 153), // 47: Blue-Gray
    (150, 150, 150), // 48: 40% Gray
    (0, 51, 102),    // 49: Dark Teal
    (51, 153, 102),  // 50: Sea Green
    (0, 51, 0),      // 51: Dark Green
    (51, 51, 0),     // 52: Olive Green
    (153, 51, 0),    // 53: Brown
    (153, 51, 102),  // 54: Plum
    (51, 51, 153),   // 55: Indigo
    (51, 51, 51),    // 56: 80% Gray
];

/// A cell or font color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color
    Rgb { r: u8, g: u8, b: u8 },

    /// Palette color by index (1..=56)
    Indexed(u8),
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create a palette color, if the index is in 1..=56
    pub fn from_index(index: u8) -> Option<Self> {
        (1..=PALETTE.len() as u8)
            .contains(&index)
            .then_some(Color::Indexed(index))
    }

    /// Create from a hex string (e.g., "#FF0000" or "FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb { r, g, b })
    }

    /// Convert to hex string (without # prefix)
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Convert to RGB tuple; automatic resolves to black
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Auto => (0, 0, 0),
            Color::Rgb { r, g, b } => (*r, *g, *b),
            Color::Indexed(i) => Self::indexed_to_rgb(*i),
        }
    }

    /// The palette index for this color
    ///
    /// RGB colors map to the first palette entry with the exact same
    /// components. Automatic colors and unmatched RGB values have no index.
    pub fn palette_index(&self) -> Option<u8> {
        match self {
            Color::Auto => None,
            Color::Indexed(i) => Some(*i),
            Color::Rgb { r, g, b } => PALETTE
                .iter()
                .position(|&entry| entry == (*r, *g, *b))
                .map(|pos| pos as u8 + 1),
        }
    }

    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        match index.checked_sub(1) {
            Some(i) if (i as usize) < PALETTE.len() => PALETTE[i as usize],
            _ => (0, 0, 0),
        }
    }

    // Common colors
    pub const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const RED: Color = Color::Rgb { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color::Rgb { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color::Rgb { r: 0, g: 0, b: 255 };
    pub const YELLOW: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 0,
    };
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::GREEN));
        assert_eq!(Color::from_hex("FF00"), None);
        assert_eq!(Color::from_hex("GG0000"), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::RED.to_hex(), "FF0000");
        assert_eq!(Color::Indexed(6).to_hex(), "FFFF00");
        assert_eq!(Color::Auto.to_hex(), "000000");
    }

    #[test]
    fn test_palette_index() {
        assert_eq!(Color::RED.palette_index(), Some(3));
        assert_eq!(Color::WHITE.palette_index(), Some(2));
        assert_eq!(Color::rgb(1, 2, 3).palette_index(), None);
        assert_eq!(Color::Indexed(44).palette_index(), Some(44));
        assert_eq!(Color::Auto.palette_index(), None);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(Color::from_index(1), Some(Color::Indexed(1)));
        assert_eq!(Color::from_index(56), Some(Color::Indexed(56)));
        assert_eq!(Color::from_index(0), None);
        assert_eq!(Color::from_index(57), None);
        assert_eq!(Color::Indexed(3).to_rgb(), (255, 0, 0));
    }
}
