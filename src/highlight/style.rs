//! Style types for overlay rendering
//!
//! The engine never draws anything itself. It hands these values to the
//! host together with each rectangle and the host decides what they mean
//! on its surface.

/// Overlay colors (ANSI 16-color palette plus 24-bit RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    DarkGray,
    LightGray,
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a color from a config name or a `#rrggbb` literal
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(hex) = name.strip_prefix('#') {
            return parse_hex(hex);
        }
        match name.to_lowercase().as_str() {
            "default" => Some(Color::Default),
            "black" => Some(Color::Black),
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            "blue" => Some(Color::Blue),
            "magenta" => Some(Color::Magenta),
            "cyan" => Some(Color::Cyan),
            "white" => Some(Color::White),
            "gray" | "grey" => Some(Color::Gray),
            "dark-gray" | "dark-grey" => Some(Color::DarkGray),
            "light-gray" | "light-grey" => Some(Color::LightGray),
            _ => None,
        }
    }

    /// Name used when writing the color back to a config file
    pub fn name(&self) -> String {
        match self {
            Color::Default => "default".to_string(),
            Color::Black => "black".to_string(),
            Color::Red => "red".to_string(),
            Color::Green => "green".to_string(),
            Color::Yellow => "yellow".to_string(),
            Color::Blue => "blue".to_string(),
            Color::Magenta => "magenta".to_string(),
            Color::Cyan => "cyan".to_string(),
            Color::White => "white".to_string(),
            Color::Gray => "gray".to_string(),
            Color::DarkGray => "dark-gray".to_string(),
            Color::LightGray => "light-gray".to_string(),
            Color::Rgb(r, g, b) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Visual attributes of a highlight overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Background fill
    pub color: Color,
    /// Corner radius in host units
    pub corner_radius: f32,
}

impl OverlayStyle {
    pub fn new(color: Color, corner_radius: f32) -> Self {
        Self {
            color,
            corner_radius: corner_radius.max(0.0),
        }
    }

    /// Builder: set color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Builder: set corner radius
    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::new(Color::Gray, 5.0)
    }
}
